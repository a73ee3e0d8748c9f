// src/extractor.rs

use std::time::Duration;

use reqwest::StatusCode;
use scraper::node::{Element, Node};
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use crate::models::article::ArticleContent;
use crate::utils::text;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const FETCH_ATTEMPTS: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_millis(500);

const FALLBACK_TITLE: &str = "Wikipedia Article";
const MAX_WORDS: usize = 3000;

/// Extracted bodies shorter than this are not usable article prose.
pub const MIN_CONTENT_LEN: usize = 100;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("article server returned status {0}")]
    Status(StatusCode),

    #[error("page markup has no recognizable article body")]
    MissingContent,

    #[error("extracted body too short ({0} chars)")]
    EmptyContent(usize),
}

/// Fetches article pages and reduces them to clean prose plus a title.
#[derive(Clone)]
pub struct Extractor {
    client: reqwest::Client,
}

impl Extractor {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()
            .expect("failed to build http client");
        Self { client }
    }

    /// Fetches `url` and extracts normalized article content from it.
    pub async fn extract(&self, url: &str) -> Result<ArticleContent, ExtractError> {
        tracing::info!("Scraping article: {}", url);
        let html = self.fetch(url).await?;
        parse_article(&html)
    }

    async fn fetch(&self, url: &str) -> Result<String, ExtractError> {
        let mut attempt = 1;
        loop {
            match self.try_fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) if attempt < FETCH_ATTEMPTS && is_transient(&e) => {
                    tracing::warn!("Fetch failed ({}), retrying... (Attempt {})", e, attempt);
                    tokio::time::sleep(RETRY_DELAY * attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn try_fetch(&self, url: &str) -> Result<String, ExtractError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ExtractError::Status(response.status()));
        }
        Ok(response.text().await?)
    }
}

fn is_transient(err: &ExtractError) -> bool {
    match err {
        ExtractError::Fetch(e) => e.is_timeout() || e.is_connect(),
        ExtractError::Status(status) => {
            status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
        }
        _ => false,
    }
}

/// Reduces raw article markup to a title and normalized body prose.
fn parse_article(html: &str) -> Result<ArticleContent, ExtractError> {
    let document = Html::parse_document(html);

    let heading_selector = Selector::parse("h1.firstHeading").unwrap();
    let content_selector = Selector::parse("#mw-content-text").unwrap();
    let paragraph_selector = Selector::parse("p").unwrap();

    let title = document
        .select(&heading_selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| FALLBACK_TITLE.to_string());

    let container = document
        .select(&content_selector)
        .next()
        .ok_or(ExtractError::MissingContent)?;

    let mut raw_text = String::new();
    for paragraph in container.select(&paragraph_selector) {
        let inside_stripped_region = paragraph
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|el| is_non_prose(el.value()));
        if inside_stripped_region {
            continue;
        }
        collect_prose(paragraph, &mut raw_text);
        raw_text.push(' ');
    }

    let cleaned = text::clean_prose(&raw_text);
    let body = text::truncate_words(&cleaned, MAX_WORDS);

    if body.len() < MIN_CONTENT_LEN {
        return Err(ExtractError::EmptyContent(body.len()));
    }

    Ok(ArticleContent { title, body })
}

/// Appends the text of `element`, skipping non-prose substructures.
fn collect_prose(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                if is_non_prose(el) {
                    continue;
                }
                if let Some(child_ref) = ElementRef::wrap(child) {
                    collect_prose(child_ref, out);
                }
            }
            _ => {}
        }
    }
}

/// Footnote markers, tables, scripts, styles, and reference/citation
/// regions carry no article prose.
fn is_non_prose(element: &Element) -> bool {
    if matches!(element.name(), "sup" | "table" | "script" | "style") {
        return true;
    }
    element.attr("class").is_some_and(|class| {
        let class = class.to_ascii_lowercase();
        class.contains("reference") || class.contains("citation")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wiki_page(content: &str) -> String {
        format!(
            "<html><body>\
             <h1 id=\"firstHeading\" class=\"firstHeading\">Octopus</h1>\
             <div id=\"mw-content-text\">{}</div>\
             </body></html>",
            content
        )
    }

    fn long_paragraph(words: usize) -> String {
        let body: Vec<String> = (0..words).map(|i| format!("word{}", i)).collect();
        format!("<p>{}</p>", body.join(" "))
    }

    #[test]
    fn extracts_title_and_prose() {
        let html = wiki_page(&format!(
            "<p>The octopus is a soft-bodied mollusc.</p>{}",
            long_paragraph(50)
        ));
        let article = parse_article(&html).unwrap();
        assert_eq!(article.title, "Octopus");
        assert!(article.body.starts_with("The octopus is a soft-bodied mollusc."));
    }

    #[test]
    fn falls_back_to_placeholder_title() {
        let html = format!(
            "<html><body><div id=\"mw-content-text\">{}</div></body></html>",
            long_paragraph(50)
        );
        let article = parse_article(&html).unwrap();
        assert_eq!(article.title, FALLBACK_TITLE);
    }

    #[test]
    fn missing_container_is_parse_error() {
        let html = "<html><body><h1 class=\"firstHeading\">Octopus</h1>\
                    <p>No content container here.</p></body></html>";
        assert!(matches!(
            parse_article(html),
            Err(ExtractError::MissingContent)
        ));
    }

    #[test]
    fn short_body_is_empty_content_error() {
        let html = wiki_page("<p>Too short.</p>");
        assert!(matches!(
            parse_article(&html),
            Err(ExtractError::EmptyContent(_))
        ));
    }

    #[test]
    fn normalizes_whitespace_and_strips_citations() {
        let html = wiki_page(&format!(
            "<p>Octopuses[1]   are\n\n intelligent[citation needed] animals.</p>{}",
            long_paragraph(40)
        ));
        let article = parse_article(&html).unwrap();
        assert!(!article.body.contains('['));
        assert!(!article.body.contains("  "));
        assert!(article.body.starts_with("Octopuses are intelligent animals."));
    }

    #[test]
    fn strips_non_prose_elements() {
        let html = wiki_page(&format!(
            "<p>Kept prose<sup>1</sup>.</p>\
             <table><tr><td><p>table text</p></td></tr></table>\
             <script>var x = 1;</script>\
             <style>p {{ color: red }}</style>\
             <p><span class=\"mw-reference-text\">reference text</span>visible tail.</p>\
             <div class=\"Citation\"><p>citation block</p></div>{}",
            long_paragraph(40)
        ));
        let article = parse_article(&html).unwrap();
        assert!(article.body.contains("Kept prose"));
        assert!(article.body.contains("visible tail."));
        for stripped in ["table text", "var x", "color: red", "reference text", "citation block"] {
            assert!(
                !article.body.contains(stripped),
                "body unexpectedly contains {:?}",
                stripped
            );
        }
    }

    #[test]
    fn truncates_to_word_cap() {
        let html = wiki_page(&long_paragraph(MAX_WORDS + 500));
        let article = parse_article(&html).unwrap();
        assert_eq!(article.body.split_whitespace().count(), MAX_WORDS);
    }
}
