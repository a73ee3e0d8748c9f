// src/generator.rs

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

use crate::models::article::ArticleContent;
use crate::models::quiz::{self, QuizOutput};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const COMPLETION_TIMEOUT: Duration = Duration::from_secs(60);
const COMPLETION_ATTEMPTS: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Chosen for creative-but-stable question phrasing.
const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("GEMINI_API_KEY not found in environment variables")]
    MissingApiKey,

    #[error("completion request failed: {0}")]
    Invocation(#[from] reqwest::Error),

    #[error("completion service returned status {0}: {1}")]
    Upstream(reqwest::StatusCode, String),

    #[error("completion response contained no candidates")]
    EmptyCompletion,

    #[error("model returned non-conforming output: {reason}")]
    SchemaValidation {
        reason: String,
        /// Raw response text, kept for diagnostics.
        raw: String,
    },
}

/// Opaque text-completion service reached over the network.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, GenerateError>;
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

/// Gemini `generateContent` backend.
pub struct GeminiBackend {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
}

impl GeminiBackend {
    pub fn new(api_key: Option<String>, model: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(COMPLETION_TIMEOUT)
            .build()
            .expect("failed to build http client");
        Self {
            client,
            api_key,
            model,
        }
    }
}

impl fmt::Debug for GeminiBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiBackend")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl CompletionBackend for GeminiBackend {
    async fn complete(&self, prompt: &str) -> Result<String, GenerateError> {
        let api_key = self.api_key.as_deref().ok_or(GenerateError::MissingApiKey)?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                response_mime_type: "application/json",
            },
        };

        let url = format!("{}/models/{}:generateContent", GEMINI_BASE_URL, self.model);

        let mut attempt = 1;
        let response = loop {
            let result = self
                .client
                .post(&url)
                .header("x-goog-api-key", api_key)
                .json(&request)
                .send()
                .await;

            match result {
                Ok(response) if response.status().is_success() => break response,
                Ok(response)
                    if attempt < COMPLETION_ATTEMPTS && is_transient_status(response.status()) =>
                {
                    tracing::warn!(
                        "Completion call returned {}, retrying... (Attempt {})",
                        response.status(),
                        attempt
                    );
                    tokio::time::sleep(RETRY_DELAY * attempt).await;
                    attempt += 1;
                }
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(GenerateError::Upstream(status, body));
                }
                Err(e) if attempt < COMPLETION_ATTEMPTS && (e.is_timeout() || e.is_connect()) => {
                    tracing::warn!("Completion call failed ({}), retrying... (Attempt {})", e, attempt);
                    tokio::time::sleep(RETRY_DELAY * attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        };

        let completion: GenerateContentResponse = response.json().await?;
        completion
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or(GenerateError::EmptyCompletion)
    }
}

fn is_transient_status(status: reqwest::StatusCode) -> bool {
    status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS
}

/// Turns extracted article content into a schema-valid quiz.
#[derive(Clone)]
pub struct QuizGenerator {
    backend: Arc<dyn CompletionBackend>,
}

impl QuizGenerator {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    /// Invokes the completion service once and validates its output.
    /// All-or-nothing: a response that fails any schema rule is rejected whole.
    pub async fn generate(&self, article: &ArticleContent) -> Result<QuizOutput, GenerateError> {
        tracing::info!("Generating quiz for: {}", article.title);
        let prompt = build_prompt(article);
        let raw = self.backend.complete(&prompt).await?;
        parse_quiz_response(&raw)
    }
}

fn build_prompt(article: &ArticleContent) -> String {
    format!(
        "You are an expert educational content creator. Given the following Wikipedia \
         article text, create an engaging and educational quiz.\n\n\
         Article Title: {title}\n\
         Article Content: {content}\n\n\
         Generate a comprehensive quiz with the following requirements:\n\
         1. Create 5-10 multiple choice questions that test understanding of key concepts\n\
         2. Each question must have exactly 4 options\n\
         3. Provide clear explanations for correct answers\n\
         4. Extract 5-10 key entities/topics from the article\n\
         5. Suggest 3-5 related topics for further learning\n\n\
         Make questions diverse - include factual recall, conceptual understanding, and \
         application questions.\n\n\
         {format_instructions}\n\n\
         Return ONLY valid JSON matching the schema. Do not include any additional text \
         or markdown formatting.",
        title = article.title,
        content = article.body,
        format_instructions = quiz::format_instructions(),
    )
}

/// Parses and validates a raw completion into a [`QuizOutput`].
fn parse_quiz_response(raw: &str) -> Result<QuizOutput, GenerateError> {
    let stripped = strip_code_fences(raw);

    let output: QuizOutput =
        serde_json::from_str(stripped).map_err(|e| GenerateError::SchemaValidation {
            reason: format!("invalid JSON: {}", e),
            raw: raw.to_string(),
        })?;

    output
        .validate()
        .map_err(|e| GenerateError::SchemaValidation {
            reason: e.to_string(),
            raw: raw.to_string(),
        })?;

    Ok(output)
}

/// Models sometimes wrap the JSON in a markdown fence despite instructions.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
