// src/models/article.rs

use serde::Serialize;

/// Cleaned prose pulled out of an article page.
///
/// Transient: produced by the extractor, consumed by the generator.
/// A truncated excerpt of `body` is kept on the stored record for audit.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleContent {
    pub title: String,
    pub body: String,
}
