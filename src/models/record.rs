// src/models/record.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use url::Url;
use validator::Validate;

use super::quiz::QuizOutput;

/// Represents the 'quizzes' table in the database.
///
/// Append-only: created once per successful generation, never mutated.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizRecord {
    pub id: i64,

    pub url: String,

    pub title: String,

    pub date_generated: DateTime<Utc>,

    /// Truncated excerpt of the scraped article, kept for audit.
    pub scraped_content: Option<String>,

    /// The generated QuizOutput, serialized as JSON.
    pub full_quiz_data: String,
}

/// Insert payload for a freshly generated quiz.
#[derive(Debug)]
pub struct NewQuizRecord {
    pub url: String,
    pub title: String,
    pub scraped_content: Option<String>,
    pub full_quiz_data: String,
}

/// Row shape for the history listing (omits the bulky columns).
#[derive(Debug, Serialize, FromRow)]
pub struct QuizSummary {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub date_generated: DateTime<Utc>,
}

/// DTO for requesting quiz generation.
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateQuizRequest {
    #[validate(length(min = 1, max = 2000), custom(function = validate_url_string))]
    pub url: String,
}

/// Validates that a string is a correctly formatted URL.
fn validate_url_string(url: &str) -> Result<(), validator::ValidationError> {
    if Url::parse(url).is_err() {
        return Err(validator::ValidationError::new("invalid_url"));
    }
    Ok(())
}

/// Full response payload: record metadata merged with the generated quiz.
#[derive(Debug, Serialize)]
pub struct QuizResponse {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub date_generated: DateTime<Utc>,
    #[serde(flatten)]
    pub output: QuizOutput,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_url() {
        let request = GenerateQuizRequest {
            url: "https://en.wikipedia.org/wiki/Octopus".to_string(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn rejects_malformed_url() {
        let request = GenerateQuizRequest {
            url: "not a url".to_string(),
        };
        assert!(request.validate().is_err());
    }
}
