// src/handlers/quiz.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    extractor::MIN_CONTENT_LEN,
    models::{
        quiz::QuizOutput,
        record::{GenerateQuizRequest, NewQuizRecord, QuizResponse},
    },
    state::AppState,
};

/// Only article pages from this ecosystem are accepted.
const WIKIPEDIA_DOMAIN: &str = "wikipedia.org";

/// How much of the scraped article is kept on the record for audit.
const SCRAPED_EXCERPT_CHARS: usize = 5000;

/// Liveness probe.
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "AI Wiki Quiz Generator API",
        "status": "active"
    }))
}

/// Generates a new quiz from a Wikipedia URL.
///
/// * Scrapes the Wikipedia article.
/// * Generates the quiz through the completion service.
/// * Saves the record and returns it merged with the quiz data.
pub async fn create_quiz(
    State(state): State<AppState>,
    Json(payload): Json<GenerateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    // Domain gate: reject foreign URLs before any network work happens.
    if !payload.url.contains(WIKIPEDIA_DOMAIN) {
        return Err(AppError::BadRequest(
            "Please provide a valid Wikipedia URL".to_string(),
        ));
    }

    let article = state.extractor.extract(&payload.url).await?;

    // Re-checked at the orchestration boundary: the extractor already
    // enforces this, but a thin article must never reach the model.
    if article.body.len() < MIN_CONTENT_LEN {
        return Err(AppError::BadRequest(
            "Could not extract sufficient content from article".to_string(),
        ));
    }

    let output = state.generator.generate(&article).await?;

    let full_quiz_data = serde_json::to_string(&output)?;
    let excerpt: String = article.body.chars().take(SCRAPED_EXCERPT_CHARS).collect();

    let record = state
        .store
        .insert(&NewQuizRecord {
            url: payload.url,
            title: article.title,
            scraped_content: Some(excerpt),
            full_quiz_data,
        })
        .await?;

    tracing::info!("Quiz saved with ID: {}", record.id);

    Ok((
        StatusCode::CREATED,
        Json(QuizResponse {
            id: record.id,
            url: record.url,
            title: record.title,
            date_generated: record.date_generated,
            output,
        }),
    ))
}

/// Lists all generated quizzes, most recent first.
pub async fn get_history(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let history = state.store.list_history().await?;
    Ok(Json(history))
}

/// Retrieves a stored quiz by ID.
pub async fn get_quiz(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let record = state
        .store
        .get(id)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    let output: QuizOutput = serde_json::from_str(&record.full_quiz_data)?;

    Ok(Json(QuizResponse {
        id: record.id,
        url: record.url,
        title: record.title,
        date_generated: record.date_generated,
        output,
    }))
}
