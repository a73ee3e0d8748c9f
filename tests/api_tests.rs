// tests/api_tests.rs

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use wikiquiz::config::Config;
use wikiquiz::db::QuizStore;
use wikiquiz::extractor::Extractor;
use wikiquiz::generator::{CompletionBackend, GenerateError, QuizGenerator};
use wikiquiz::models::record::NewQuizRecord;
use wikiquiz::routes;
use wikiquiz::state::AppState;

/// Completion backend returning a fixed, schema-valid quiz.
/// Keeps the tests offline: no completion service is ever contacted.
struct StubBackend;

#[async_trait]
impl CompletionBackend for StubBackend {
    async fn complete(&self, _prompt: &str) -> Result<String, GenerateError> {
        Ok(sample_quiz_value().to_string())
    }
}

fn sample_quiz_value() -> serde_json::Value {
    let questions: Vec<serde_json::Value> = (0..5)
        .map(|i| {
            serde_json::json!({
                "question": format!("Question {}?", i),
                "options": ["A", "B", "C", "D"],
                "correct_answer": "A",
                "explanation": "Because A."
            })
        })
        .collect();
    serde_json::json!({
        "quiz": { "title": "Sample Quiz", "questions": questions },
        "key_entities": ["one", "two", "three", "four", "five"],
        "related_topics": ["t1", "t2", "t3"]
    })
}

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL and the store handle for direct seeding.
async fn spawn_app() -> (String, QuizStore) {
    // In-memory SQLite; a single connection so every query sees the schema.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    let store = QuizStore::new(pool);
    store
        .init_schema()
        .await
        .expect("Failed to initialize schema");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        gemini_api_key: Some("test-key".to_string()),
        gemini_model: "gemini-2.5-flash".to_string(),
        rust_log: "error".to_string(),
    };

    let state = AppState {
        store: store.clone(),
        extractor: Extractor::new(),
        generator: QuizGenerator::new(Arc::new(StubBackend)),
        config,
    };

    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, store)
}

#[tokio::test]
async fn liveness_probe_works() {
    // Arrange
    let (address, _store) = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(&address)
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "active");
}

#[tokio::test]
async fn rejects_non_wikipedia_url_without_network() {
    // Arrange
    let (address, _store) = spawn_app().await;
    let client = reqwest::Client::new();

    // Act: a well-formed URL outside the expected domain. The gate fires
    // before extraction, so no outbound request is ever made.
    let response = client
        .post(format!("{}/generate_quiz", address))
        .json(&serde_json::json!({ "url": "https://example.com/not-wikipedia" }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Please provide a valid Wikipedia URL");
}

#[tokio::test]
async fn rejects_malformed_url() {
    // Arrange
    let (address, _store) = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .post(format!("{}/generate_quiz", address))
        .json(&serde_json::json!({ "url": "definitely not a url" }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn history_starts_empty() {
    // Arrange
    let (address, _store) = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(format!("{}/history", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn stored_quiz_round_trips_through_api() {
    // Arrange
    let (address, store) = spawn_app().await;
    let client = reqwest::Client::new();

    let quiz_value = sample_quiz_value();
    let stored = store
        .insert(&NewQuizRecord {
            url: "https://en.wikipedia.org/wiki/Octopus".to_string(),
            title: "Octopus".to_string(),
            scraped_content: Some("Octopuses are intelligent molluscs.".to_string()),
            full_quiz_data: quiz_value.to_string(),
        })
        .await
        .expect("Failed to seed quiz");

    // Act
    let response = client
        .get(format!("{}/quiz/{}", address, stored.id))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert: stored quiz comes back deep-equal, merged with metadata.
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["id"], stored.id);
    assert_eq!(body["url"], "https://en.wikipedia.org/wiki/Octopus");
    assert_eq!(body["title"], "Octopus");
    assert_eq!(body["quiz"], quiz_value["quiz"]);
    assert_eq!(body["key_entities"], quiz_value["key_entities"]);
    assert_eq!(body["related_topics"], quiz_value["related_topics"]);

    // The history listing now carries exactly this record's summary.
    let history: serde_json::Value = client
        .get(format!("{}/history", address))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["id"], stored.id);
    assert_eq!(history[0]["title"], "Octopus");
    assert!(history[0].get("full_quiz_data").is_none());
}

#[tokio::test]
async fn history_lists_most_recent_first() {
    // Arrange
    let (address, store) = spawn_app().await;
    let client = reqwest::Client::new();

    for title in ["First", "Second"] {
        store
            .insert(&NewQuizRecord {
                url: format!("https://en.wikipedia.org/wiki/{}", title),
                title: title.to_string(),
                scraped_content: None,
                full_quiz_data: sample_quiz_value().to_string(),
            })
            .await
            .expect("Failed to seed quiz");
    }

    // Act
    let history: serde_json::Value = client
        .get(format!("{}/history", address))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();

    // Assert
    assert_eq!(history[0]["title"], "Second");
    assert_eq!(history[1]["title"], "First");
}

#[tokio::test]
async fn missing_quiz_returns_404() {
    // Arrange
    let (address, _store) = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(format!("{}/quiz/9999", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Quiz not found");
}
