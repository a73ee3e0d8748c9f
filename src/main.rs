// src/main.rs

use std::net::SocketAddr;
use std::sync::Arc;

use dotenvy::dotenv;
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use wikiquiz::config::Config;
use wikiquiz::db::QuizStore;
use wikiquiz::extractor::Extractor;
use wikiquiz::generator::{GeminiBackend, QuizGenerator};
use wikiquiz::routes;
use wikiquiz::state::AppState;

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Initialize Database Pool
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Database connected...");

    // Create the quizzes table (idempotent)
    let store = QuizStore::new(pool);
    store
        .init_schema()
        .await
        .expect("Failed to initialize database schema");

    // The credential is only required once a request reaches the generator,
    // but a missing one should be visible before the first 500.
    if config.gemini_api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY is not set; quiz generation will fail until it is provided");
    }

    let backend = GeminiBackend::new(config.gemini_api_key.clone(), config.gemini_model.clone());

    // Create AppState
    let state = AppState {
        store,
        extractor: Extractor::new(),
        generator: QuizGenerator::new(Arc::new(backend)),
        config: config.clone(),
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], 8000));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();

    // Start the server
    axum::serve(listener, app).await.unwrap();
}
