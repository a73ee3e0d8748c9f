// src/config.rs

use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,

    /// Completion-service credential. Absence is not fatal at startup:
    /// the generator rejects requests that reach it without a key.
    pub gemini_api_key: Option<String>,

    pub gemini_model: String,

    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://quiz_history.db?mode=rwc".to_string());

        let gemini_api_key = env::var("GEMINI_API_KEY").ok();

        let gemini_model =
            env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_string());

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            database_url,
            gemini_api_key,
            gemini_model,
            rust_log,
        }
    }
}
