// src/db.rs

use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::record::{NewQuizRecord, QuizRecord, QuizSummary};

/// Explicitly constructed persistence handle for quiz records.
///
/// Owns all access to the 'quizzes' table; the pipeline only ever builds a
/// [`NewQuizRecord`] and hands it off.
#[derive(Clone)]
pub struct QuizStore {
    pool: SqlitePool,
}

impl QuizStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates the quizzes table. Idempotent: safe to run on every start.
    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS quizzes (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                url             TEXT NOT NULL,
                title           TEXT NOT NULL,
                date_generated  TEXT NOT NULL DEFAULT (datetime('now')),
                scraped_content TEXT,
                full_quiz_data  TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Inserts a freshly generated quiz and returns the stored row.
    pub async fn insert(&self, new: &NewQuizRecord) -> Result<QuizRecord, sqlx::Error> {
        sqlx::query_as::<_, QuizRecord>(
            r#"
            INSERT INTO quizzes (url, title, date_generated, scraped_content, full_quiz_data)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, url, title, date_generated, scraped_content, full_quiz_data
            "#,
        )
        .bind(&new.url)
        .bind(&new.title)
        .bind(Utc::now())
        .bind(&new.scraped_content)
        .bind(&new.full_quiz_data)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn get(&self, id: i64) -> Result<Option<QuizRecord>, sqlx::Error> {
        sqlx::query_as::<_, QuizRecord>(
            r#"
            SELECT id, url, title, date_generated, scraped_content, full_quiz_data
            FROM quizzes
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Lists all quizzes, most recently generated first.
    pub async fn list_history(&self) -> Result<Vec<QuizSummary>, sqlx::Error> {
        sqlx::query_as::<_, QuizSummary>(
            r#"
            SELECT id, url, title, date_generated
            FROM quizzes
            ORDER BY date_generated DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}
