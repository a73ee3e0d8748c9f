// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// One multiple-choice question.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = validate_answer_membership))]
pub struct Question {
    /// The quiz question text.
    #[validate(length(min = 1))]
    pub question: String,

    /// Exactly four answer options.
    #[validate(length(equal = 4))]
    pub options: Vec<String>,

    /// Must match one of `options` verbatim.
    #[validate(length(min = 1))]
    pub correct_answer: String,

    /// Brief explanation of why the answer is correct.
    pub explanation: String,
}

fn validate_answer_membership(question: &Question) -> Result<(), validator::ValidationError> {
    if !question.options.contains(&question.correct_answer) {
        return Err(validator::ValidationError::new(
            "correct_answer_not_in_options",
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Quiz {
    /// Quiz title based on the article topic.
    #[validate(length(min = 1))]
    pub title: String,

    #[validate(length(min = 5, max = 10), nested)]
    pub questions: Vec<Question>,
}

/// The full structured-output contract expected from the model.
///
/// Declared once: the same rules that validate a response are rendered
/// into the prompt by [`format_instructions`], so the instruction text
/// and the validation logic cannot drift apart.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QuizOutput {
    #[validate(nested)]
    pub quiz: Quiz,

    /// 5-10 key topics/entities from the article.
    #[validate(length(min = 5, max = 10))]
    pub key_entities: Vec<String>,

    /// 3-5 related topics for further reading.
    #[validate(length(min = 3, max = 5))]
    pub related_topics: Vec<String>,
}

/// Renders the expected response shape as prompt text.
pub fn format_instructions() -> String {
    let schema = serde_json::json!({
        "quiz": {
            "title": "string, quiz title based on the article topic",
            "questions": [{
                "question": "string, the quiz question text",
                "options": ["string", "string", "string", "string"],
                "correct_answer": "string, copied verbatim from options",
                "explanation": "string, brief explanation of why the answer is correct"
            }]
        },
        "key_entities": ["5-10 key topics or entities from the article"],
        "related_topics": ["3-5 related topics for further reading"]
    });

    format!(
        "The output must be a single JSON object with this structure:\n{}\n\
         Constraints: quiz.questions holds 5 to 10 questions; every options array \
         has exactly 4 entries; every correct_answer equals one of its options; \
         key_entities holds 5 to 10 strings; related_topics holds 3 to 5 strings.",
        serde_json::to_string_pretty(&schema).expect("schema literal serializes")
    )
}
