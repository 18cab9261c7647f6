//! Error types for the AI layer

use thiserror::Error;

/// AI layer error types
#[derive(Error, Debug)]
pub enum AiError {
    #[error("invalid turn: {0}")]
    InvalidTurn(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("completion provider returned {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for AI operations
pub type Result<T> = std::result::Result<T, AiError>;
