use thiserror::Error;

#[derive(Error, Debug)]
pub enum CopilotError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown dialect: {0}")]
    UnknownDialect(String),

    #[error("Question must not be empty")]
    EmptyQuestion,
}

pub type Result<T> = std::result::Result<T, CopilotError>;
