use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Schema violation at {location}: {message}")]
    Schema { location: String, message: String },

    #[error("Unsupported entity type: {0}")]
    UnsupportedType(String),

    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("Token map {path:?} is unreadable: {message}")]
    TokenMap { path: PathBuf, message: String },

    #[error("Recognizer error: {0}")]
    Recognizer(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Input not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn schema(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            location: location.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
