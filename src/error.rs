//! Error types for model loading and similarity queries.

use thiserror::Error;

/// Result type alias for wordvec operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading a model or answering queries.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed header or truncated record data in a binary model.
    #[error("invalid model format: {0}")]
    Format(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A queried word is not in the vocabulary.
    #[error("word not found: {word:?}")]
    NotFound { word: String },

    /// An expression with no terms was evaluated.
    #[error("must specify at least one word to evaluate")]
    EmptyExpression,

    /// A request could not be interpreted.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A remote engine reported a failure.
    #[error("remote error: {0}")]
    Remote(String),

    /// HTTP transport error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A fan-out worker thread panicked.
    #[error("similarity worker panicked")]
    WorkerPanicked,
}

impl Error {
    pub fn not_found(word: impl Into<String>) -> Self {
        Error::NotFound { word: word.into() }
    }

    /// The missing word, if this is a not-found failure.
    pub fn missing_word(&self) -> Option<&str> {
        match self {
            Error::NotFound { word } => Some(word),
            _ => None,
        }
    }
}
