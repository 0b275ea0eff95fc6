//! Response Bodies

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::Match;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CosResponse {
    pub value: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CosesResponse {
    pub values: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CosNResponse {
    pub matches: Vec<Match>,
}

/// Failure body. `not_found` carries the missing word so remote callers can
/// rebuild [`Error::NotFound`] exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_found: Option<String>,
}

impl ErrorBody {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            error: msg.into(),
            not_found: None,
        }
    }

    /// Body for a failed query evaluation
    pub fn from_error(err: &Error) -> Self {
        Self {
            error: format!("error evaluating query: {}", err),
            not_found: err.missing_word().map(str::to_string),
        }
    }

    /// Convert back into the error a local engine would have returned
    pub fn into_error(self) -> Error {
        match self.not_found {
            Some(word) => Error::NotFound { word },
            None => Error::Remote(self.error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// Queries answered since startup
    pub operations: u64,
    /// Queries that ended in an error response
    #[serde(default)]
    pub failed: u64,
    pub avg_latency_us: f64,
}
