//! WordVec - Word-Embedding Similarity Engine
//!
//! Loads binary word2vec models and answers cosine-similarity queries over
//! weighted word expressions: pairwise, batched, top-N and parallel top-N,
//! locally or through an HTTP server, with optional result memoization.

pub mod cache;
pub mod client;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod model;
pub mod protocol;
pub mod server;
pub mod vector;

pub use cache::{Cache, CacheStats};
pub use client::HttpClient;
pub use engine::{multi_cos_n, sim, Coser};
pub use error::{Error, Result};
pub use metrics::Metrics;
pub use model::{Expr, LazyModel, Match, Model, Vocabulary};
pub use server::{Config, Server};
