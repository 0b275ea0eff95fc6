//! Route Handlers
//!
//! Decodes JSON queries, runs them on the blocking pool and encodes the
//! result or failure.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, warn};

use crate::engine::Coser;
use crate::error::Result;
use crate::metrics::Metrics;
use crate::protocol::{
    CosNQuery, CosNResponse, CosQuery, CosResponse, CosesQuery, CosesResponse, ErrorBody,
    HealthResponse,
};

/// Shared state for all routes
#[derive(Clone)]
pub struct Handler {
    engine: Arc<dyn Coser>,
    metrics: Arc<Metrics>,
}

impl Handler {
    /// Create a new handler
    pub fn new(engine: Arc<dyn Coser>, metrics: Arc<Metrics>) -> Self {
        Self { engine, metrics }
    }

    /// Decode `body`, evaluate it against the engine and encode the reply.
    async fn run<Q, R, F>(&self, route: &'static str, body: Bytes, f: F) -> Response
    where
        Q: DeserializeOwned + Send + 'static,
        R: Serialize + Send + 'static,
        F: FnOnce(&dyn Coser, Q) -> Result<R> + Send + 'static,
    {
        let start = Instant::now();

        // Decode the query body
        let query: Q = match serde_json::from_slice(&body) {
            Ok(q) => q,
            Err(e) => {
                let msg = format!("error decoding query: {}", e);
                warn!(route, "{}", msg);
                self.metrics.record(route, start.elapsed(), false);
                return (StatusCode::BAD_REQUEST, Json(ErrorBody::new(msg))).into_response();
            }
        };

        // Top-N queries scan the whole vocabulary; keep them off the reactor.
        let engine = self.engine.clone();
        let result = tokio::task::spawn_blocking(move || f(engine.as_ref(), query)).await;

        // Encode the reply or the failure
        let (ok, response) = match result {
            Ok(Ok(reply)) => (true, (StatusCode::OK, Json(reply)).into_response()),
            Ok(Err(e)) => {
                warn!(route, "error evaluating query: {}", e);
                let body = ErrorBody::from_error(&e);
                (false, (StatusCode::BAD_REQUEST, Json(body)).into_response())
            }
            Err(e) => {
                error!(route, "Query task failed: {}", e);
                let body = ErrorBody::new("query task failed");
                (false, (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response())
            }
        };

        // Record metrics
        let elapsed = start.elapsed();
        self.metrics.record(route, elapsed, ok);
        debug!(route, latency = ?elapsed, ok, "Query executed");
        response
    }
}

/// Cosine similarity of two expressions
pub async fn cos(State(handler): State<Handler>, body: Bytes) -> Response {
    handler
        .run("cos", body, |engine, q: CosQuery| {
            engine.cos(&q.a, &q.b).map(|value| CosResponse { value })
        })
        .await
}

/// Batched cosine similarities
pub async fn coses(State(handler): State<Handler>, body: Bytes) -> Response {
    handler
        .run("coses", body, |engine, q: CosesQuery| {
            let pairs = q.into_pairs()?;
            engine.coses(&pairs).map(|values| CosesResponse { values })
        })
        .await
}

/// Top-N most similar words
pub async fn cos_n(State(handler): State<Handler>, body: Bytes) -> Response {
    handler
        .run("cos-n", body, |engine, q: CosNQuery| {
            engine.cos_n(&q.expr, q.n).map(|matches| CosNResponse { matches })
        })
        .await
}

/// Liveness and query counters
pub async fn health(State(handler): State<Handler>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        operations: handler.metrics.total_ops(),
        failed: handler.metrics.failed_ops(),
        avg_latency_us: handler.metrics.avg_latency_us(),
    })
}
