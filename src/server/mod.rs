//! Server Module
//!
//! HTTP server exposing an engine's similarity queries as JSON routes.

mod config;
mod handler;

pub use config::Config;
pub use handler::Handler;

use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::cache::Cache;
use crate::engine::Coser;
use crate::metrics::Metrics;
use crate::protocol::{COSES_ROUTE, COS_N_ROUTE, COS_ROUTE, HEALTH_ROUTE};

/// Similarity query server
pub struct Server {
    config: Config,
    engine: Arc<dyn Coser>,
    metrics: Arc<Metrics>,
}

impl Server {
    /// Create a server for `engine`, wrapped in a [`Cache`] when the config
    /// enables it.
    pub fn new<C: Coser + 'static>(config: Config, engine: C) -> Self {
        let engine: Arc<dyn Coser> = if config.cache {
            Arc::new(Cache::new(engine))
        } else {
            Arc::new(engine)
        };
        Self {
            config,
            engine,
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Routes for the three query kinds plus health
    pub fn router(&self) -> Router {
        let handler = Handler::new(self.engine.clone(), self.metrics.clone());
        Router::new()
            .route(COS_ROUTE, get(handler::cos).post(handler::cos))
            .route(COSES_ROUTE, get(handler::coses).post(handler::coses))
            .route(COS_N_ROUTE, get(handler::cos_n).post(handler::cos_n))
            .route(HEALTH_ROUTE, get(handler::health))
            .with_state(handler)
    }

    /// Bind the configured address and serve until Ctrl+C
    pub async fn run(self) -> std::io::Result<()> {
        let addr = self.config.addr();
        let listener = TcpListener::bind(&addr).await?;
        info!("Server listening on {}", addr);

        let router = self.router();
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                if let Ok(()) = tokio::signal::ctrl_c().await {
                    info!("Shutting down word server");
                } else {
                    // No signal handler; serve until the process is killed
                    std::future::pending::<()>().await;
                }
            })
            .await
    }

    /// Serve on an already bound listener
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        let router = self.router();
        axum::serve(listener, router).await
    }

    /// Server configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get metrics reference
    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }
}
