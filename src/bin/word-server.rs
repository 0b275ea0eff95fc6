//! Word Server Binary
//!
//! Serves similarity queries for a binary word2vec model over HTTP.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use wordvec::{Config, LazyModel, Model, Server};

/// Word Server - similarity queries over HTTP
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to binary model data
    #[arg(short, long)]
    model: PathBuf,

    /// Bind address
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    /// Port number
    #[arg(short, long, default_value_t = 1234)]
    port: u16,

    /// Runtime worker threads (0 = auto-detect based on CPU cores)
    #[arg(long, default_value_t = 0)]
    workers: usize,

    /// Decode vectors on first use instead of at load time
    #[arg(long)]
    lazy: bool,

    /// Disable the query result cache
    #[arg(long)]
    no_cache: bool,
}

fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("wordvec=info".parse()?))
        .init();

    let args = Args::parse();

    let config = Config::default()
        .with_bind(&args.bind)
        .with_port(args.port)
        .with_workers(args.workers)
        .with_cache(!args.no_cache);

    let server = if args.lazy {
        Server::new(config, LazyModel::open(&args.model)?)
    } else {
        Server::new(config, Model::open(&args.model)?)
    };

    let workers = server.config().worker_threads();
    info!(
        "Starting word server on {} with {} workers (cache: {})",
        server.config().addr(),
        workers,
        server.config().cache
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(workers)
        .enable_all()
        .build()?;
    let metrics = server.metrics().clone();
    runtime.block_on(server.run())?;
    info!("{}", metrics.summary());

    Ok(())
}
