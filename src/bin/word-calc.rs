//! Word Calc Binary
//!
//! Loads a model and ranks the words closest to an expression such as
//! `king + woman - man`:
//!
//! ```text
//! word-calc --model model.bin --add king,woman --sub man
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::{fmt, EnvFilter};
use wordvec::engine::eval;
use wordvec::{multi_cos_n, Coser, Expr, LazyModel, Model, Vocabulary};

/// Word Calc - vector arithmetic over a word2vec model
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to binary model data
    #[arg(short, long)]
    model: PathBuf,

    /// Comma separated words to add to the target vector
    #[arg(short, long, value_delimiter = ',')]
    add: Vec<String>,

    /// Comma separated words to subtract from the target vector
    #[arg(short, long, value_delimiter = ',')]
    sub: Vec<String>,

    /// Comma separated words to query at the same time
    #[arg(short, long, value_delimiter = ',')]
    words: Vec<String>,

    /// Number of similar matches to show
    #[arg(short, default_value_t = 10)]
    n: usize,

    /// Decode vectors on first use instead of at load time
    #[arg(long)]
    lazy: bool,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("wordvec=warn".parse()?))
        .init();

    let args = Args::parse();

    if args.add.is_empty() && args.sub.is_empty() && args.words.is_empty() {
        anyhow::bail!("must specify --add, --sub, or --words; see --help for more details");
    }

    if args.lazy {
        run(&args, &LazyModel::open(&args.model)?)
    } else {
        run(&args, &Model::open(&args.model)?)
    }
}

fn run<M: Coser + Vocabulary>(args: &Args, model: &M) -> anyhow::Result<()> {
    if !args.words.is_empty() {
        let exprs: Vec<Expr> = args.words.iter().map(Expr::single).collect();

        let start = Instant::now();
        let results = multi_cos_n(model, &exprs, args.n)?;
        println!("Total time: {:?}", start.elapsed());

        for (word, matches) in args.words.iter().zip(&results) {
            println!("{}:", word);
            for m in matches {
                println!("{:9.6}\t{:?}", m.score, m.word);
            }
        }
        return Ok(());
    }

    let mut expr = Expr::new();
    expr.add_all(1.0, &args.add);
    expr.add_all(-1.0, &args.sub);

    if args.verbose {
        println!("Expr: {:?}", expr);
        println!("Target vector: {:?}", eval(model, &expr)?);
    }

    let start = Instant::now();
    let matches = model.cos_n(&expr, args.n)?;
    if args.verbose {
        println!("Total time: {:?}", start.elapsed());
    }

    for m in matches {
        println!("{:9.6}\t{:?}", m.score, m.word);
    }
    Ok(())
}
