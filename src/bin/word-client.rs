//! Word Client Binary
//!
//! Queries a running word server.

use clap::Parser;
use std::time::Instant;
use wordvec::{Coser, Expr, HttpClient};

/// Word Client - query a word server
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Server address
    #[arg(long, default_value = "localhost:1234")]
    addr: String,

    /// Comma separated words to add to target vector A
    #[arg(long, value_delimiter = ',')]
    add_a: Vec<String>,

    /// Comma separated words to subtract from target vector A
    #[arg(long, value_delimiter = ',')]
    sub_a: Vec<String>,

    /// Comma separated words to add to target vector B
    #[arg(long, value_delimiter = ',')]
    add_b: Vec<String>,

    /// Comma separated words to subtract from target vector B
    #[arg(long, value_delimiter = ',')]
    sub_b: Vec<String>,

    /// Rank the words most similar to A instead of comparing A and B
    #[arg(long)]
    sim: bool,

    /// Number of similar items to return with --sim
    #[arg(short, default_value_t = 10)]
    n: usize,
}

fn make_expr(add: &[String], sub: &[String], name: &str) -> anyhow::Result<Expr> {
    if add.is_empty() && sub.is_empty() {
        anyhow::bail!(
            "must specify add and/or sub words for target vector {}; see --help for more details",
            name
        );
    }

    let mut expr = Expr::new();
    expr.add_all(1.0, add);
    expr.add_all(-1.0, sub);
    Ok(expr)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let client = HttpClient::new(&args.addr);

    let expr_a = make_expr(&args.add_a, &args.sub_a, "A")?;

    if args.sim {
        for m in client.cos_n(&expr_a, args.n)? {
            println!("{:9.6} {:?}", m.score, m.word);
        }
        return Ok(());
    }

    let expr_b = make_expr(&args.add_b, &args.sub_b, "B")?;

    let start = Instant::now();
    let value = client.cos(&expr_a, &expr_b)?;
    println!("cosine similarity: {} (took: {:?})", value, start.elapsed());

    Ok(())
}
