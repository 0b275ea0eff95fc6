//! Concurrent Multi-Query
//!
//! Ranks several expressions against one shared vocabulary in parallel.

use std::time::Instant;
use tracing::debug;

use super::query::{eval, top_n};
use crate::error::{Error, Result};
use crate::model::{Expr, Match, Vocabulary};

/// Compute the `n` most similar words for each expression.
///
/// All expressions are evaluated up front; the first failure aborts the call
/// before any scan starts. Each scan then runs on its own scoped thread and
/// writes only its own result slot, so the output order always matches the
/// input order.
pub fn multi_cos_n<V: Vocabulary + ?Sized>(
    vocab: &V,
    exprs: &[Expr],
    n: usize,
) -> Result<Vec<Vec<Match>>> {
    let vectors = exprs
        .iter()
        .map(|e| eval(vocab, e))
        .collect::<Result<Vec<_>>>()?;

    let start = Instant::now();
    let mut results: Vec<Vec<Match>> = vec![Vec::new(); vectors.len()];

    crossbeam::scope(|s| {
        for (slot, v) in results.iter_mut().zip(&vectors) {
            s.spawn(move |_| {
                *slot = top_n(vocab, v, n);
            });
        }
    })
    .map_err(|_| Error::WorkerPanicked)?;

    debug!(
        queries = exprs.len(),
        n,
        elapsed = ?start.elapsed(),
        "Multi-query ranking complete"
    );
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::query::cos_n;
    use crate::model::testing::{compass, hello_world};
    use crate::model::{LazyModel, Model};

    #[test]
    fn test_multi_cos_n_order() {
        let model = hello_world();
        let exprs = vec![Expr::single("hello"), Expr::single("world")];

        let results = multi_cos_n(&model, &exprs, 1).unwrap();
        assert_eq!(
            results,
            vec![
                vec![Match::new("hello", 1.0)],
                vec![Match::new("world", 1.0)]
            ]
        );
    }

    #[test]
    fn test_multi_cos_n_matches_sequential() {
        let model = Model::from_reader(&compass()[..]).unwrap();
        let exprs: Vec<Expr> = (0..8).map(|i| Expr::single(format!("w{}", i))).collect();

        let results = multi_cos_n(&model, &exprs, 3).unwrap();
        assert_eq!(results.len(), exprs.len());
        for (expr, result) in exprs.iter().zip(&results) {
            assert_eq!(result, &cos_n(&model, expr, 3).unwrap());
        }
    }

    #[test]
    fn test_multi_cos_n_lazy_model() {
        let lazy = LazyModel::from_reader(&compass()[..]).unwrap();
        let exprs = vec![Expr::single("w0"), Expr::single("w0"), Expr::single("w6")];

        let results = multi_cos_n(&lazy, &exprs, 2).unwrap();
        assert_eq!(results[0], results[1]);
        assert_eq!(results[2][0].word, "w6");
    }

    #[test]
    fn test_multi_cos_n_fails_fast() {
        let model = hello_world();
        let exprs = vec![Expr::single("hello"), Expr::single("missing"), Expr::new()];

        let err = multi_cos_n(&model, &exprs, 1).unwrap_err();
        assert_eq!(err.missing_word(), Some("missing"));
    }

    #[test]
    fn test_multi_cos_n_empty_input() {
        let model = hello_world();
        assert!(multi_cos_n(&model, &[], 5).unwrap().is_empty());
    }
}
