//! Similarity Engine
//!
//! The [`Coser`] contract shared by local models, the remote HTTP client and
//! the caching decorator.

mod multi;
mod query;

pub use multi::multi_cos_n;
pub use query::{cos, cos_n, coses, eval, sim, top_n, TopN};

use std::sync::Arc;

use crate::error::Result;
use crate::model::{Expr, LazyModel, Match, Model};

/// Engine answering cosine-similarity queries over expressions
pub trait Coser: Send + Sync {
    /// Cosine similarity between two expressions
    fn cos(&self, a: &Expr, b: &Expr) -> Result<f32>;

    /// Cosine similarity for each pair, in order; no partial results.
    fn coses(&self, pairs: &[(Expr, Expr)]) -> Result<Vec<f32>>;

    /// The `n` most similar words to an expression, best first
    fn cos_n(&self, expr: &Expr, n: usize) -> Result<Vec<Match>>;
}

impl Coser for Model {
    fn cos(&self, a: &Expr, b: &Expr) -> Result<f32> {
        query::cos(self, a, b)
    }

    fn coses(&self, pairs: &[(Expr, Expr)]) -> Result<Vec<f32>> {
        query::coses(self, pairs)
    }

    fn cos_n(&self, expr: &Expr, n: usize) -> Result<Vec<Match>> {
        query::cos_n(self, expr, n)
    }
}

impl Coser for LazyModel {
    fn cos(&self, a: &Expr, b: &Expr) -> Result<f32> {
        query::cos(self, a, b)
    }

    fn coses(&self, pairs: &[(Expr, Expr)]) -> Result<Vec<f32>> {
        query::coses(self, pairs)
    }

    fn cos_n(&self, expr: &Expr, n: usize) -> Result<Vec<Match>> {
        query::cos_n(self, expr, n)
    }
}

impl<C: Coser + ?Sized> Coser for Arc<C> {
    fn cos(&self, a: &Expr, b: &Expr) -> Result<f32> {
        (**self).cos(a, b)
    }

    fn coses(&self, pairs: &[(Expr, Expr)]) -> Result<Vec<f32>> {
        (**self).coses(pairs)
    }

    fn cos_n(&self, expr: &Expr, n: usize) -> Result<Vec<Match>> {
        (**self).cos_n(expr, n)
    }
}

impl<C: Coser + ?Sized> Coser for Box<C> {
    fn cos(&self, a: &Expr, b: &Expr) -> Result<f32> {
        (**self).cos(a, b)
    }

    fn coses(&self, pairs: &[(Expr, Expr)]) -> Result<Vec<f32>> {
        (**self).coses(pairs)
    }

    fn cos_n(&self, expr: &Expr, n: usize) -> Result<Vec<Match>> {
        (**self).cos_n(expr, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::testing::hello_world;

    #[test]
    fn test_model_as_dyn_coser() {
        let engine: Arc<dyn Coser> = Arc::new(hello_world());
        let hello = Expr::single("hello");
        let world = Expr::single("world");

        assert_eq!(engine.cos(&hello, &world).unwrap(), 0.0);
        assert_eq!(engine.coses(&[(hello.clone(), world)]).unwrap(), vec![0.0]);
        assert_eq!(engine.cos_n(&hello, 1).unwrap(), vec![Match::new("hello", 1.0)]);
    }
}
