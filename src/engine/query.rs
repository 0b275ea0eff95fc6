//! Similarity Queries
//!
//! Expression evaluation, pairwise cosine and top-N ranking over any
//! [`Vocabulary`].

use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{Expr, Match, Vocabulary};
use crate::vector::{add_scaled, dot, normalize};

/// Evaluate an expression to a unit vector.
///
/// Fails on an empty expression before any lookup, or on the first word
/// missing from the vocabulary.
pub fn eval<V: Vocabulary + ?Sized>(vocab: &V, expr: &Expr) -> Result<Vec<f32>> {
    if expr.is_empty() {
        return Err(Error::EmptyExpression);
    }

    let mut v = vec![0.0f32; vocab.dim()];
    for (word, weight) in expr.iter() {
        let u = vocab.vector(word).ok_or_else(|| Error::not_found(word))?;
        add_scaled(&mut v, weight, u);
    }
    normalize(&mut v);
    Ok(v)
}

/// Cosine similarity of two expressions
pub fn cos<V: Vocabulary + ?Sized>(vocab: &V, a: &Expr, b: &Expr) -> Result<f32> {
    let u = eval(vocab, a)?;
    let v = eval(vocab, b)?;
    Ok(dot(&u, &v))
}

/// Cosine similarity of each pair, in order. Fails on the first bad pair.
pub fn coses<V: Vocabulary + ?Sized>(vocab: &V, pairs: &[(Expr, Expr)]) -> Result<Vec<f32>> {
    pairs.iter().map(|(a, b)| cos(vocab, a, b)).collect()
}

/// The `n` words most similar to an expression
pub fn cos_n<V: Vocabulary + ?Sized>(vocab: &V, expr: &Expr, n: usize) -> Result<Vec<Match>> {
    let v = eval(vocab, expr)?;
    Ok(top_n(vocab, &v, n))
}

/// Similarity of two single words
pub fn sim<V: Vocabulary + ?Sized>(vocab: &V, x: &str, y: &str) -> Result<f32> {
    cos(vocab, &Expr::single(x), &Expr::single(y))
}

/// Scan the whole vocabulary and keep the `n` best matches for `v`.
///
/// `n` is capped at the vocabulary size. `n == 0` returns without scanning.
pub fn top_n<V: Vocabulary + ?Sized>(vocab: &V, v: &[f32], n: usize) -> Vec<Match> {
    let n = n.min(vocab.size());
    if n == 0 {
        return Vec::new();
    }

    let mut top = TopN::new(n);
    vocab.for_each_vector(&mut |word, u| top.offer(word, dot(v, u)));

    debug!(n, vocab = vocab.size(), "Ranked top matches");
    top.into_matches()
}

/// Fixed-capacity buffer of the best matches in descending score order.
///
/// Insertion is linear in `n`, which beats a heap for the small `n`
/// typical of similarity lookups.
#[derive(Debug)]
pub struct TopN {
    capacity: usize,
    matches: Vec<Match>,
}

impl TopN {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            matches: Vec::with_capacity(capacity),
        }
    }

    /// Offer a candidate; it is kept if it beats or ties the current worst.
    pub fn offer(&mut self, word: &str, score: f32) {
        if self.capacity == 0 {
            return;
        }
        if self.matches.len() == self.capacity {
            match self.matches.last() {
                Some(worst) if worst.score > score => return,
                _ => {
                    self.matches.pop();
                }
            }
        }

        // Ties go ahead of existing entries with the same score.
        let pos = self.matches.partition_point(|m| m.score > score);
        self.matches.insert(pos, Match::new(word, score));
    }

    pub fn into_matches(self) -> Vec<Match> {
        self.matches
    }
}
