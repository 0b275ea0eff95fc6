//! Expression Digests
//!
//! Order-independent content hash of an expression, used as a cache key.

use sha1::{Digest, Sha1};
use std::fmt;

use crate::model::Expr;

/// SHA-1 of an expression's terms sorted by word
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprDigest([u8; 20]);

impl ExprDigest {
    /// Hash each length-prefixed word followed by its NUL-terminated
    /// weight, in word order.
    ///
    /// Weights are widened to f64 and printed in shortest round-trip form,
    /// so distinct f32 weights never collide.
    pub fn of(expr: &Expr) -> Self {
        let mut hasher = Sha1::new();
        for (word, weight) in expr.sorted_terms() {
            hasher.update((word.len() as u64).to_le_bytes());
            hasher.update(word.as_bytes());
            hasher.update(format!("{}", weight as f64).as_bytes());
            hasher.update([0u8]);
        }
        Self(hasher.finalize().into())
    }
}

impl fmt::Debug for ExprDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0[..6] {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}
