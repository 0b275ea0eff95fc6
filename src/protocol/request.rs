//! Query Bodies

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::Expr;

/// Similarity between two expressions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CosQuery {
    #[serde(default)]
    pub a: Expr,
    #[serde(default)]
    pub b: Expr,
}

/// Similarity between `a[i]` and `b[i]` for every `i`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CosesQuery {
    pub a: Vec<Expr>,
    pub b: Vec<Expr>,
}

impl CosesQuery {
    pub fn from_pairs(pairs: &[(Expr, Expr)]) -> Self {
        let (a, b) = pairs.iter().cloned().unzip();
        Self { a, b }
    }

    /// Zip the two sides into pairs; both sides must have the same length.
    pub fn into_pairs(self) -> Result<Vec<(Expr, Expr)>> {
        if self.a.len() != self.b.len() {
            return Err(Error::InvalidQuery(format!(
                "mismatched batch sizes: {} a-expressions, {} b-expressions",
                self.a.len(),
                self.b.len()
            )));
        }
        Ok(self.a.into_iter().zip(self.b).collect())
    }
}

/// The `n` words most similar to an expression
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CosNQuery {
    pub expr: Expr,
    pub n: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coses_pairs() {
        let pairs = vec![
            (Expr::single("a"), Expr::single("b")),
            (Expr::single("c"), Expr::single("d")),
        ];
        let query = CosesQuery::from_pairs(&pairs);
        assert_eq!(query.a.len(), 2);
        assert_eq!(query.into_pairs().unwrap(), pairs);
    }

    #[test]
    fn test_coses_mismatched_sides() {
        let query = CosesQuery {
            a: vec![Expr::single("a")],
            b: vec![],
        };
        assert!(matches!(query.into_pairs(), Err(Error::InvalidQuery(_))));
    }

    #[test]
    fn test_cos_n_wire_format() {
        let query: CosNQuery =
            serde_json::from_str(r#"{"expr":{"king":1,"man":-1,"woman":1},"n":10}"#).unwrap();
        assert_eq!(query.n, 10);
        assert_eq!(query.expr.weight("man"), Some(-1.0));
    }
}
