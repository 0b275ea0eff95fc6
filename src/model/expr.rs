//! Expressions and Matches
//!
//! An expression is a weighted sum of vocabulary words, e.g.
//! `king + woman - man`.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Linear combination of words, evaluated to a vector by a model.
///
/// Serializes as a JSON object mapping word to weight.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Expr {
    terms: HashMap<String, f32>,
}

impl Expr {
    /// Create an empty expression
    pub fn new() -> Self {
        Self::default()
    }

    /// Expression with a single word of weight 1
    pub fn single(word: impl Into<String>) -> Self {
        let mut expr = Self::new();
        expr.add(1.0, word);
        expr
    }

    /// Add a word with the given weight; weights of repeated words accumulate.
    pub fn add(&mut self, weight: f32, word: impl Into<String>) {
        *self.terms.entry(word.into()).or_insert(0.0) += weight;
    }

    /// Add every word with the same weight
    pub fn add_all<I, S>(&mut self, weight: f32, words: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for word in words {
            self.add(weight, word);
        }
    }

    /// Add each word with its own weight, pairing them positionally.
    pub fn add_weighted<S: Into<String>>(&mut self, weights: &[f32], words: impl IntoIterator<Item = S>) {
        for (weight, word) in weights.iter().zip(words) {
            self.add(*weight, word);
        }
    }

    /// Chainable form of [`Expr::add`]
    pub fn with(mut self, weight: f32, word: impl Into<String>) -> Self {
        self.add(weight, word);
        self
    }

    /// Accumulated weight of `word`, if present
    pub fn weight(&self, word: &str) -> Option<f32> {
        self.terms.get(word).copied()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.terms.contains_key(word)
    }

    /// Number of distinct words
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Iterate over (word, weight) terms in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.terms.iter().map(|(w, c)| (w.as_str(), *c))
    }

    /// Terms sorted by word
    pub fn sorted_terms(&self) -> Vec<(&str, f32)> {
        let mut terms: Vec<_> = self.iter().collect();
        terms.sort_unstable_by(|a, b| a.0.cmp(b.0));
        terms
    }
}

impl<S: Into<String>> FromIterator<(S, f32)> for Expr {
    fn from_iter<I: IntoIterator<Item = (S, f32)>>(iter: I) -> Self {
        let mut expr = Expr::new();
        for (word, weight) in iter {
            expr.add(weight, word);
        }
        expr
    }
}

/// A word paired with its similarity to a query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub word: String,
    pub score: f32,
}

impl Match {
    /// Create a new match
    pub fn new(word: impl Into<String>, score: f32) -> Self {
        Self {
            word: word.into(),
            score,
        }
    }
}
