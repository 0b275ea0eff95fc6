//! Model Module
//!
//! Immutable word -> vector tables loaded from binary word2vec data.

mod expr;
mod lazy;
pub mod loader;

pub use expr::{Expr, Match};
pub use lazy::LazyModel;

use hashbrown::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::time::Instant;
use tracing::info;

use crate::error::Result;
use crate::vector::normalize;
use loader::Header;

const PREALLOC_RECORDS: usize = 1 << 16;
const PREALLOC_FLOATS: usize = 1 << 24;

/// Read-only access to a vocabulary of unit-length vectors.
///
/// Implementations are never mutated after construction, so they can be
/// shared across threads without locking.
pub trait Vocabulary: Sync {
    /// Vector dimension
    fn dim(&self) -> usize;

    /// Number of words
    fn size(&self) -> usize;

    /// Normalized vector for `word`
    fn vector(&self, word: &str) -> Option<&[f32]>;

    /// Visit every (word, vector) entry in no particular order
    fn for_each_vector(&self, f: &mut dyn FnMut(&str, &[f32]));

    /// Copies of the vectors for the known words; unknown words are skipped.
    fn map(&self, words: &[&str]) -> HashMap<String, Vec<f32>> {
        words
            .iter()
            .filter_map(|w| self.vector(w).map(|v| (w.to_string(), v.to_vec())))
            .collect()
    }
}

/// Eagerly decoded model
///
/// All vectors live in one contiguous block; each word maps to the start
/// offset of its slice.
#[derive(Debug, Clone)]
pub struct Model {
    dim: usize,
    data: Vec<f32>,
    words: HashMap<String, usize>,
}

impl Model {
    /// Load a model from binary data. Every vector is normalized on read.
    pub fn from_reader(r: impl Read) -> Result<Self> {
        let start = Instant::now();
        let mut r = BufReader::new(r);
        let header = Header::read(&mut r)?;
        let model = Self::read_records(&mut r, header)?;

        info!(
            "Loaded model: {} words, dim {} in {:?}",
            model.size(),
            model.dim,
            start.elapsed()
        );
        Ok(model)
    }

    /// Load a model from a file path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        info!("Loading model from {}", path.as_ref().display());
        Self::from_reader(file)
    }

    fn read_records(r: &mut impl BufRead, header: Header) -> Result<Self> {
        let Header { size, dim } = header;
        // The header is untrusted; reserve at most PREALLOC_RECORDS up front
        // and let the tables grow with the records actually read.
        let reserved = size.min(PREALLOC_RECORDS);
        let mut data = Vec::with_capacity(reserved.saturating_mul(dim).min(PREALLOC_FLOATS));
        let mut words = HashMap::with_capacity(reserved);
        let mut word_buf = Vec::new();
        let mut raw = Vec::new();

        for i in 0..size {
            let word = loader::read_word(r, &mut word_buf, i)?;
            loader::read_vector_bytes(r, &mut raw, header.vector_len(), &word)?;

            let offset = data.len();
            data.resize(offset + dim, 0.0);
            let slot = &mut data[offset..];
            loader::decode_vector(&raw, slot);
            normalize(slot);
            loader::skip_newline(r)?;

            words.insert(word, offset);
        }

        Ok(Self { dim, data, words })
    }

    /// Vector dimension
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of words in the model
    pub fn size(&self) -> usize {
        self.words.len()
    }

    /// Check if a word is in the vocabulary
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains_key(word)
    }
}

impl Vocabulary for Model {
    fn dim(&self) -> usize {
        self.dim
    }

    fn size(&self) -> usize {
        self.words.len()
    }

    #[inline]
    fn vector(&self, word: &str) -> Option<&[f32]> {
        self.words
            .get(word)
            .map(|&offset| &self.data[offset..offset + self.dim])
    }

    fn for_each_vector(&self, f: &mut dyn FnMut(&str, &[f32])) {
        for (word, &offset) in &self.words {
            f(word, &self.data[offset..offset + self.dim]);
        }
    }
}
