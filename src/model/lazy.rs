//! Lazily Decoded Model
//!
//! Keeps the raw model bytes and decodes each vector on first access.
//! Loading only indexes record offsets, so it is much faster than an eager
//! load; the first lookup of each word pays the decode cost instead.

use bytes::Bytes;
use hashbrown::HashMap;
use once_cell::sync::OnceCell;
use std::fs::File;
use std::io::{BufRead, Cursor, Read};
use std::path::Path;
use std::time::Instant;
use tracing::info;

use super::loader::{self, Header};
use super::Vocabulary;
use crate::error::{Error, Result};
use crate::vector::normalize;

#[derive(Debug)]
struct LazyEntry {
    /// Byte offset of the encoded vector in the raw buffer
    offset: usize,
    decoded: OnceCell<Box<[f32]>>,
}

/// Model whose vectors are decoded on demand.
///
/// Decoding is idempotent and safe under concurrent readers: the first
/// caller for a word decodes it, everyone else waits for and shares that
/// result.
#[derive(Debug)]
pub struct LazyModel {
    dim: usize,
    raw: Bytes,
    words: HashMap<String, LazyEntry>,
}

impl LazyModel {
    /// Index a model from binary data.
    ///
    /// The whole stream is buffered and every record boundary is checked,
    /// so truncated data fails here exactly as it would for [`super::Model`].
    pub fn from_reader(mut r: impl Read) -> Result<Self> {
        let start = Instant::now();
        let mut buf = Vec::new();
        r.read_to_end(&mut buf)?;
        let raw = Bytes::from(buf);

        let mut cursor = Cursor::new(raw.as_ref());
        let header = Header::read(&mut cursor)?;
        let words = Self::index_records(&mut cursor, header)?;

        let model = Self {
            dim: header.dim,
            raw,
            words,
        };
        info!(
            "Indexed lazy model: {} words, dim {} in {:?}",
            model.words.len(),
            model.dim,
            start.elapsed()
        );
        Ok(model)
    }

    /// Index a model from a file path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        info!("Loading lazy model from {}", path.as_ref().display());
        Self::from_reader(file)
    }

    fn index_records(
        cursor: &mut Cursor<&[u8]>,
        header: Header,
    ) -> Result<HashMap<String, LazyEntry>> {
        let vector_len = header.vector_len();
        let remaining = cursor.get_ref().len() - cursor.position() as usize;
        let fits = header
            .size
            .checked_mul(header.min_record_len())
            .is_some_and(|needed| needed <= remaining);
        if !fits {
            return Err(Error::Format(format!(
                "header declares {} records of dimension {} but only {} bytes follow",
                header.size, header.dim, remaining
            )));
        }

        let mut words = HashMap::with_capacity(header.size);
        let mut word_buf = Vec::new();

        for i in 0..header.size {
            let word = loader::read_word(cursor, &mut word_buf, i)?;

            let offset = cursor.position() as usize;
            let remaining = cursor.get_ref().len() - offset;
            if remaining < vector_len {
                return Err(Error::Format(format!(
                    "truncated vector data for word {:?}: expected {} bytes",
                    word, vector_len
                )));
            }
            cursor.consume(vector_len);
            loader::skip_newline(cursor)?;

            words.insert(
                word,
                LazyEntry {
                    offset,
                    decoded: OnceCell::new(),
                },
            );
        }

        Ok(words)
    }

    fn decode<'a>(&'a self, entry: &'a LazyEntry) -> &'a [f32] {
        entry.decoded.get_or_init(|| {
            let end = entry.offset + self.dim * std::mem::size_of::<f32>();
            let mut v = vec![0.0f32; self.dim].into_boxed_slice();
            loader::decode_vector(&self.raw[entry.offset..end], &mut v);
            normalize(&mut v);
            v
        })
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

    /// Number of vectors decoded so far
    pub fn decoded(&self) -> usize {
        self.words
            .values()
            .filter(|e| e.decoded.get().is_some())
            .count()
    }
}

impl Vocabulary for LazyModel {
    fn dim(&self) -> usize {
        self.dim
    }

    fn size(&self) -> usize {
        self.words.len()
    }

    fn vector(&self, word: &str) -> Option<&[f32]> {
        self.words.get(word).map(|entry| self.decode(entry))
    }

    fn for_each_vector(&self, f: &mut dyn FnMut(&str, &[f32])) {
        for (word, entry) in &self.words {
            f(word, self.decode(entry));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::testing::{compass, encode};
    use crate::model::Model;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_lazy_matches_eager() {
        let raw = compass();
        let eager = Model::from_reader(&raw[..]).unwrap();
        let lazy = LazyModel::from_reader(&raw[..]).unwrap();

        assert_eq!(lazy.size(), eager.size());
        assert_eq!(lazy.dim(), eager.dim());
        assert_eq!(lazy.decoded(), 0);

        eager.for_each_vector(&mut |word, v| {
            assert_eq!(lazy.vector(word).unwrap(), v);
        });
        assert_eq!(lazy.decoded(), 8);
    }

    #[test]
    fn test_decode_on_access() {
        let raw = encode(2, &[("hello", &[0.0, 2.0]), ("world", &[1.0, 0.0])]);
        let lazy = LazyModel::from_reader(&raw[..]).unwrap();

        assert_eq!(lazy.vector("hello").unwrap(), &[0.0, 1.0]);
        assert_eq!(lazy.decoded(), 1);
        assert!(lazy.vector("missing").is_none());
        assert_eq!(lazy.decoded(), 1);
    }

    #[test]
    fn test_truncation_fails_at_load() {
        let mut raw = encode(2, &[("hello", &[0.0, 1.0]), ("world", &[1.0, 0.0])]);
        raw.truncate(raw.len() - 3);
        assert!(matches!(
            LazyModel::from_reader(&raw[..]),
            Err(Error::Format(_))
        ));

        let mut raw = encode(2, &[("hello", &[0.0, 1.0])]);
        raw.pop();
        assert_eq!(LazyModel::from_reader(&raw[..]).unwrap().size(), 1);
    }

    #[test]
    fn test_oversized_header_fails_at_load() {
        let raw = format!("{} 2\nhello ", usize::MAX / 8).into_bytes();
        assert!(matches!(
            LazyModel::from_reader(&raw[..]),
            Err(Error::Format(_))
        ));

        let mut raw = b"100000000 300\n".to_vec();
        raw.extend_from_slice(&encode(2, &[("hello", &[0.0, 1.0])])[4..]);
        assert!(matches!(
            LazyModel::from_reader(&raw[..]),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn test_concurrent_first_access() {
        let lazy = Arc::new(LazyModel::from_reader(&compass()[..]).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let m = lazy.clone();
                thread::spawn(move || m.vector("w3").unwrap().to_vec())
            })
            .collect();

        let results: Vec<Vec<f32>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for r in &results {
            assert_eq!(r, &results[0]);
        }
        assert_eq!(lazy.decoded(), 1);
    }
}
