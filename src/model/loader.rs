//! Binary Model Format
//!
//! ```text
//! <size> <dim>\n
//! <word> <dim x f32 little-endian>\n      (repeated `size` times)
//! ```
//!
//! The trailing newline of each record is optional.

use bytes::Buf;
use std::io::{BufRead, Read};

use crate::error::{Error, Result};

/// Parsed `<size> <dim>` header line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub size: usize,
    pub dim: usize,
}

impl Header {
    /// Read the header line
    pub fn read(r: &mut impl BufRead) -> Result<Self> {
        let mut line = String::new();
        let n = r.read_line(&mut line)?;
        if n == 0 {
            return Err(Error::Format("missing size/dim header".to_string()));
        }
        Self::parse(&line)
    }

    fn parse(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 2 {
            return Err(Error::Format(format!(
                "could not extract size/dim from header {:?}",
                line.trim_end()
            )));
        }

        let parse = |s: &str| {
            s.parse::<usize>()
                .map_err(|e| Error::Format(format!("invalid header value {:?}: {}", s, e)))
        };
        let size = parse(fields[0])?;
        let dim = parse(fields[1])?;
        if dim == 0 {
            return Err(Error::Format("vector dimension must be at least 1".to_string()));
        }

        // Offsets into the float table and byte lengths must be addressable
        let addressable = size
            .checked_mul(dim)
            .and_then(|n| n.checked_mul(std::mem::size_of::<f32>()))
            .is_some();
        if !addressable {
            return Err(Error::Format(format!(
                "header declares {} vectors of dimension {}: too large",
                size, dim
            )));
        }

        Ok(Self { size, dim })
    }

    /// Byte length of one encoded vector
    pub fn vector_len(&self) -> usize {
        self.dim * std::mem::size_of::<f32>()
    }

    /// Smallest possible encoded record: empty word, its space, the vector.
    pub fn min_record_len(&self) -> usize {
        self.vector_len() + 1
    }
}

/// Read a word terminated by a single space; the space is stripped.
pub fn read_word(r: &mut impl BufRead, buf: &mut Vec<u8>, record: usize) -> Result<String> {
    buf.clear();
    r.read_until(b' ', buf)?;
    if buf.last() != Some(&b' ') {
        return Err(Error::Format(format!(
            "truncated record {}: expected word followed by a space",
            record
        )));
    }
    buf.pop();
    Ok(String::from_utf8_lossy(buf).into_owned())
}

/// Read the `len` raw bytes of one vector into `buf`.
///
/// `buf` only grows as far as the input actually goes, so a header that
/// overstates the dimension fails as truncated data.
pub fn read_vector_bytes(
    r: &mut impl BufRead,
    buf: &mut Vec<u8>,
    len: usize,
    word: &str,
) -> Result<()> {
    buf.clear();
    r.by_ref().take(len as u64).read_to_end(buf)?;
    if buf.len() < len {
        return Err(Error::Format(format!(
            "truncated vector data for word {:?}: expected {} bytes, got {}",
            word,
            len,
            buf.len()
        )));
    }
    Ok(())
}

/// Consume the record terminator if present.
pub fn skip_newline(r: &mut impl BufRead) -> Result<()> {
    let next = r.fill_buf()?;
    if next.first() == Some(&b'\n') {
        r.consume(1);
    }
    Ok(())
}

/// Decode little-endian floats from `src` into `dst`.
pub fn decode_vector(mut src: &[u8], dst: &mut [f32]) {
    debug_assert_eq!(src.len(), dst.len() * std::mem::size_of::<f32>());
    for x in dst.iter_mut() {
        *x = src.get_f32_le();
    }
}
