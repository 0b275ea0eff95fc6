//! Vector Arithmetic
//!
//! Single-precision primitives used by expression evaluation and ranking.
//! Both operands of a binary operation must have the same dimension.

/// Vector operations on word vectors
pub trait VectorOps {
    fn dot(&self, other: &Self) -> f32;
    fn add_scaled(&mut self, a: f32, other: &Self);
    fn norm(&self) -> f32;
    fn normalize(&mut self);
}

impl VectorOps for [f32] {
    #[inline]
    fn dot(&self, other: &Self) -> f32 {
        dot(self, other)
    }

    #[inline]
    fn add_scaled(&mut self, a: f32, other: &Self) {
        add_scaled(self, a, other)
    }

    #[inline]
    fn norm(&self) -> f32 {
        norm(self)
    }

    fn normalize(&mut self) {
        normalize(self)
    }
}

/// Compute dot product of two vectors
///
/// Uses unrolled loop for better CPU performance.
#[inline]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

    let len = a.len();
    let mut sum = 0.0f32;

    let chunks = len / 4;
    let remainder = len % 4;

    for i in 0..chunks {
        let idx = i * 4;
        sum += a[idx] * b[idx];
        sum += a[idx + 1] * b[idx + 1];
        sum += a[idx + 2] * b[idx + 2];
        sum += a[idx + 3] * b[idx + 3];
    }

    for i in (len - remainder)..len {
        sum += a[i] * b[i];
    }

    sum
}

/// In-place `v[i] += a * u[i]`
#[inline]
pub fn add_scaled(v: &mut [f32], a: f32, u: &[f32]) {
    debug_assert_eq!(v.len(), u.len(), "Vector dimensions must match");

    for (x, y) in v.iter_mut().zip(u) {
        *x += a * y;
    }
}

/// Euclidean norm
#[inline]
pub fn norm(v: &[f32]) -> f32 {
    dot(v, v).sqrt()
}

/// Normalize a vector in place.
///
/// A zero vector yields NaN components; no correction is applied.
pub fn normalize(v: &mut [f32]) {
    let n = norm(v);
    for x in v.iter_mut() {
        *x /= n;
    }
}
