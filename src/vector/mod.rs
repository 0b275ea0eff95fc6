//! Vector Module
//!
//! Fixed-dimension f32 vector arithmetic.

mod similarity;

pub use similarity::{add_scaled, dot, norm, normalize, VectorOps};
