//! Core compute primitives (Vector, Matrix).
//!
//! Dense row-major storage in `f64`, sized for latent-factor models that
//! fit comfortably in memory.

mod matrix;
mod vector;

pub use matrix::Matrix;
pub use vector::Vector;
