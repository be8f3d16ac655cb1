use thiserror::Error;

/// Failures at the crate's dynamically sized surfaces. Numeric domain
/// problems (log of a non-positive value) are not represented here; they
/// propagate as non-finite floats.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScalargradError {
    #[error("shape mismatch: expected {expected} values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
}
