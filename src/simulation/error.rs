//! Error type shared by every part of the simulation core.

use thiserror::Error;

/// Errors raised by the simulation core.
///
/// Configuration and dimension errors point at wiring bugs in the caller and
/// are always surfaced. Degenerate geometry is only reported by the explicit
/// validators; the intersection routines treat it as "no intersection".
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid topology, sensor setup, parameters or population size.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A vector or layer did not have the length the receiver expects.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Length the receiver was built for.
        expected: usize,
        /// Length that was supplied.
        actual: usize,
    },

    /// Zero-length segment or polygon with fewer than three vertices.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// No agent with this index exists.
    #[error("unknown agent {0}")]
    UnknownAgent(usize),

    /// Operation not allowed in the fleet's current phase.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// Reading or writing a persisted file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Persisted data was not valid JSON for the requested type.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
