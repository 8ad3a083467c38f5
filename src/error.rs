//! Error types for configuration loading and software rasterization.

use std::io;

use thiserror::Error;

/// Errors that can occur when loading or validating the game configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("Failed to read config '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    /// RON parsing failed.
    #[error("Parse error in '{path}': {details}")]
    Parse { path: String, details: String },

    /// A value is out of its allowed range.
    #[error("Invalid config value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Errors raised by the polygon fill. The painter skips the primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RasterError {
    #[error("polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    #[error("polygon has a non-finite vertex")]
    NonFinite,

    #[error("polygon has zero area")]
    Degenerate,
}
