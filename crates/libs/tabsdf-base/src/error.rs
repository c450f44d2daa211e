//! Error type for tabsdf.

use crate::ColorModel;
use std::path::PathBuf;

/// Errors that can be recovered from at the boundary of the library.
///
/// Precondition violations (empty axes, mismatched spectrum lengths,
/// out-of-range indices) are programming errors and panic instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The color model can't be used by the requested operation.
    #[error("Unsupported color model: {0}")]
    UnsupportedColorModel(ColorModel),

    /// The sample grid contains NaN or infinite values.
    #[error("The sample grid contains non-finite values")]
    InvalidSamples,

    /// Reading or writing a file failed.
    #[error("I/O error on '{path}': {source}")]
    Io {
        /// Path of the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Creates an I/O error attached to a file path.
    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
