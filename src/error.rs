//! Error types for video conversion

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the conversion pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// Input path is missing, unreadable, or contains no video frames
    #[error("source not found or unreadable: {}", path.display())]
    SourceNotFound { path: PathBuf },

    /// A configuration value was rejected during startup validation
    #[error("invalid {field}: {reason}")]
    Config { field: &'static str, reason: String },

    /// Frame geometry cannot fit a single glyph cell
    #[error("frame {width}x{height} is smaller than a single glyph cell")]
    InvalidDimensions { width: u32, height: u32 },

    /// Probing or decoding the source failed after it was opened
    #[error("decoding {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    /// Creating the staging area failed
    #[error("staging directory {}: {source}", path.display())]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing a rendered frame to the staging directory failed
    #[error("persisting frame {index} to {}: {source}", path.display())]
    Persistence {
        index: usize,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Assembling the final video failed
    #[error("writing output video {}: {reason}", path.display())]
    Mux { path: PathBuf, reason: String },

    /// The source has an audio track but extraction failed
    #[error("extracting audio from {}: {reason}", path.display())]
    AudioExtraction { path: PathBuf, reason: String },
}

impl Error {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        Error::Config {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn decode(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::Decode {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, Error>;
