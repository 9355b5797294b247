//! Error types shared by every qbank tool.
//!
//! Each variant maps to one failure class of the batch tools. All of them are
//! scoped to a single unit of work (one source file or one image); the batch
//! layer records them and moves on to the next unit.

use std::ops::Range;
use std::path::PathBuf;

use crate::parser::ParseFailure;

/// Main error type for qbank tools
#[derive(Debug, thiserror::Error)]
pub enum QbankError {
    /// A declared file or directory does not exist
    #[error("input not found: {}", path.display())]
    MissingInput { path: PathBuf },

    /// The file has no `const <prefix>_<Letter> = [ ... ];` declaration
    #[error("no question array found in {}", path.display())]
    ArrayNotFound { path: PathBuf },

    /// No literal-recovery strategy could read the array
    #[error("failed to parse question array in {} (bytes {}..{}): {failure}", path.display(), span.start, span.end)]
    Parse {
        path: PathBuf,
        span: Range<usize>,
        failure: ParseFailure,
    },

    /// An image could not be opened or decoded
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// An image could not be encoded to WebP
    #[error("failed to encode {}: {reason}", path.display())]
    Encode { path: PathBuf, reason: String },

    /// Renaming the original to its backup name failed
    #[error("failed to back up {}: {source}", path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing new content failed
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any other I/O error while reading inputs
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configured name or extension produced an invalid pattern
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Command line values that cannot be combined
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// Records could not be serialized back to text
    #[error("failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl QbankError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        QbankError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, QbankError>;
