/*!
 * Error types for the smilcorpus pipeline.
 *
 * Every stage reports failures through `CorpusError`. All variants are fatal
 * for the run; the orchestration layer wraps them in `anyhow::Error` with
 * additional context before they reach the user.
 */

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while building the corpus
#[derive(Error, Debug)]
pub enum CorpusError {
    /// A source document is missing its counterpart or a reference cannot be resolved
    #[error("Structural error in {path:?}: {message}")]
    Structural {
        /// Document in which the problem was found
        path: PathBuf,
        /// What is missing or unresolved
        message: String,
    },

    /// A clip timestamp does not match `H:MM:SS.fff`
    #[error("Invalid clock value: {value:?}")]
    TimestampFormat {
        /// The offending value as it appeared in the document
        value: String,
    },

    /// An external tool could not be run or exited non-zero
    #[error("{tool} failed for {path:?} ({status}): {stderr}")]
    ExternalTool {
        /// Tool name (e.g. "ffmpeg")
        tool: String,
        /// File being processed
        path: PathBuf,
        /// Exit status description
        status: String,
        /// Filtered diagnostic output
        stderr: String,
    },

    /// Filesystem operation failed
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// WAV decoding or encoding failed
    #[error("Audio error in {path:?}: {message}")]
    Audio {
        path: PathBuf,
        message: String,
    },

    /// The EPUB container could not be read
    #[error("Archive error in {path:?}: {message}")]
    Archive {
        path: PathBuf,
        message: String,
    },
}

impl CorpusError {
    /// Build a structural error for the given document
    pub fn structural<P: AsRef<Path>>(path: P, message: impl Into<String>) -> Self {
        Self::Structural {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Build an I/O error for the given path
    pub fn io<P: AsRef<Path>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Build an audio error for the given file
    pub fn audio<P: AsRef<Path>>(path: P, message: impl Into<String>) -> Self {
        Self::Audio {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Build an archive error for the given container
    pub fn archive<P: AsRef<Path>>(path: P, message: impl Into<String>) -> Self {
        Self::Archive {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }
}

/// Result alias used by the pipeline stages
pub type CorpusResult<T> = std::result::Result<T, CorpusError>;
