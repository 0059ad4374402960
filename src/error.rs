//! Error types for the rotating sink and its configuration.
//!
//! Two families share one enum: configuration errors, reported before any
//! file is touched, and I/O errors raised while piping, which are always
//! fatal. Nothing here is retried.

use std::error::Error as StdError;
use std::io;
use std::path::PathBuf;

use crate::size::SizeParseError;

/// Result type for rotpipe operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by configuration, the sink, and the input pump.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Size threshold could not be parsed.
    #[error("invalid size: {0}")]
    Size(#[from] SizeParseError),

    /// One or more settings are invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Config file could not be read or parsed.
    #[error("failed to load config file {}: {source}", .path.display())]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// Active file could not be opened for appending.
    #[error("can't open {} for appending: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Write to the active file failed or was short.
    #[error("error writing to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A rename in the backup shift failed.
    #[error("rename failed {} -> {}: {source}", .from.display(), .to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading the input stream failed.
    #[error("error reading input: {0}")]
    Read(#[source] io::Error),

    /// Sink lost its handle after an earlier failure.
    #[error("sink for {} has no open file", .path.display())]
    Closed { path: PathBuf },
}

impl Error {
    /// Create a configuration error.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config(reason.into())
    }

    pub(crate) fn config_file(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self::ConfigFile {
            path: path.into(),
            source: source.into(),
        }
    }

    pub(crate) fn open(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Open {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn rename(
        from: impl Into<PathBuf>,
        to: impl Into<PathBuf>,
        source: io::Error,
    ) -> Self {
        Self::Rename {
            from: from.into(),
            to: to.into(),
            source,
        }
    }

    /// Returns true for errors detected before any file I/O.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(
            self,
            Self::Size(_) | Self::Config(_) | Self::ConfigFile { .. }
        )
    }
}
