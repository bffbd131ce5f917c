//! Typed errors shared by the wipe and scan engines.
//!
//! Library code returns these; the binary wraps them in `anyhow` errors with context.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure while destroying a single file.
#[derive(Debug, Error)]
pub enum WipeError {
    /// Opening, writing or syncing the file failed. Its content may be partially overwritten.
    #[error("failed to overwrite {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Every pass completed and was synced, but the directory entry could not be removed.
    #[error("{path} was overwritten but could not be removed: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("wipe of {path} was cancelled")]
    Cancelled { path: PathBuf },
}

impl WipeError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// `true` when the file content is already irrecoverable.
    pub fn content_destroyed(&self) -> bool {
        matches!(self, Self::Remove { .. })
    }
}

/// Malformed address or mask handed to the subnet calculator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubnetError {
    #[error("malformed IPv4 address '{0}'")]
    MalformedAddress(String),

    #[error("malformed subnet mask '{0}'")]
    MalformedMask(String),

    #[error("prefix length {0} is out of range (0-32)")]
    PrefixOutOfRange(u8),

    #[error("subnet mask '{0}' is not contiguous")]
    NonContiguousMask(String),
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Subnet(#[from] SubnetError),

    #[error("unable to determine the local network")]
    NoLocalNetwork,
}
