//! Storage error types.

use ayurchain_ledger::Violation;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Storage result type
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage error
#[derive(Debug, Error)]
pub enum StorageError {
    /// Ledger file does not exist
    #[error("Ledger not found: {}", .path.display())]
    NotFound {
        /// Missing file
        path: PathBuf,
    },

    /// Ledger file could not be read
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: io::Error,
    },

    /// Ledger file is not a sequence of block records
    #[error("Malformed ledger {}: {reason}", .path.display())]
    Malformed {
        /// File being decoded
        path: PathBuf,
        /// Decoder message
        reason: String,
    },

    /// Ledger decoded but failed the integrity audit
    #[error("Ledger failed verification at block {first_invalid} ({} violation(s))", .violations.len())]
    Tampered {
        /// First offending block
        first_invalid: u64,
        /// Every violation found
        violations: Vec<Violation>,
    },

    /// Another process holds the ledger lock
    #[error("Ledger already in use{}: {}", .pid.map(|p| format!(" by process {p}")).unwrap_or_default(), .path.display())]
    Locked {
        /// PID recorded in the lock file, if readable
        pid: Option<u32>,
        /// Lock file
        path: PathBuf,
    },

    /// Ledger could not be written
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        /// Destination
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    /// Whether starting from a fresh chain is an acceptable response
    #[must_use]
    pub const fn is_recoverable_read(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Io { .. } | Self::Malformed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StorageError::NotFound {
            path: PathBuf::from("data/ledger.json"),
        };
        assert_eq!(err.to_string(), "Ledger not found: data/ledger.json");

        let err = StorageError::Locked {
            pid: Some(42),
            path: PathBuf::from("data/ledger.lock"),
        };
        assert_eq!(
            err.to_string(),
            "Ledger already in use by process 42: data/ledger.lock"
        );
    }

    #[test]
    fn test_recoverable_reads() {
        let malformed = StorageError::Malformed {
            path: PathBuf::from("x"),
            reason: "EOF".into(),
        };
        assert!(malformed.is_recoverable_read());

        let tampered = StorageError::Tampered {
            first_invalid: 1,
            violations: Vec::new(),
        };
        assert!(!tampered.is_recoverable_read());
    }
}
