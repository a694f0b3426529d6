//! Core error types for AyurChain.

use thiserror::Error;

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Fingerprint is not 64 hex characters
    #[error("Invalid fingerprint: {reason}")]
    InvalidFingerprint {
        /// Why the fingerprint was rejected
        reason: String,
    },

    /// Timestamp is negative or not finite
    #[error("Invalid timestamp: {reason}")]
    InvalidTimestamp {
        /// Why the timestamp was rejected
        reason: String,
    },

    /// A chain must always hold its genesis block
    #[error("Chain has no genesis block")]
    EmptyChain,
}
