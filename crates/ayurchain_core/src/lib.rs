//! AyurChain Core Types
//!
//! This crate contains pure types and logic with no I/O.
//! Fingerprints, chain links, and wall-clock timestamps shared by the
//! ledger and its persistence layer.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod hash;
pub mod time;

// Re-exports
pub use error::{CoreError, CoreResult};
pub use hash::{Fingerprint, FingerprintHasher, Link};
pub use time::Timestamp;
