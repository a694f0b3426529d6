//! AyurChain Storage
//!
//! Whole-file JSON persistence for the ledger chain, with trusting and
//! verifying loads, a fall-back-to-genesis policy, and a locked
//! single-writer handle.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod config;
pub mod error;
pub mod ledger;
pub mod lock;

pub use codec::{decode, encode, load, load_or_genesis, load_verified, save};
pub use config::{LedgerConfig, LoadPolicy};
pub use error::{StorageError, StorageResult};
pub use ledger::Ledger;
pub use lock::LedgerLock;
