//! AyurChain Ledger
//!
//! Append-only, hash-linked record of herbal supply-chain events.
//! Blocks are fingerprinted over a canonical encoding so validation holds
//! across persist/reload cycles.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod block;
pub mod chain;
pub mod encoding;
pub mod event;
pub mod payload;
pub mod trace;

pub use block::{compute_fingerprint, Block};
pub use chain::{Chain, Violation};
pub use encoding::CanonicalEncode;
pub use event::{EventError, HarvestEvent, LabTestEvent, ProcessingEvent, Role, RoleEvent};
pub use payload::{Payload, GENESIS_MESSAGE};
pub use trace::{BatchTrace, BATCH_KEY};
