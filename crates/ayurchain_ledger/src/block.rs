//! Ledger blocks.
//!
//! A block is one recorded event plus its position and fingerprint. Blocks
//! are built by the [`Chain`](crate::Chain) only; the fingerprint is always
//! derived here, never supplied by a caller.

use crate::encoding::CanonicalEncode;
use crate::payload::Payload;
use ayurchain_core::{Fingerprint, FingerprintHasher, Link, Timestamp};
use serde::{Deserialize, Serialize};

/// Separator between fingerprint input fields
///
/// Index, timestamp and link never contain it, so the payload in the middle
/// is always recovered unambiguously.
const FIELD_SEPARATOR: &str = "|";

/// Compute the fingerprint of a block's contents
///
/// SHA-256 over `index|timestamp|canonical(payload)|previous`.
#[must_use]
pub fn compute_fingerprint(
    index: u64,
    timestamp: Timestamp,
    payload: &Payload,
    previous: &Link,
) -> Fingerprint {
    let mut hasher = FingerprintHasher::new();
    hasher
        .update(index.to_string())
        .update(FIELD_SEPARATOR)
        .update(timestamp.to_string())
        .update(FIELD_SEPARATOR)
        .update(payload.canonical())
        .update(FIELD_SEPARATOR)
        .update(previous.to_string());
    hasher.finalize()
}

/// A single ledger record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    index: u64,
    timestamp: Timestamp,
    #[serde(rename = "data")]
    payload: Payload,
    #[serde(rename = "previous_hash")]
    previous_fingerprint: Link,
    #[serde(rename = "hash")]
    fingerprint: Fingerprint,
}

impl Block {
    pub(crate) fn new(index: u64, timestamp: Timestamp, payload: Payload, previous: Link) -> Self {
        let fingerprint = compute_fingerprint(index, timestamp, &payload, &previous);
        Self {
            index,
            timestamp,
            payload,
            previous_fingerprint: previous,
            fingerprint,
        }
    }

    pub(crate) fn genesis(timestamp: Timestamp) -> Self {
        Self::new(0, timestamp, Payload::genesis(), Link::Origin)
    }

    /// Position in the chain
    #[must_use]
    pub const fn index(&self) -> u64 {
        self.index
    }

    /// Creation time
    #[must_use]
    pub const fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Event data
    #[must_use]
    pub const fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Link to the preceding block
    #[must_use]
    pub const fn previous_fingerprint(&self) -> &Link {
        &self.previous_fingerprint
    }

    /// Stored fingerprint
    #[must_use]
    pub const fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Fingerprint recomputed from the current contents
    #[must_use]
    pub fn recompute_fingerprint(&self) -> Fingerprint {
        compute_fingerprint(
            self.index,
            self.timestamp,
            &self.payload,
            &self.previous_fingerprint,
        )
    }

    /// Whether the stored fingerprint matches the contents
    #[must_use]
    pub fn is_intact(&self) -> bool {
        self.recompute_fingerprint() == self.fingerprint
    }

    #[cfg(test)]
    pub(crate) fn payload_mut(&mut self) -> &mut Payload {
        &mut self.payload
    }
}
