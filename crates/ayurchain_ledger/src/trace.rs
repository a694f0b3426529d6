//! Batch provenance lookup.
//!
//! A [`BatchTrace`] is what a consumer sees for one batch: every matching
//! record plus the integrity verdict of the chain they came from. Report and
//! QR renderers consume it as JSON.

use crate::block::Block;
use crate::chain::Chain;
use ayurchain_core::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Payload key that groups events into batches
pub const BATCH_KEY: &str = "batch_id";

/// Records for one batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchTrace {
    /// Batch looked up
    pub batch_id: String,
    /// When the lookup ran
    pub generated_at: Timestamp,
    /// Whether the whole chain validated
    pub chain_valid: bool,
    /// Position of the first violation, if any
    pub first_invalid: Option<u64>,
    /// Matching blocks in chain order
    pub entries: Vec<Block>,
}

impl BatchTrace {
    /// Collect every record for `batch_id`, in submission order
    #[must_use]
    pub fn collect(chain: &Chain, batch_id: &str) -> Self {
        let first_invalid = chain.first_invalid();
        Self {
            batch_id: batch_id.to_string(),
            generated_at: Timestamp::now(),
            chain_valid: first_invalid.is_none(),
            first_invalid,
            entries: chain.find_by_field(BATCH_KEY, batch_id),
        }
    }

    /// No record mentions the batch
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// QR label content for the most recent event: `{"batch_id", "event"}`
    #[must_use]
    pub fn latest_event(&self) -> Option<Value> {
        self.entries.last().map(|block| {
            json!({
                "batch_id": self.batch_id,
                "event": block.payload(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::Payload;

    #[test]
    fn test_collect_batch() {
        let mut chain = Chain::new();
        chain.append(Payload::new().with("role", "Farmer").with(BATCH_KEY, "B1"));
        chain.append(Payload::new().with("role", "Farmer").with(BATCH_KEY, "B2"));
        chain.append(Payload::new().with("role", "Processor").with(BATCH_KEY, "B1"));

        let trace = BatchTrace::collect(&chain, "B1");
        assert!(trace.chain_valid);
        assert_eq!(trace.first_invalid, None);
        assert_eq!(trace.entries.len(), 2);

        let label = trace.latest_event().unwrap();
        assert_eq!(label["batch_id"], "B1");
        assert_eq!(label["event"]["role"], "Processor");
    }

    #[test]
    fn test_unknown_batch() {
        let chain = Chain::new();
        let trace = BatchTrace::collect(&chain, "nope");
        assert!(trace.is_empty());
        assert!(trace.latest_event().is_none());
    }
}
