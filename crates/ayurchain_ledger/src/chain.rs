//! Hash chain for tamper-evident event logging.
//!
//! Each block's previous fingerprint must match the fingerprint of the block
//! before it, and every stored fingerprint must match its recomputed value.

use crate::block::Block;
use crate::payload::Payload;
use ayurchain_core::{CoreError, CoreResult, Fingerprint, Link, Timestamp};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// An integrity problem found while auditing a chain
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    /// Block index does not match its position
    #[error("Block at position {position} carries index {found}")]
    IndexGap {
        /// Position in the chain
        position: u64,
        /// Index stored in the block
        found: u64,
    },
    /// Previous fingerprint does not point at the preceding block
    #[error("Broken hash chain at position {position}: expected {expected}, found {actual}")]
    BrokenLink {
        /// Position in the chain
        position: u64,
        /// Link the block should carry
        expected: Link,
        /// Link the block carries
        actual: Link,
    },
    /// Stored fingerprint does not match the block contents
    #[error("Fingerprint mismatch at position {position}: stored {stored}, computed {computed}")]
    FingerprintMismatch {
        /// Position in the chain
        position: u64,
        /// Fingerprint stored in the block
        stored: Fingerprint,
        /// Fingerprint recomputed from the contents
        computed: Fingerprint,
    },
}

impl Violation {
    /// Position of the offending block
    #[must_use]
    pub const fn position(&self) -> u64 {
        match self {
            Self::IndexGap { position, .. }
            | Self::BrokenLink { position, .. }
            | Self::FingerprintMismatch { position, .. } => *position,
        }
    }
}

/// Append-only sequence of blocks, starting at genesis
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    blocks: Vec<Block>,
}

impl Chain {
    /// Create a chain holding only a genesis block stamped now
    #[must_use]
    pub fn new() -> Self {
        Self::with_genesis_at(Timestamp::now())
    }

    /// Create a chain whose genesis block carries `timestamp`
    #[must_use]
    pub fn with_genesis_at(timestamp: Timestamp) -> Self {
        Self {
            blocks: vec![Block::genesis(timestamp)],
        }
    }

    /// Rebuild a chain from stored blocks without checking them
    ///
    /// Fingerprints are trusted as stored; call [`Chain::validate`] or
    /// [`Chain::audit`] to check them.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyChain`] if `blocks` is empty
    pub fn from_blocks(blocks: Vec<Block>) -> CoreResult<Self> {
        if blocks.is_empty() {
            return Err(CoreError::EmptyChain);
        }
        Ok(Self { blocks })
    }

    /// Append an event stamped now
    pub fn append(&mut self, payload: Payload) -> Block {
        self.append_at(payload, Timestamp::now())
    }

    /// Append an event with an explicit timestamp
    ///
    /// Timestamps are not required to increase.
    pub fn append_at(&mut self, payload: Payload, timestamp: Timestamp) -> Block {
        let index = self.blocks.len() as u64;
        let previous = Link::Block(*self.latest().fingerprint());
        let block = Block::new(index, timestamp, payload, previous);
        debug!(index, fingerprint = %block.fingerprint(), "appended block");
        self.blocks.push(block.clone());
        block
    }

    /// Whether every block passes the integrity checks
    #[must_use]
    pub fn validate(&self) -> bool {
        self.first_invalid().is_none()
    }

    /// Index of the first block that fails an integrity check
    #[must_use]
    pub fn first_invalid(&self) -> Option<u64> {
        let mut scratch = Vec::new();
        (0..self.blocks.len()).find_map(|position| {
            self.check_at(position, &mut scratch);
            (!scratch.is_empty()).then_some(position as u64)
        })
    }

    /// Every integrity violation, in chain order
    #[must_use]
    pub fn audit(&self) -> Vec<Violation> {
        let mut violations = Vec::new();
        for position in 0..self.blocks.len() {
            self.check_at(position, &mut violations);
        }
        violations
    }

    fn check_at(&self, position: usize, out: &mut Vec<Violation>) {
        let block = &self.blocks[position];
        let pos = position as u64;

        if block.index() != pos {
            out.push(Violation::IndexGap {
                position: pos,
                found: block.index(),
            });
        }

        let expected = match position.checked_sub(1) {
            None => Link::Origin,
            Some(prev) => Link::Block(*self.blocks[prev].fingerprint()),
        };
        if *block.previous_fingerprint() != expected {
            out.push(Violation::BrokenLink {
                position: pos,
                expected,
                actual: *block.previous_fingerprint(),
            });
        }

        let computed = block.recompute_fingerprint();
        if computed != *block.fingerprint() {
            out.push(Violation::FingerprintMismatch {
                position: pos,
                stored: *block.fingerprint(),
                computed,
            });
        }
    }

    /// Detached copy of every block, in order
    #[must_use]
    pub fn export(&self) -> Vec<Block> {
        self.blocks.clone()
    }

    /// Blocks whose payload holds `value` under `key`, in order
    #[must_use]
    pub fn find_by_field(&self, key: &str, value: impl Into<Value>) -> Vec<Block> {
        let value = value.into();
        self.blocks
            .iter()
            .filter(|b| b.payload().get(key) == Some(&value))
            .cloned()
            .collect()
    }

    /// The genesis block
    #[must_use]
    pub fn genesis(&self) -> &Block {
        &self.blocks[0]
    }

    /// The most recently appended block
    #[must_use]
    pub fn latest(&self) -> &Block {
        &self.blocks[self.blocks.len() - 1]
    }

    /// Block at `index`
    #[must_use]
    pub fn get(&self, index: u64) -> Option<&Block> {
        usize::try_from(index).ok().and_then(|i| self.blocks.get(i))
    }

    /// Iterate blocks in order
    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    /// Number of blocks, genesis included
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false: a chain holds at least its genesis block
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn block_mut(&mut self, index: usize) -> &mut Block {
        &mut self.blocks[index]
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a Chain {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn event(n: usize) -> Payload {
        Payload::new()
            .with("role", "Processor")
            .with("batch_id", format!("B{}", n % 3))
            .with("process", format!("step {n}"))
    }

    fn chain_with(n: usize) -> Chain {
        let mut chain = Chain::new();
        for i in 0..n {
            chain.append(event(i));
        }
        chain
    }

    #[test]
    fn test_chain_new() {
        let chain = Chain::new();
        assert_eq!(chain.len(), 1);
        assert!(!chain.is_empty());
        assert_eq!(chain.genesis().index(), 0);
        assert_eq!(chain.genesis().previous_fingerprint(), &Link::Origin);
        assert_eq!(chain.genesis().payload(), &Payload::genesis());
        assert!(chain.validate());
        assert_eq!(chain.first_invalid(), None);
    }

    #[test]
    fn test_chain_append() {
        let mut chain = Chain::new();
        let b1 = chain.append(event(0));
        let b2 = chain.append(event(1));

        assert_eq!(b1.index(), 1);
        assert_eq!(b2.index(), 2);
        assert!(b1.previous_fingerprint().points_to(chain.genesis().fingerprint()));
        assert!(b2.previous_fingerprint().points_to(b1.fingerprint()));
        assert_eq!(chain.latest(), &b2);
        assert!(chain.validate());
    }

    #[test]
    fn test_append_returns_detached_copy() {
        let mut chain = Chain::new();
        let mut block = chain.append(event(0));
        block.payload_mut().insert("process", "forged");
        assert!(chain.validate());
        assert_eq!(chain.get(1).unwrap().payload().get_str("process"), Some("step 0"));
    }

    #[test]
    fn test_out_of_order_timestamps_accepted() {
        let mut chain = Chain::with_genesis_at(Timestamp::from_secs_f64(100.0).unwrap());
        chain.append_at(event(0), Timestamp::from_secs_f64(50.0).unwrap());
        assert!(chain.validate());
    }

    #[test]
    fn test_tampered_payload_reports_position() {
        let mut chain = chain_with(4);
        chain.block_mut(2).payload_mut().insert("batch_id", "FORGED");

        assert!(!chain.validate());
        assert_eq!(chain.first_invalid(), Some(2));

        let violations = chain.audit();
        assert_eq!(violations.len(), 1);
        assert!(matches!(
            violations[0],
            Violation::FingerprintMismatch { position: 2, .. }
        ));
    }

    #[test]
    fn test_tampered_genesis_detected() {
        let mut chain = chain_with(2);
        chain.block_mut(0).payload_mut().insert("msg", "Not genesis");
        assert_eq!(chain.first_invalid(), Some(0));
    }

    #[test]
    fn test_broken_link_detected() {
        let mut a = Chain::with_genesis_at(Timestamp::from_secs_f64(1.0).unwrap());
        let mut b = Chain::with_genesis_at(Timestamp::from_secs_f64(2.0).unwrap());
        for i in 0..3 {
            a.append(event(i));
            b.append(event(i));
        }
        // Splice a block from an unrelated chain: intact on its own, wrong link
        let mut blocks = a.export();
        blocks[2] = b.export()[2].clone();
        let spliced = Chain::from_blocks(blocks).unwrap();

        assert!(!spliced.validate());
        let violations = spliced.audit();
        assert!(violations
            .iter()
            .any(|v| matches!(v, Violation::BrokenLink { position: 2, .. })));
        assert_eq!(violations[0].position(), 2);
    }

    #[test]
    fn test_from_blocks_empty() {
        assert_eq!(Chain::from_blocks(Vec::new()), Err(CoreError::EmptyChain));
    }

    #[test]
    fn test_find_by_field() {
        let chain = chain_with(7);
        let hits = chain.find_by_field("batch_id", "B1");
        let indices: Vec<_> = hits.iter().map(Block::index).collect();
        assert_eq!(indices, [2, 5]);
        assert!(chain.find_by_field("batch_id", "missing").is_empty());
        assert!(chain.find_by_field("nope", "B1").is_empty());
    }

    #[test]
    fn test_export_is_detached() {
        let chain = chain_with(2);
        let mut exported = chain.export();
        exported.clear();
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn test_violation_display() {
        let v = Violation::IndexGap {
            position: 4,
            found: 9,
        };
        assert_eq!(v.to_string(), "Block at position 4 carries index 9");
    }

    proptest! {
        #[test]
        fn prop_append_monotonic(n in 0usize..40) {
            let chain = chain_with(n);
            prop_assert_eq!(chain.len(), n + 1);
            for (i, block) in chain.iter().enumerate() {
                prop_assert_eq!(block.index(), i as u64);
            }
        }

        #[test]
        fn prop_link_integrity(n in 1usize..40) {
            let chain = chain_with(n);
            let blocks = chain.export();
            for pair in blocks.windows(2) {
                prop_assert!(pair[1].previous_fingerprint().points_to(pair[0].fingerprint()));
            }
            prop_assert!(chain.validate());
        }

        #[test]
        fn prop_single_tamper_detected(n in 1usize..25, target in any::<prop::sample::Index>(), junk in ".{0,8}") {
            let mut chain = chain_with(n);
            let position = target.index(chain.len());
            chain.block_mut(position).payload_mut().insert("tampered", junk);
            prop_assert!(!chain.validate());
            prop_assert_eq!(chain.first_invalid(), Some(position as u64));
        }
    }
}
