//! Single-writer ledger handle.
//!
//! Couples a [`Chain`] with its file so every accepted event is on disk
//! before the producer gets its block back. Appending needs `&mut self`;
//! share across threads with `Arc<Mutex<Ledger>>` so append and save stay in
//! one critical section.

use crate::codec;
use crate::config::{LedgerConfig, LoadPolicy};
use crate::error::{StorageError, StorageResult};
use crate::lock::LedgerLock;
use ayurchain_ledger::{Block, Chain, Payload};
use std::path::Path;
use tracing::{info, warn};

/// An open, persisted ledger
#[derive(Debug)]
pub struct Ledger {
    config: LedgerConfig,
    chain: Chain,
    _lock: Option<LedgerLock>,
}

impl Ledger {
    /// Open the ledger described by `config`
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Locked`] if another process holds the ledger,
    /// or a load error allowed through by the configured [`LoadPolicy`]
    pub fn open(config: LedgerConfig) -> StorageResult<Self> {
        let lock = if config.lock {
            Some(LedgerLock::acquire(&config.path)?)
        } else {
            None
        };

        let chain = match config.load_policy {
            LoadPolicy::FallbackToGenesis => codec::load_or_genesis(&config.path),
            LoadPolicy::Trusting => fresh_if_missing(codec::load(&config.path))?,
            LoadPolicy::Verified => fresh_if_missing(codec::load_verified(&config.path))?,
        };

        info!(
            path = %config.path.display(),
            blocks = chain.len(),
            policy = ?config.load_policy,
            "opened ledger"
        );

        Ok(Self {
            config,
            chain,
            _lock: lock,
        })
    }

    /// Append an event and persist the whole chain
    ///
    /// If the write fails the block stays in memory and the chain is still
    /// valid; [`Ledger::persist`] retries the write.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] if the ledger file cannot be written
    pub fn record(&mut self, payload: Payload) -> StorageResult<Block> {
        let block = self.chain.append(payload);
        if let Err(e) = self.persist() {
            warn!(index = block.index(), error = %e, "block appended but not persisted");
            return Err(e);
        }
        Ok(block)
    }

    /// Write the current chain to disk
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] if the ledger file cannot be written
    pub fn persist(&self) -> StorageResult<()> {
        codec::save(&self.chain, &self.config.path)
    }

    /// The in-memory chain
    #[must_use]
    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    /// Ledger file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }
}

fn fresh_if_missing(loaded: StorageResult<Chain>) -> StorageResult<Chain> {
    match loaded {
        Err(StorageError::NotFound { .. }) => Ok(Chain::new()),
        other => other,
    }
}
