//! Process-level exclusive access to a ledger file.
//!
//! Two processes appending to the same ledger would race on the tip
//! fingerprint and break link integrity. The writer holds an `fs2` lock on a
//! sibling `.lock` file for as long as it owns the ledger. The lock file is
//! never removed, so every contender locks the same inode.

use crate::error::{StorageError, StorageResult};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Exclusive lock on a ledger file, released on drop
#[derive(Debug)]
pub struct LedgerLock {
    file: File,
    path: PathBuf,
    pid: u32,
}

impl LedgerLock {
    /// Lock file path for a ledger: `ledger.json` → `ledger.json.lock`
    #[must_use]
    pub fn path_for(ledger: &Path) -> PathBuf {
        let mut name = ledger
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        ledger.with_file_name(name)
    }

    /// Acquire the lock without blocking
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Locked`] if another holder has it, or
    /// [`StorageError::Write`] if the lock file cannot be created
    pub fn acquire(ledger: &Path) -> StorageResult<Self> {
        let path = Self::path_for(ledger);
        let write_err = |source| StorageError::Write {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        // Do not truncate before locking: the holder's PID must stay readable
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(write_err)?;

        if file.try_lock_exclusive().is_err() {
            return Err(StorageError::Locked {
                pid: read_pid(&path),
                path: path.clone(),
            });
        }

        let pid = std::process::id();
        file.set_len(0).map_err(write_err)?;
        writeln!(file, "{}", pid).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;

        debug!(path = %path.display(), pid, "acquired ledger lock");
        Ok(Self { file, path, pid })
    }

    /// PID of the holding process
    #[must_use]
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Lock file path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LedgerLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

fn read_pid(path: &Path) -> Option<u32> {
    fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
}
