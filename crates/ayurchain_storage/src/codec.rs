//! Ledger persistence as a JSON array of block records.
//!
//! Saves are whole-file rewrites through a temporary sibling and a rename.
//! Loads trust stored fingerprints; [`load_verified`] adds the audit.

use crate::error::{StorageError, StorageResult};
use ayurchain_ledger::{Block, Chain};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Encode a chain as pretty-printed JSON
///
/// # Errors
///
/// Returns error if serialization fails
pub fn encode(chain: &Chain) -> Result<Vec<u8>, serde_json::Error> {
    let mut bytes = serde_json::to_vec_pretty(&chain.export())?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Decode a chain from JSON, trusting stored fingerprints
///
/// An empty record array yields a fresh genesis-only chain.
///
/// # Errors
///
/// Returns error if `bytes` is not an array of block records
pub fn decode(bytes: &[u8]) -> Result<Chain, serde_json::Error> {
    let records: Vec<Block> = serde_json::from_slice(bytes)?;
    Ok(Chain::from_blocks(records).unwrap_or_default())
}

/// Write the whole chain to `destination`, replacing previous content
///
/// Missing parent directories are created.
///
/// # Errors
///
/// Returns [`StorageError::Write`] if any filesystem step fails
pub fn save(chain: &Chain, destination: &Path) -> StorageResult<()> {
    let write_err = |source: io::Error| StorageError::Write {
        path: destination.to_path_buf(),
        source,
    };

    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let bytes = encode(chain).map_err(|e| write_err(io::Error::new(io::ErrorKind::InvalidData, e)))?;

    let tmp = temp_path(destination);
    let mut file = File::create(&tmp).map_err(write_err)?;
    file.write_all(&bytes).map_err(write_err)?;
    file.sync_all().map_err(write_err)?;
    drop(file);
    fs::rename(&tmp, destination).map_err(write_err)?;

    debug!(path = %destination.display(), blocks = chain.len(), "saved ledger");
    Ok(())
}

/// Read a chain from `source` as stored
///
/// Fingerprints are not recomputed.
///
/// # Errors
///
/// Returns [`StorageError::NotFound`], [`StorageError::Io`], or
/// [`StorageError::Malformed`]
pub fn load(source: &Path) -> StorageResult<Chain> {
    let bytes = fs::read(source).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => StorageError::NotFound {
            path: source.to_path_buf(),
        },
        _ => StorageError::Io {
            path: source.to_path_buf(),
            source: e,
        },
    })?;

    let chain = decode(&bytes).map_err(|e| StorageError::Malformed {
        path: source.to_path_buf(),
        reason: e.to_string(),
    })?;

    debug!(path = %source.display(), blocks = chain.len(), "loaded ledger");
    Ok(chain)
}

/// Read a chain and audit it before handing it out
///
/// # Errors
///
/// Everything [`load`] returns, plus [`StorageError::Tampered`]
pub fn load_verified(source: &Path) -> StorageResult<Chain> {
    let chain = load(source)?;
    let violations = chain.audit();
    if let Some(first) = violations.first() {
        let first_invalid = first.position();
        warn!(
            path = %source.display(),
            first_invalid,
            violations = violations.len(),
            "ledger failed verification"
        );
        return Err(StorageError::Tampered {
            first_invalid,
            violations,
        });
    }
    Ok(chain)
}

/// Read a chain, or start a fresh one if it cannot be read
pub fn load_or_genesis(source: &Path) -> Chain {
    match load(source) {
        Ok(chain) => chain,
        Err(StorageError::NotFound { .. }) => {
            debug!(path = %source.display(), "no ledger on disk, starting fresh");
            Chain::new()
        }
        Err(e) => {
            warn!(error = %e, "unreadable ledger, starting fresh");
            Chain::new()
        }
    }
}

fn temp_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    destination.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ayurchain_core::Timestamp;
    use ayurchain_ledger::{Payload, Violation};
    use proptest::prelude::*;
    use serde_json::Value;
    use tempfile::TempDir;

    fn farmer(batch: &str) -> Payload {
        Payload::new()
            .with("role", "Farmer")
            .with("farmer", "A")
            .with("herb", "Brahmi")
            .with("gps", "12.9,77.6")
            .with("batch_id", batch)
    }

    fn sample_chain(n: usize) -> Chain {
        let mut chain = Chain::new();
        for i in 0..n {
            chain.append(farmer(&format!("B{i}")));
        }
        chain
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        let chain = sample_chain(3);

        save(&chain, &path).unwrap();
        let loaded = load(&path).unwrap();

        assert_eq!(loaded.export(), chain.export());
        assert!(loaded.validate());
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/ledger.json");
        save(&Chain::new(), &path).unwrap();
        assert!(path.exists());
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_save_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        let chain = sample_chain(2);

        save(&chain, &path).unwrap();
        let first = fs::read(&path).unwrap();
        save(&chain, &path).unwrap();
        assert_eq!(first, fs::read(&path).unwrap());
    }

    #[test]
    fn test_save_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        save(&sample_chain(5), &path).unwrap();
        save(&sample_chain(1), &path).unwrap();
        assert_eq!(load(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_persisted_layout() {
        let chain = sample_chain(1);
        let value: Value = serde_json::from_slice(&encode(&chain).unwrap()).unwrap();
        let records = value.as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["index"], 0);
        assert_eq!(records[0]["previous_hash"], "0");
        assert_eq!(records[0]["data"]["msg"], "Genesis Block");
        assert!(records[0]["timestamp"].is_f64());
        assert_eq!(records[1]["previous_hash"], records[0]["hash"]);
        assert_eq!(records[1]["data"]["role"], "Farmer");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[test]
    fn test_load_truncated_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        let bytes = encode(&sample_chain(2)).unwrap();
        fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, StorageError::Malformed { .. }));
        assert!(err.is_recoverable_read());
    }

    #[test]
    fn test_load_or_genesis_falls_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");

        fs::write(&path, b"not json at all").unwrap();
        let chain = load_or_genesis(&path);
        assert_eq!(chain.len(), 1);
        assert!(chain.validate());

        let chain = load_or_genesis(&dir.path().join("absent.json"));
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_load_wrong_shape() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        fs::write(&path, br#"[{"index": 0, "data": {}}]"#).unwrap();
        assert!(matches!(load(&path), Err(StorageError::Malformed { .. })));

        fs::write(&path, br#"{"index": 0}"#).unwrap();
        assert!(matches!(load(&path), Err(StorageError::Malformed { .. })));
    }

    #[test]
    fn test_empty_array_yields_genesis() {
        let chain = decode(b"[]").unwrap();
        assert_eq!(chain.len(), 1);
        assert!(chain.validate());
    }

    #[test]
    fn test_single_record_kept_as_genesis() {
        let genesis = Chain::with_genesis_at(Timestamp::from_secs_f64(1_700_000_000.5).unwrap());
        let chain = decode(&encode(&genesis).unwrap()).unwrap();
        assert_eq!(chain, genesis);
    }

    #[test]
    fn test_tampered_file_detected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        save(&sample_chain(3), &path).unwrap();

        let mut records: Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        records[2]["data"]["herb"] = Value::from("Sawdust");
        fs::write(&path, serde_json::to_vec(&records).unwrap()).unwrap();

        // Trusting load succeeds, validation is a separate step
        let chain = load(&path).unwrap();
        assert!(!chain.validate());
        assert_eq!(chain.first_invalid(), Some(2));

        match load_verified(&path) {
            Err(StorageError::Tampered {
                first_invalid,
                violations,
            }) => {
                assert_eq!(first_invalid, 2);
                assert!(matches!(
                    violations[0],
                    Violation::FingerprintMismatch { position: 2, .. }
                ));
            }
            other => panic!("expected Tampered, got {other:?}"),
        }
    }

    #[test]
    fn test_load_verified_accepts_clean_ledger() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        save(&sample_chain(2), &path).unwrap();
        assert_eq!(load_verified(&path).unwrap().len(), 3);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_roundtrip_preserves_blocks_and_validity(
            batches in proptest::collection::vec("[A-Z][0-9]{1,3}", 0..12),
            tamper in proptest::option::of(any::<prop::sample::Index>()),
        ) {
            let mut chain = Chain::new();
            for batch in &batches {
                chain.append(farmer(batch));
            }

            let mut bytes = encode(&chain).unwrap();
            if let Some(target) = tamper {
                let mut records: Value = serde_json::from_slice(&bytes).unwrap();
                let i = target.index(chain.len());
                records[i]["data"]["tampered"] = Value::from(true);
                bytes = serde_json::to_vec(&records).unwrap();
                chain = decode(&bytes).unwrap();
            }

            let reloaded = decode(&encode(&chain).unwrap()).unwrap();
            prop_assert_eq!(reloaded.export(), chain.export());
            prop_assert_eq!(reloaded.validate(), chain.validate());
            prop_assert_eq!(reloaded.validate(), tamper.is_none());
        }
    }
}
