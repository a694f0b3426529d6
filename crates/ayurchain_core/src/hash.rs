//! Block fingerprints and the links between them.
//!
//! Uses SHA-256 for all hashing operations. Fingerprints travel as 64
//! lowercase hex characters, which is also their persisted form.

use crate::error::CoreError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// A SHA-256 fingerprint (256 bits / 32 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// The number of bytes in a fingerprint
    pub const LEN: usize = 32;

    /// Compute SHA-256 of data
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        let mut hasher = FingerprintHasher::new();
        hasher.update(data);
        hasher.finalize()
    }

    /// Create from bytes
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get as bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to lowercase hex string
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string
    ///
    /// # Errors
    ///
    /// Returns error if hex is invalid or not 32 bytes
    pub fn from_hex(hex: &str) -> Result<Self, CoreError> {
        let bytes = hex::decode(hex).map_err(|e| CoreError::InvalidFingerprint {
            reason: e.to_string(),
        })?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| CoreError::InvalidFingerprint {
                reason: format!("length {} (expected 32)", b.len()),
            })?;
        Ok(Self(arr))
    }

    /// Check if fingerprint matches data
    #[must_use]
    pub fn verify(&self, data: &[u8]) -> bool {
        Self::compute(data) == *self
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Fingerprint {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl AsRef<[u8]> for Fingerprint {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Fingerprint {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Incremental SHA-256 over several parts
///
/// Feeding parts one by one is equivalent to hashing their concatenation.
#[derive(Clone, Default)]
pub struct FingerprintHasher {
    inner: Sha256,
}

impl FingerprintHasher {
    /// Create an empty hasher
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed more bytes
    pub fn update(&mut self, data: impl AsRef<[u8]>) -> &mut Self {
        self.inner.update(data.as_ref());
        self
    }

    /// Finish and return the fingerprint
    #[must_use]
    pub fn finalize(self) -> Fingerprint {
        Fingerprint(self.inner.finalize().into())
    }
}

/// Reference from a block to its predecessor
///
/// Genesis points at [`Link::Origin`], persisted as the sentinel `"0"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Link {
    /// No predecessor (genesis)
    Origin,
    /// Fingerprint of the preceding block
    Block(Fingerprint),
}

impl Link {
    /// Persisted form of [`Link::Origin`]
    pub const ORIGIN_SENTINEL: &'static str = "0";

    /// Whether this is the genesis sentinel
    #[must_use]
    pub const fn is_origin(&self) -> bool {
        matches!(self, Self::Origin)
    }

    /// The linked fingerprint, if any
    #[must_use]
    pub const fn fingerprint(&self) -> Option<Fingerprint> {
        match self {
            Self::Origin => None,
            Self::Block(fp) => Some(*fp),
        }
    }

    /// Whether this link points at `fingerprint`
    #[must_use]
    pub fn points_to(&self, fingerprint: &Fingerprint) -> bool {
        self.fingerprint().as_ref() == Some(fingerprint)
    }
}

impl From<Fingerprint> for Link {
    fn from(fp: Fingerprint) -> Self {
        Self::Block(fp)
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Origin => f.write_str(Self::ORIGIN_SENTINEL),
            Self::Block(fp) => write!(f, "{}", fp),
        }
    }
}

impl FromStr for Link {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == Self::ORIGIN_SENTINEL {
            Ok(Self::Origin)
        } else {
            Fingerprint::from_hex(s).map(Self::Block)
        }
    }
}

impl Serialize for Link {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Link {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
