//! Opaque event payloads.
//!
//! The ledger never interprets a payload beyond equality lookups on a single
//! key. Insertion order is kept for display and persistence; fingerprints use
//! the key-sorted canonical form.

use crate::encoding::{encode_object, CanonicalEncode};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message carried by every genesis block
pub const GENESIS_MESSAGE: &str = "Genesis Block";

/// Ordered map of event fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(IndexMap<String, Value>);

impl Payload {
    /// Create an empty payload
    #[must_use]
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// The fixed genesis payload `{"msg": "Genesis Block"}`
    #[must_use]
    pub fn genesis() -> Self {
        Self::new().with("msg", GENESIS_MESSAGE)
    }

    /// Add a field, replacing any previous value under `key`
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a field, returning the previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Look up a field
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Look up a string field
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Iterate fields in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Number of fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the payload has no fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl CanonicalEncode for Payload {
    fn encode_into(&self, out: &mut String) {
        encode_object(self.0.iter(), out);
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Payload {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<Payload> for Value {
    fn from(payload: Payload) -> Self {
        Value::Object(payload.0.into_iter().collect())
    }
}
