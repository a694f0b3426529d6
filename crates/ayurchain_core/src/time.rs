//! Wall-clock timestamps for ledger blocks.
//!
//! Blocks carry seconds since the Unix epoch as a float. The value is hashed
//! through its shortest round-trip rendering, so it must survive a JSON
//! save/load unchanged.

use crate::error::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Seconds since the Unix epoch
///
/// Always finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Timestamp(f64);

impl Timestamp {
    /// The Unix epoch
    pub const EPOCH: Self = Self(0.0);

    /// Current wall-clock time
    #[must_use]
    pub fn now() -> Self {
        let micros = Utc::now().timestamp_micros().max(0);
        Self(micros as f64 / 1_000_000.0)
    }

    /// Create from float seconds
    ///
    /// # Errors
    ///
    /// Returns error if `seconds` is negative, NaN, or infinite
    pub fn from_secs_f64(seconds: f64) -> Result<Self, CoreError> {
        if !seconds.is_finite() {
            return Err(CoreError::InvalidTimestamp {
                reason: format!("{} is not finite", seconds),
            });
        }
        if seconds < 0.0 {
            return Err(CoreError::InvalidTimestamp {
                reason: format!("{} is before the epoch", seconds),
            });
        }
        Ok(Self(seconds))
    }

    /// Get float seconds
    #[must_use]
    pub const fn as_secs_f64(&self) -> f64 {
        self.0
    }

    /// Convert to a UTC date-time for display
    #[must_use]
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        let micros = (self.0 * 1_000_000.0).round();
        if micros > i64::MAX as f64 {
            return None;
        }
        DateTime::from_timestamp_micros(micros as i64)
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::EPOCH
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<f64> for Timestamp {
    type Error = CoreError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_secs_f64(value)
    }
}

impl From<Timestamp> for f64 {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}
