//! Value objects shared across the Delphi domain
//!
//! Type-safe wrappers for bounded numeric values so out-of-range scores
//! cannot be constructed, plus common aliases.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Symbol identifier for a tradeable instrument
pub type Symbol = String;

/// Timestamp in UTC
pub type Timestamp = DateTime<Utc>;

/// Bounded confidence score in [0, 100]
///
/// The constructor clamps, so a `Confidence` is in range by construction.
/// NaN collapses to 0.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Default)]
#[serde(transparent)]
pub struct Confidence(f64);

impl Confidence {
    pub const ZERO: Confidence = Confidence(0.0);
    pub const MAX: Confidence = Confidence(100.0);

    /// Create from a raw score, clamping into [0, 100]
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self(0.0);
        }
        Self(value.clamp(0.0, 100.0))
    }

    /// Get the score as f64, guaranteed within [0, 100]
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

impl<'de> Deserialize<'de> for Confidence {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = f64::deserialize(deserializer)?;
        Ok(Confidence::new(raw))
    }
}

/// Bounded pattern strength in [0, 1]
///
/// Same clamping contract as [`Confidence`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Default)]
#[serde(transparent)]
pub struct Strength(f64);

impl Strength {
    pub const ZERO: Strength = Strength(0.0);
    pub const MAX: Strength = Strength(1.0);

    /// Create from a raw value, clamping into [0, 1]
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self(0.0);
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl<'de> Deserialize<'de> for Strength {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = f64::deserialize(deserializer)?;
        Ok(Strength::new(raw))
    }
}
