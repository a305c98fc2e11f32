use serde::{Deserialize, Serialize};
use std::fmt;

use crate::values::{Strength, Timestamp};

/// Candlestick pattern classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    BullishEngulfing,
    BearishEngulfing,
    Hammer,
    ShootingStar,
    Doji,
    ThreeWhiteSoldiers,
    ThreeBlackCrows,
}

/// Directional bias a pattern carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatternDirection {
    Bullish,
    Bearish,
    Neutral,
}

impl PatternKind {
    /// Human-readable pattern name
    pub fn name(&self) -> &'static str {
        match self {
            PatternKind::BullishEngulfing => "bullish engulfing",
            PatternKind::BearishEngulfing => "bearish engulfing",
            PatternKind::Hammer => "hammer",
            PatternKind::ShootingStar => "shooting star",
            PatternKind::Doji => "doji",
            PatternKind::ThreeWhiteSoldiers => "three white soldiers",
            PatternKind::ThreeBlackCrows => "three black crows",
        }
    }

    pub fn direction(&self) -> PatternDirection {
        match self {
            PatternKind::BullishEngulfing
            | PatternKind::Hammer
            | PatternKind::ThreeWhiteSoldiers => PatternDirection::Bullish,
            PatternKind::BearishEngulfing
            | PatternKind::ShootingStar
            | PatternKind::ThreeBlackCrows => PatternDirection::Bearish,
            PatternKind::Doji => PatternDirection::Neutral,
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A detected chart pattern with graded strength
///
/// Detection yields a strength rather than a boolean so downstream scoring
/// can weight a textbook-perfect formation above a marginal one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub kind: PatternKind,
    pub detected_at: Timestamp,
    pub strength: Strength,
}
