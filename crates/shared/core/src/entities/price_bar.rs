use serde::{Deserialize, Serialize};

use crate::values::Timestamp;

/// One OHLCV bar of price history
///
/// Bars arrive as a chronologically increasing sequence per symbol with no
/// duplicate timestamps, and are immutable once ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: Timestamp,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// Candle body size (absolute open-to-close distance)
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// Full high-to-low range of the bar
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Shadow above the body
    pub fn upper_shadow(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    /// Shadow below the body
    pub fn lower_shadow(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}
