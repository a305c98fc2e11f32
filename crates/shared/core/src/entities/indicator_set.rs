use serde::{Deserialize, Serialize};

use crate::values::{Symbol, Timestamp};

/// MACD line family: value, signal line, and histogram
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdLine {
    /// EMA(12) - EMA(26)
    pub value: f64,
    /// EMA(9) of the MACD value
    pub signal: f64,
    /// value - signal
    pub histogram: f64,
}

/// Bollinger Bands (20-period SMA ± 2 population standard deviations)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub mid: f64,
    pub lower: f64,
}

/// Stochastic oscillator (%K over 14 bars, %D = SMA(3) of %K)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticOscillator {
    pub k: f64,
    pub d: f64,
}

/// Technical indicators derived from one symbol's price history
///
/// Recomputed per analysis cycle; price history remains the source of
/// truth. Each field is `None` when the history is too short for its
/// lookback window — absence of one indicator never blocks the others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub symbol: Symbol,
    /// Timestamp of the last bar the set was computed from
    pub as_of: Timestamp,
    pub sma20: Option<f64>,
    pub sma50: Option<f64>,
    pub sma200: Option<f64>,
    pub rsi14: Option<f64>,
    pub macd: Option<MacdLine>,
    pub bollinger: Option<BollingerBands>,
    pub volume_ma20: Option<f64>,
    pub atr14: Option<f64>,
    pub stochastic: Option<StochasticOscillator>,
}

impl IndicatorSet {
    /// An indicator set with every field marked insufficient
    pub fn empty(symbol: impl Into<Symbol>, as_of: Timestamp) -> Self {
        Self {
            symbol: symbol.into(),
            as_of,
            sma20: None,
            sma50: None,
            sma200: None,
            rsi14: None,
            macd: None,
            bollinger: None,
            volume_ma20: None,
            atr14: None,
            stochastic: None,
        }
    }

    /// Number of indicator fields that were computable
    pub fn computed_count(&self) -> usize {
        [
            self.sma20.is_some(),
            self.sma50.is_some(),
            self.sma200.is_some(),
            self.rsi14.is_some(),
            self.macd.is_some(),
            self.bollinger.is_some(),
            self.volume_ma20.is_some(),
            self.atr14.is_some(),
            self.stochastic.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }
}
