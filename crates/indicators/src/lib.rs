//! Delphi Indicator Engine
//!
//! Deterministic technical indicators and candlestick pattern detection
//! over OHLCV history. Everything here is pure and synchronous: bars in,
//! numbers out, no I/O.
//!
//! The engine computes the maximum achievable subset for short histories:
//! each indicator field is independently marked absent when its lookback
//! window does not fit, instead of the whole computation refusing.

mod engine;
mod error;
mod math;
mod patterns;

pub use engine::{
    ATR_PERIOD, BOLLINGER_MULT, BOLLINGER_PERIOD, MACD_FAST, MACD_MIN_BARS, MACD_SIGNAL,
    MACD_SLOW, RSI_PERIOD, SMA_LONG, SMA_MID, SMA_SHORT, STOCH_D_PERIOD, STOCH_K_PERIOD,
    VOLUME_MA_PERIOD, compute,
};
pub use error::{IndicatorError, IndicatorResult};
pub use patterns::detect_patterns;
