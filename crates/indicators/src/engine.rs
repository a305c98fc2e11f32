//! Indicator engine: one pass over a symbol's history into an
//! [`IndicatorSet`].
//!
//! Lookback windows are fixed, named constants — the set the drafter and
//! scorer were designed around. Every field degrades independently: a
//! 50-bar history still yields sma20/sma50 while sma200 is absent.

use delphi_core::{
    BollingerBands, IndicatorSet, MacdLine, PriceBar, StochasticOscillator,
};

use crate::error::{IndicatorError, IndicatorResult};
use crate::math::{ema_series, last_finite, sma_last, stddev_last, wilder_series};

pub const SMA_SHORT: usize = 20;
pub const SMA_MID: usize = 50;
pub const SMA_LONG: usize = 200;
pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
/// Bars needed before the MACD signal line (and thus the histogram) exists
pub const MACD_MIN_BARS: usize = MACD_SLOW + MACD_SIGNAL - 1;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_MULT: f64 = 2.0;
pub const ATR_PERIOD: usize = 14;
pub const STOCH_K_PERIOD: usize = 14;
pub const STOCH_D_PERIOD: usize = 3;
pub const VOLUME_MA_PERIOD: usize = 20;

/// Compute the full indicator set for one symbol
///
/// Fails only when the history is empty or out of order; a short history
/// produces the maximum achievable subset with absent fields.
pub fn compute(symbol: &str, bars: &[PriceBar]) -> IndicatorResult<IndicatorSet> {
    let last = bars.last().ok_or_else(|| IndicatorError::InsufficientHistory {
        symbol: symbol.to_string(),
    })?;

    for (index, pair) in bars.windows(2).enumerate() {
        if pair[1].timestamp <= pair[0].timestamp {
            return Err(IndicatorError::OutOfOrder {
                symbol: symbol.to_string(),
                index: index + 1,
            });
        }
    }

    let closes: Vec<f64> = bars.iter().map(|bar| bar.close).collect();
    let volumes: Vec<f64> = bars.iter().map(|bar| bar.volume).collect();

    let mut set = IndicatorSet::empty(symbol, last.timestamp);
    set.sma20 = sma_last(&closes, SMA_SHORT);
    set.sma50 = sma_last(&closes, SMA_MID);
    set.sma200 = sma_last(&closes, SMA_LONG);
    set.rsi14 = rsi(&closes, RSI_PERIOD);
    set.macd = macd(&closes);
    set.bollinger = bollinger(&closes);
    set.volume_ma20 = sma_last(&volumes, VOLUME_MA_PERIOD);
    set.atr14 = atr(bars, ATR_PERIOD);
    set.stochastic = stochastic(bars);

    Ok(set)
}

/// RSI via Wilder smoothing; the first `period` changes form the plain
/// average seed.
///
/// Edge policy: no losses in the window → exactly 100; no gains →
/// exactly 0; a perfectly flat window (neither) → 50.
fn rsi(closes: &[f64], period: usize) -> Option<f64> {
    if closes.len() < period + 1 {
        return None;
    }

    let changes: Vec<f64> = closes.windows(2).map(|pair| pair[1] - pair[0]).collect();
    let gains: Vec<f64> = changes.iter().map(|ch| ch.max(0.0)).collect();
    let losses: Vec<f64> = changes.iter().map(|ch| (-ch).max(0.0)).collect();

    let avg_gain = last_finite(&wilder_series(&gains, period))?;
    let avg_loss = last_finite(&wilder_series(&losses, period))?;

    if avg_loss == 0.0 && avg_gain == 0.0 {
        Some(50.0)
    } else if avg_loss == 0.0 {
        Some(100.0)
    } else if avg_gain == 0.0 {
        Some(0.0)
    } else {
        Some(100.0 - 100.0 / (1.0 + avg_gain / avg_loss))
    }
}

/// MACD family: EMA(12) − EMA(26), EMA(9) signal, histogram
///
/// Present once the signal line is computable; a value-only MACD would
/// leave the histogram undefined.
fn macd(closes: &[f64]) -> Option<MacdLine> {
    if closes.len() < MACD_MIN_BARS {
        return None;
    }

    let fast = ema_series(closes, MACD_FAST);
    let slow = ema_series(closes, MACD_SLOW);

    // The MACD line exists wherever the slow EMA does
    let line: Vec<f64> = (MACD_SLOW - 1..closes.len())
        .map(|i| fast[i] - slow[i])
        .collect();

    let value = *line.last()?;
    let signal = last_finite(&ema_series(&line, MACD_SIGNAL))?;

    Some(MacdLine {
        value,
        signal,
        histogram: value - signal,
    })
}

fn bollinger(closes: &[f64]) -> Option<BollingerBands> {
    let mid = sma_last(closes, BOLLINGER_PERIOD)?;
    let stddev = stddev_last(closes, BOLLINGER_PERIOD)?;
    Some(BollingerBands {
        upper: mid + BOLLINGER_MULT * stddev,
        mid,
        lower: mid - BOLLINGER_MULT * stddev,
    })
}

/// Wilder-smoothed average true range
///
/// True range needs a previous close, so the series starts at the second
/// bar and `period + 1` bars are required.
fn atr(bars: &[PriceBar], period: usize) -> Option<f64> {
    if bars.len() < period + 1 {
        return None;
    }

    let true_ranges: Vec<f64> = bars
        .windows(2)
        .map(|pair| {
            let prev_close = pair[0].close;
            let bar = &pair[1];
            (bar.high - bar.low)
                .max((bar.high - prev_close).abs())
                .max((bar.low - prev_close).abs())
        })
        .collect();

    last_finite(&wilder_series(&true_ranges, period))
}

/// Stochastic oscillator: %K over the trailing window, %D = SMA of the
/// last three %K values
///
/// %K floors to 0 when the window's high equals its low.
fn stochastic(bars: &[PriceBar]) -> Option<StochasticOscillator> {
    let needed = STOCH_K_PERIOD + STOCH_D_PERIOD - 1;
    if bars.len() < needed {
        return None;
    }

    let percent_k = |end: usize| -> f64 {
        let window = &bars[end + 1 - STOCH_K_PERIOD..=end];
        let high = window.iter().map(|bar| bar.high).fold(f64::MIN, f64::max);
        let low = window.iter().map(|bar| bar.low).fold(f64::MAX, f64::min);
        if high == low {
            0.0
        } else {
            100.0 * (bars[end].close - low) / (high - low)
        }
    };

    let n = bars.len();
    let ks: Vec<f64> = (n - STOCH_D_PERIOD..n).map(percent_k).collect();
    let k = *ks.last()?;
    let d = ks.iter().sum::<f64>() / STOCH_D_PERIOD as f64;

    Some(StochasticOscillator { k, d })
}
