//! Market State Builder.
//!
//! Pure aggregation of indicator output, detected patterns, and
//! volume/trend context into one normalized [`MarketState`] per symbol
//! per cycle. The only policy here is normalization: the one-day change
//! is a signed percentage and volume a multiple of its trailing average,
//! so downstream prompt construction and scoring treat all symbols
//! uniformly regardless of absolute price scale.

use thiserror::Error;

use delphi_core::{MarketState, PriceBar};
use delphi_indicators::{IndicatorError, VOLUME_MA_PERIOD, compute, detect_patterns};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    #[error("need at least 2 bars to build market state for {symbol}, got {got}")]
    NotEnoughBars { symbol: String, got: usize },

    #[error(transparent)]
    Indicators(#[from] IndicatorError),
}

/// Build the normalized market state for one symbol
///
/// Depends only on its inputs and has no side effects. `news_sentiment`
/// outside [-1, 1] is clamped into range.
pub fn build(
    symbol: &str,
    bars: &[PriceBar],
    news_sentiment: Option<f64>,
) -> Result<MarketState, StateError> {
    if bars.len() < 2 {
        return Err(StateError::NotEnoughBars {
            symbol: symbol.to_string(),
            got: bars.len(),
        });
    }

    let indicators = compute(symbol, bars)?;
    let patterns = detect_patterns(bars);

    let last = &bars[bars.len() - 1];
    let prev = &bars[bars.len() - 2];

    // Degenerate (zero) reference close: no change can be expressed
    let price_change_1d = if prev.close.abs() < f64::EPSILON {
        0.0
    } else {
        (last.close - prev.close) / prev.close * 100.0
    };

    Ok(MarketState {
        symbol: symbol.to_string(),
        price: last.close,
        price_change_1d,
        volume_ratio: volume_ratio(bars),
        indicators,
        patterns,
        news_sentiment: news_sentiment.map(|s| s.clamp(-1.0, 1.0)),
    })
}

/// Last volume over the mean of the preceding volumes
///
/// The baseline adapts down to whatever history exists (at most the
/// 20-day window, excluding the bar being compared); an all-zero
/// baseline yields no ratio.
fn volume_ratio(bars: &[PriceBar]) -> Option<f64> {
    let last = bars.last()?;
    let prior = &bars[..bars.len() - 1];
    let window = prior.len().min(VOLUME_MA_PERIOD);
    if window == 0 {
        return None;
    }

    let baseline: f64 =
        prior[prior.len() - window..].iter().map(|bar| bar.volume).sum::<f64>() / window as f64;
    if baseline <= 0.0 {
        return None;
    }
    Some(last.volume / baseline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn bars_with(closes_volumes: &[(f64, f64)]) -> Vec<PriceBar> {
        let start = Utc.with_ymd_and_hms(2025, 2, 3, 21, 0, 0).unwrap();
        closes_volumes
            .iter()
            .enumerate()
            .map(|(i, &(close, volume))| PriceBar {
                timestamp: start + Duration::days(i as i64),
                open: close,
                high: close + 0.5,
                low: close - 0.5,
                close,
                volume,
            })
            .collect()
    }

    #[test]
    fn one_bar_is_not_enough() {
        let bars = bars_with(&[(100.0, 1_000.0)]);
        let err = build("AAPL", &bars, None).unwrap_err();
        assert_eq!(
            err,
            StateError::NotEnoughBars {
                symbol: "AAPL".to_string(),
                got: 1
            }
        );
    }

    #[test]
    fn change_is_a_signed_percentage() {
        let bars = bars_with(&[(200.0, 1_000.0), (190.0, 1_000.0)]);
        let state = build("AAPL", &bars, None).unwrap();
        assert!((state.price_change_1d - (-5.0)).abs() < 1e-9);
        assert_eq!(state.price, 190.0);
    }

    #[test]
    fn volume_ratio_is_a_multiple_of_the_baseline() {
        let mut data: Vec<(f64, f64)> = (0..21).map(|_| (100.0, 1_000.0)).collect();
        data[20].1 = 2_500.0;
        let state = build("AAPL", &bars_with(&data), None).unwrap();
        assert!((state.volume_ratio.unwrap() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn volume_ratio_adapts_to_short_history() {
        // Two bars: baseline is just the first volume
        let bars = bars_with(&[(100.0, 500.0), (101.0, 1_500.0)]);
        let state = build("AAPL", &bars, None).unwrap();
        assert!((state.volume_ratio.unwrap() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn zero_volume_baseline_yields_no_ratio() {
        let bars = bars_with(&[(100.0, 0.0), (101.0, 1_000.0)]);
        let state = build("AAPL", &bars, None).unwrap();
        assert!(state.volume_ratio.is_none());
    }

    #[test]
    fn sentiment_is_clamped_into_range() {
        let bars = bars_with(&[(100.0, 1_000.0), (101.0, 1_000.0)]);
        let state = build("AAPL", &bars, Some(3.0)).unwrap();
        assert_eq!(state.news_sentiment, Some(1.0));
    }

    #[test]
    fn builder_is_deterministic() {
        let bars = bars_with(&[(100.0, 1_000.0), (104.0, 1_200.0), (103.0, 900.0)]);
        let a = build("AAPL", &bars, Some(0.25)).unwrap();
        let b = build("AAPL", &bars, Some(0.25)).unwrap();
        assert_eq!(a, b);
    }
}
