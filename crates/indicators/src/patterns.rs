//! Candlestick pattern detection over the most recent bars.
//!
//! Fixed geometric rules on the last 1–5 bars. Each detection carries a
//! strength in [0, 1] instead of a boolean so a textbook formation
//! outweighs a marginal one downstream. Detectors are independent; one
//! window can legitimately report several patterns.

use delphi_core::{Pattern, PatternKind, PriceBar, Strength};

/// A body at most this fraction of the bar's range reads as a doji
const DOJI_BODY_FACTOR: f64 = 0.1;
/// A shadow at least this multiple of the body reads as dominant
const SHADOW_DOMINANCE: f64 = 2.0;
/// Soldiers/crows need bodies at least this fraction of their range
const SOLDIER_BODY_FACTOR: f64 = 0.5;

/// Detect chart patterns in the trailing bars of a history
///
/// Returns an empty vec for histories too short for any detector.
pub fn detect_patterns(bars: &[PriceBar]) -> Vec<Pattern> {
    let Some(last) = bars.last() else {
        return Vec::new();
    };
    let detected_at = last.timestamp;

    let mut patterns = Vec::new();
    let mut push = |kind: PatternKind, strength: f64| {
        patterns.push(Pattern {
            kind,
            detected_at,
            strength: Strength::new(strength),
        });
    };

    if let Some(strength) = doji(last) {
        push(PatternKind::Doji, strength);
    }
    if let Some(strength) = hammer(last) {
        push(PatternKind::Hammer, strength);
    }
    if let Some(strength) = shooting_star(last) {
        push(PatternKind::ShootingStar, strength);
    }

    if bars.len() >= 2 {
        let prev = &bars[bars.len() - 2];
        if let Some(strength) = bullish_engulfing(prev, last) {
            push(PatternKind::BullishEngulfing, strength);
        }
        if let Some(strength) = bearish_engulfing(prev, last) {
            push(PatternKind::BearishEngulfing, strength);
        }
    }

    if bars.len() >= 3 {
        let trio = &bars[bars.len() - 3..];
        if let Some(strength) = three_soldiers(trio, true) {
            push(PatternKind::ThreeWhiteSoldiers, strength);
        }
        if let Some(strength) = three_soldiers(trio, false) {
            push(PatternKind::ThreeBlackCrows, strength);
        }
    }

    patterns
}

/// Tiny body relative to range; strength grows as the body vanishes
fn doji(bar: &PriceBar) -> Option<f64> {
    let range = bar.range();
    if range <= 0.0 {
        return None;
    }
    let limit = DOJI_BODY_FACTOR * range;
    if bar.body() > limit {
        return None;
    }
    Some(1.0 - bar.body() / limit)
}

/// Long lower shadow, small body near the top
fn hammer(bar: &PriceBar) -> Option<f64> {
    let body = bar.body();
    if body <= 0.0 || bar.range() <= 0.0 {
        return None;
    }
    if bar.lower_shadow() < SHADOW_DOMINANCE * body || bar.upper_shadow() > body {
        return None;
    }
    Some(bar.lower_shadow() / bar.range())
}

/// Long upper shadow, small body near the bottom
fn shooting_star(bar: &PriceBar) -> Option<f64> {
    let body = bar.body();
    if body <= 0.0 || bar.range() <= 0.0 {
        return None;
    }
    if bar.upper_shadow() < SHADOW_DOMINANCE * body || bar.lower_shadow() > body {
        return None;
    }
    Some(bar.upper_shadow() / bar.range())
}

/// Prior candle bearish, current bullish, current body fully contains
/// the prior body; strength grows with body dominance
fn bullish_engulfing(prev: &PriceBar, current: &PriceBar) -> Option<f64> {
    if !prev.is_bearish() || !current.is_bullish() {
        return None;
    }
    if prev.body() <= 0.0 || current.body() <= prev.body() {
        return None;
    }
    if current.open > prev.close || current.close < prev.open {
        return None;
    }
    Some(1.0 - prev.body() / current.body())
}

/// Mirror of [`bullish_engulfing`]
fn bearish_engulfing(prev: &PriceBar, current: &PriceBar) -> Option<f64> {
    if !prev.is_bullish() || !current.is_bearish() {
        return None;
    }
    if prev.body() <= 0.0 || current.body() <= prev.body() {
        return None;
    }
    if current.open < prev.close || current.close > prev.open {
        return None;
    }
    Some(1.0 - prev.body() / current.body())
}

/// Three same-colored candles with monotone closes and substantial bodies
fn three_soldiers(trio: &[PriceBar], bullish: bool) -> Option<f64> {
    debug_assert_eq!(trio.len(), 3);

    let mut body_fractions = 0.0;
    for bar in trio {
        let colored = if bullish { bar.is_bullish() } else { bar.is_bearish() };
        if !colored || bar.range() <= 0.0 {
            return None;
        }
        let fraction = bar.body() / bar.range();
        if fraction < SOLDIER_BODY_FACTOR {
            return None;
        }
        body_fractions += fraction;
    }

    let monotone = if bullish {
        trio[0].close < trio[1].close && trio[1].close < trio[2].close
    } else {
        trio[0].close > trio[1].close && trio[1].close > trio[2].close
    };
    if !monotone {
        return None;
    }

    Some(body_fractions / 3.0)
}
