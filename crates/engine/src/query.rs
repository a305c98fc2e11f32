//! Retrieval query and prompt construction.
//!
//! Turns a normalized market state into (a) the query text used for
//! hybrid retrieval and (b) the market summary shown to the drafter.
//! Because the state is already normalized, the same wording applies to
//! every symbol regardless of price scale.

use std::fmt::Write as _;

use delphi_core::{MarketState, RetrievalResult};
use delphi_ports::PromptContext;

/// RSI below this reads as oversold, above the mirror as overbought
const RSI_OVERSOLD: f64 = 30.0;
const RSI_OVERBOUGHT: f64 = 70.0;
/// Volume this many times its baseline counts as a volume spike
const VOLUME_SPIKE_RATIO: f64 = 1.5;

/// Build the knowledge-retrieval query for one symbol's state
pub fn build_query(state: &MarketState) -> String {
    let mut terms: Vec<String> = Vec::new();
    let indicators = &state.indicators;

    if let Some(rsi) = indicators.rsi14 {
        if rsi <= RSI_OVERSOLD {
            terms.push("oversold RSI reversal entry".to_string());
        } else if rsi >= RSI_OVERBOUGHT {
            terms.push("overbought RSI exit".to_string());
        }
    }

    if let Some(macd) = indicators.macd {
        if macd.histogram > 0.0 {
            terms.push("MACD bullish crossover momentum".to_string());
        } else if macd.histogram < 0.0 {
            terms.push("MACD bearish crossover".to_string());
        }
    }

    if let Some(sma200) = indicators.sma200 {
        if state.price > sma200 {
            terms.push("price above 200-day moving average uptrend".to_string());
        } else {
            terms.push("price below 200-day moving average downtrend".to_string());
        }
    }

    if let Some(bands) = indicators.bollinger {
        if state.price <= bands.lower {
            terms.push("lower Bollinger band mean reversion".to_string());
        } else if state.price >= bands.upper {
            terms.push("upper Bollinger band breakout".to_string());
        }
    }

    if state
        .volume_ratio
        .is_some_and(|ratio| ratio >= VOLUME_SPIKE_RATIO)
    {
        terms.push("volume spike confirmation".to_string());
    }

    for pattern in &state.patterns {
        terms.push(format!("{} candlestick pattern", pattern.kind));
    }

    terms.push("swing trading strategy".to_string());
    terms.join(" ")
}

/// Human-readable market summary for the drafter prompt
pub fn build_market_summary(state: &MarketState) -> String {
    let mut summary = String::new();
    let _ = writeln!(
        summary,
        "{} at {:.2} ({:+.2}% 1d)",
        state.symbol, state.price, state.price_change_1d
    );

    if let Some(ratio) = state.volume_ratio {
        let _ = writeln!(summary, "volume: {ratio:.2}x 20-day average");
    }

    let indicators = &state.indicators;
    if let Some(rsi) = indicators.rsi14 {
        let _ = writeln!(summary, "RSI(14): {rsi:.1}");
    }
    if let Some(macd) = indicators.macd {
        let _ = writeln!(
            summary,
            "MACD: {:.3} signal {:.3} histogram {:.3}",
            macd.value, macd.signal, macd.histogram
        );
    }
    if let Some(bands) = indicators.bollinger {
        let _ = writeln!(
            summary,
            "Bollinger(20,2): {:.2} / {:.2} / {:.2}",
            bands.lower, bands.mid, bands.upper
        );
    }
    for (label, value) in [
        ("SMA20", indicators.sma20),
        ("SMA50", indicators.sma50),
        ("SMA200", indicators.sma200),
        ("ATR(14)", indicators.atr14),
    ] {
        if let Some(value) = value {
            let _ = writeln!(summary, "{label}: {value:.2}");
        }
    }
    if let Some(stoch) = indicators.stochastic {
        let _ = writeln!(summary, "Stochastic: %K {:.1} %D {:.1}", stoch.k, stoch.d);
    }

    for pattern in &state.patterns {
        let _ = writeln!(
            summary,
            "pattern: {} (strength {})",
            pattern.kind, pattern.strength
        );
    }

    if let Some(sentiment) = state.news_sentiment {
        let _ = writeln!(summary, "news sentiment: {sentiment:+.2}");
    }

    summary
}

/// Assemble the full drafter prompt context
pub fn build_prompt(state: &MarketState, query: &str, retrieval: &RetrievalResult) -> PromptContext {
    PromptContext {
        symbol: state.symbol.clone(),
        query: query.to_string(),
        market_summary: build_market_summary(state),
        fragments: retrieval.fragments().cloned().collect(),
    }
}
