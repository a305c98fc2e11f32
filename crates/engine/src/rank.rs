//! Final ranking across the watchlist.
//!
//! Produces a total order: confidence descending, then risk/reward
//! descending, then symbol ascending — identical inputs always rank
//! identically. The zero-citations ⇒ HOLD invariant is enforced here as
//! the last gate before results leave the engine.

use tracing::warn;

use delphi_core::{RankedOpportunities, Signal, SignalAction};

/// Rank scored signals into the cycle's final ordering
///
/// Any directional signal without a single citation is overridden to
/// HOLD — no uncited directional call ever leaves the engine.
pub fn rank(mut signals: Vec<Signal>) -> RankedOpportunities {
    for signal in &mut signals {
        if signal.action.is_directional() && signal.citations.is_empty() {
            warn!(
                symbol = %signal.symbol,
                action = ?signal.action,
                "directional signal without citations forced to HOLD"
            );
            signal.action = SignalAction::Hold;
            if !signal.reasoning.is_empty() {
                signal.reasoning.push_str("; ");
            }
            signal
                .reasoning
                .push_str("held: no supporting citations survived validation");
        }
    }

    signals.sort_by(|a, b| {
        b.confidence
            .value()
            .total_cmp(&a.confidence.value())
            .then_with(|| b.risk_reward_ratio.total_cmp(&a.risk_reward_ratio))
            .then_with(|| a.symbol.cmp(&b.symbol))
    });

    RankedOpportunities::new(signals)
}
