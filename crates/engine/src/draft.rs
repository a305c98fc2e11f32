//! Drafter output parsing.
//!
//! The generative step returns free text, not a typed value. Parsing is
//! total: every malformed shape maps to a [`DraftError`] instead of a
//! panic or a silently wrong field, and a failed parse degrades one
//! symbol to HOLD without touching the rest of the batch.

use serde::Deserialize;
use thiserror::Error;

use delphi_core::{Citation, FragmentId, RetrievalResult, SignalAction};

/// Holding period assumed when the drafter omits one
pub const DEFAULT_HOLDING_DAYS: u32 = 5;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DraftError {
    #[error("draft contains no JSON object")]
    NoJsonObject,

    #[error("draft JSON is invalid: {0}")]
    InvalidJson(String),

    #[error("draft is missing an action")]
    MissingAction,

    #[error("unrecognized action {0:?}")]
    UnknownAction(String),

    #[error("draft is missing a confidence")]
    MissingConfidence,

    #[error("confidence {0} is outside [0, 100]")]
    ConfidenceOutOfRange(f64),

    #[error("{field} is missing for a directional draft")]
    MissingPrice { field: &'static str },

    #[error("{field} must be a positive finite number, got {value}")]
    InvalidPrice { field: &'static str, value: f64 },

    #[error("price levels are incoherent for {action:?}: stop {stop}, entry {entry}, target {target}")]
    IncoherentLevels {
        action: SignalAction,
        stop: f64,
        entry: f64,
        target: f64,
    },

    #[error("holding period must be a positive number of days, got {0}")]
    InvalidHoldingPeriod(f64),
}

/// Entry/target/stop levels of a directional draft
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceLevels {
    pub entry: f64,
    pub target: f64,
    pub stop: f64,
}

/// A validated draft — every field range-checked and coherent
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDraft {
    pub action: SignalAction,
    /// Model-reported confidence, verified within [0, 100]
    pub llm_confidence: f64,
    /// Present for BUY/SELL; a HOLD draft carries no levels
    pub levels: Option<PriceLevels>,
    pub holding_period_days: u32,
    pub reasoning: String,
    pub cited_fragments: Vec<FragmentId>,
}

impl ParsedDraft {
    /// Reward distance over risk distance; 0 for a draft without levels
    pub fn risk_reward_ratio(&self) -> f64 {
        let Some(levels) = self.levels else {
            return 0.0;
        };
        match self.action {
            SignalAction::Buy => (levels.target - levels.entry) / (levels.entry - levels.stop),
            SignalAction::Sell => (levels.entry - levels.target) / (levels.stop - levels.entry),
            SignalAction::Hold => 0.0,
        }
    }

    /// Resolve cited fragment ids against what retrieval actually
    /// returned; ids the model was never shown are dropped
    pub fn resolve_citations(&self, retrieval: &RetrievalResult) -> Vec<Citation> {
        self.cited_fragments
            .iter()
            .filter_map(|id| retrieval.get(id))
            .map(Citation::for_fragment)
            .collect()
    }
}

/// Loose mirror of the JSON the drafter is asked to produce
///
/// Everything is optional here; validation decides what was actually
/// required. Aliases absorb the field-name drift generative models
/// exhibit.
#[derive(Debug, Deserialize)]
struct RawDraft {
    #[serde(alias = "signal", alias = "recommendation")]
    action: Option<String>,
    #[serde(alias = "llm_confidence", alias = "confidence_score")]
    confidence: Option<f64>,
    #[serde(alias = "entry")]
    entry_price: Option<f64>,
    #[serde(alias = "target")]
    target_price: Option<f64>,
    #[serde(alias = "stop")]
    stop_loss: Option<f64>,
    #[serde(alias = "holding_period", alias = "holding_days")]
    holding_period_days: Option<f64>,
    #[serde(alias = "rationale", alias = "explanation")]
    reasoning: Option<String>,
    #[serde(default, alias = "sources", alias = "cited_fragments")]
    citations: Vec<String>,
}

/// Parse and validate raw drafter text
pub fn parse_draft(raw: &str) -> Result<ParsedDraft, DraftError> {
    let json = extract_json_object(raw).ok_or(DraftError::NoJsonObject)?;
    let draft: RawDraft =
        serde_json::from_str(json).map_err(|err| DraftError::InvalidJson(err.to_string()))?;

    let action = parse_action(draft.action.as_deref())?;
    let confidence = validate_confidence(draft.confidence)?;

    let levels = if action.is_directional() {
        Some(validate_levels(
            action,
            draft.entry_price,
            draft.target_price,
            draft.stop_loss,
        )?)
    } else {
        None
    };

    let holding_period_days = match draft.holding_period_days {
        None => DEFAULT_HOLDING_DAYS,
        Some(days) if days.is_finite() && days >= 1.0 => days as u32,
        Some(days) => return Err(DraftError::InvalidHoldingPeriod(days)),
    };

    Ok(ParsedDraft {
        action,
        llm_confidence: confidence,
        levels,
        holding_period_days,
        reasoning: draft.reasoning.unwrap_or_default(),
        cited_fragments: draft.citations.into_iter().map(FragmentId::from).collect(),
    })
}

/// Locate the JSON object inside possibly fenced, possibly chatty text
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

fn parse_action(action: Option<&str>) -> Result<SignalAction, DraftError> {
    let action = action.ok_or(DraftError::MissingAction)?;
    match action.trim().to_ascii_uppercase().as_str() {
        "BUY" => Ok(SignalAction::Buy),
        "SELL" => Ok(SignalAction::Sell),
        "HOLD" => Ok(SignalAction::Hold),
        other => Err(DraftError::UnknownAction(other.to_string())),
    }
}

fn validate_confidence(confidence: Option<f64>) -> Result<f64, DraftError> {
    let confidence = confidence.ok_or(DraftError::MissingConfidence)?;
    if !confidence.is_finite() || !(0.0..=100.0).contains(&confidence) {
        return Err(DraftError::ConfidenceOutOfRange(confidence));
    }
    Ok(confidence)
}

fn validate_levels(
    action: SignalAction,
    entry: Option<f64>,
    target: Option<f64>,
    stop: Option<f64>,
) -> Result<PriceLevels, DraftError> {
    let require = |value: Option<f64>, field: &'static str| -> Result<f64, DraftError> {
        let value = value.ok_or(DraftError::MissingPrice { field })?;
        if !value.is_finite() || value <= 0.0 {
            return Err(DraftError::InvalidPrice { field, value });
        }
        Ok(value)
    };

    let entry = require(entry, "entry_price")?;
    let target = require(target, "target_price")?;
    let stop = require(stop, "stop_loss")?;

    let coherent = match action {
        SignalAction::Buy => stop < entry && entry < target,
        SignalAction::Sell => target < entry && entry < stop,
        SignalAction::Hold => true,
    };
    if !coherent {
        return Err(DraftError::IncoherentLevels {
            action,
            stop,
            entry,
            target,
        });
    }

    Ok(PriceLevels {
        entry,
        target,
        stop,
    })
}
