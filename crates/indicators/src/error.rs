use thiserror::Error;

/// Errors from indicator computation
///
/// Short-but-nonempty histories are not errors — they yield per-field
/// absence markers. Only a history the engine can derive nothing from is
/// refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndicatorError {
    #[error("no price history supplied for {symbol}")]
    InsufficientHistory { symbol: String },

    #[error("price history for {symbol} is not chronologically increasing at bar {index}")]
    OutOfOrder { symbol: String, index: usize },
}

pub type IndicatorResult<T> = std::result::Result<T, IndicatorError>;
