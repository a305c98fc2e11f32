use async_trait::async_trait;

use delphi_core::PriceBar;

use crate::error::PortResult;

/// Port for reading a symbol's daily price history
///
/// Implementations must return bars in chronological order with no
/// duplicate timestamps; the indicator engine depends on that ordering.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Fetch up to `lookback_days` of daily bars, oldest first
    async fn history(&self, symbol: &str, lookback_days: u32) -> PortResult<Vec<PriceBar>>;
}
