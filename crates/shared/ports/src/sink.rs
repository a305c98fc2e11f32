use async_trait::async_trait;

use delphi_core::Signal;

use crate::error::PortResult;

/// Output boundary for finished signals
///
/// Persistence success or failure is the caller's concern; the engine
/// reports sink errors but never fails a cycle on them.
#[async_trait]
pub trait SignalSink: Send + Sync {
    async fn persist(&self, signal: &Signal) -> PortResult<()>;
}
