use thiserror::Error;

/// Boundary errors for calls that cross into an external collaborator
///
/// The core does not retry these — retry policy belongs to the caller.
/// A per-symbol occurrence degrades that symbol; it never aborts a batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortError {
    #[error("{service} unavailable: {reason}")]
    Unavailable { service: &'static str, reason: String },

    #[error("{service} call exceeded {deadline_ms}ms deadline")]
    Timeout { service: &'static str, deadline_ms: u64 },
}

impl PortError {
    pub fn unavailable(service: &'static str, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            service,
            reason: reason.into(),
        }
    }

    pub fn timeout(service: &'static str, deadline_ms: u64) -> Self {
        Self::Timeout {
            service,
            deadline_ms,
        }
    }

    /// Name of the collaborator that failed
    pub fn service(&self) -> &'static str {
        match self {
            PortError::Unavailable { service, .. } => service,
            PortError::Timeout { service, .. } => service,
        }
    }
}

pub type PortResult<T> = std::result::Result<T, PortError>;
