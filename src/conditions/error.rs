//! condition error types

use thiserror::Error;

/// error delivered on a wait handle
///
/// `Closed` means the condition is permanently done: it will never change
/// again and re-subscribing is pointless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConditionError {
    /// the condition was closed while (or before) the wait was pending
    #[error("condition closed")]
    Closed,
}

impl ConditionError {
    /// check if this error signals a closed condition
    pub fn is_closed(&self) -> bool {
        matches!(self, ConditionError::Closed)
    }
}
