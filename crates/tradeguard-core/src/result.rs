//! Convenience result type alias for TradeGuard.

use crate::error::ControlPlaneError;

/// A specialized `Result` type for control-plane operations.
pub type AppResult<T> = Result<T, ControlPlaneError>;
