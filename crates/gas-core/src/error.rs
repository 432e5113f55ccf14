//! Unified error handling for Gas Core.
//!
//! Wraps domain and application errors behind one type, with user-actionable
//! suggestions and a display category.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for gas-core operations.
///
/// Every variant is fatal for the run that produced it. Soft, per-resource
/// problems are reported as [`crate::domain::ResolutionIssue`] instead.
#[derive(Debug, Error, Clone)]
pub enum GasError {
    /// Errors from the domain layer (pure-logic violations).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Errors from the application layer (orchestration and port failures).
    #[error(transparent)]
    Application(#[from] ApplicationError),
}

impl GasError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => e.category(),
            Self::Application(e) => e.category(),
        }
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Input data is malformed (manifest, payload).
    Validation,
    /// Inputs contradict each other (duplicates, cycles).
    Conflict,
    NotFound,
    /// The external runtime misbehaved.
    Evaluation,
    Internal,
}

/// Convenient result type alias.
pub type GasResult<T> = Result<T, GasError>;
