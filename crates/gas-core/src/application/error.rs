//! Application layer errors.
//!
//! These errors represent failures of orchestration and of the adapters behind
//! the ports. Pure-logic violations are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur while driving the resolution pipeline.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// Store access failed (lock poisoned).
    #[error("Resource store error")]
    StoreLockError,

    /// The runtime program is not on `PATH`.
    #[error("Runtime '{program}' not found on PATH")]
    RuntimeNotFound { program: String },

    /// The runtime could not be started, or exited unsuccessfully.
    #[error("Evaluation with '{program}' failed: {reason}{}", format_output(.output))]
    EvaluationFailed {
        program: String,
        reason: String,
        output: String,
    },

    /// The runtime did not finish in time and was killed.
    #[error("Evaluation with '{program}' timed out after {timeout_secs}s{}", format_output(.output))]
    EvaluationTimedOut {
        program: String,
        timeout_secs: u64,
        output: String,
    },

    /// A background resolution ended without delivering a result.
    #[error("Background resolution ended without a result")]
    BackgroundTaskFailed,
}

fn format_output(output: &str) -> String {
    let trimmed = output.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("\n--- runtime output ---\n{trimmed}")
    }
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that the resource container directory exists".into(),
                "Each resource needs a package.json and a _<group>.<entity>.<kind>.index.ts"
                    .into(),
                "Set it with --dir or resources.container_dir".into(),
            ],
            Self::StoreLockError => vec![
                "The resource store is locked".into(),
                "Try again in a moment".into(),
            ],
            Self::RuntimeNotFound { program } => vec![
                format!("Install '{program}' or add it to PATH"),
                "Or point evaluator.program at a module-capable runtime".into(),
            ],
            Self::EvaluationFailed { .. } => vec![
                "Run `gas script` to inspect the generated module".into(),
                "Check the runtime output above for the failing expression".into(),
            ],
            Self::EvaluationTimedOut { .. } => vec![
                "Raise evaluator.timeout_secs if the runtime is slow to start".into(),
                "Check resource configs for code that never finishes".into(),
            ],
            Self::BackgroundTaskFailed => vec![
                "This appears to be a bug in gas".into(),
                "Re-run with -vvv and report the log".into(),
            ],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::FilesystemError { .. } => ErrorCategory::NotFound,
            Self::RuntimeNotFound { .. } => ErrorCategory::NotFound,
            Self::EvaluationFailed { .. } | Self::EvaluationTimedOut { .. } => {
                ErrorCategory::Evaluation
            }
            Self::StoreLockError | Self::BackgroundTaskFailed => ErrorCategory::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluation_failure_includes_output() {
        let err = ApplicationError::EvaluationFailed {
            program: "node".into(),
            reason: "exit status 1".into(),
            output: "ReferenceError: cloudflareKv is not defined\n".into(),
        };

        let message = err.to_string();

        assert!(message.starts_with("Evaluation with 'node' failed: exit status 1"));
        assert!(message.contains("ReferenceError: cloudflareKv is not defined"));
    }

    #[test]
    fn empty_output_is_not_rendered() {
        let err = ApplicationError::EvaluationTimedOut {
            program: "node".into(),
            timeout_secs: 30,
            output: "  \n".into(),
        };

        assert_eq!(err.to_string(), "Evaluation with 'node' timed out after 30s");
    }
}
