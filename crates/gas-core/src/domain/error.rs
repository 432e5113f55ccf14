use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (results can be handed across threads and re-reported)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    #[error("invalid resource folder name '{name}': {reason}")]
    InvalidResourceName { name: String, reason: String },

    #[error("failed to parse manifest {path}: {reason}")]
    InvalidManifest { path: PathBuf, reason: String },

    #[error("runtime output is not a config payload: {reason}")]
    MalformedPayload { reason: String },

    #[error("unknown resource type '{type_name}'")]
    UnknownResourceType { type_name: String },

    // ========================================================================
    // Conflicts
    // ========================================================================
    #[error(
        "folders {} and {} both resolve to resource id '{id}'",
        .first.display(),
        .second.display()
    )]
    DuplicateResourceId {
        id: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("package name '{package}' is declared by both '{first}' and '{second}'")]
    DuplicatePackageName {
        package: String,
        first: String,
        second: String,
    },

    #[error("dependency cycle between resources: {}", .cycle.join(" -> "))]
    DependencyCycle { cycle: Vec<String> },

    #[error("layout places '{resource}' at or below its dependency '{dependency}'")]
    LayoutViolation {
        resource: String,
        dependency: String,
    },

    // ========================================================================
    // Not Found
    // ========================================================================
    #[error("resource '{resource}' depends on unknown resource '{dependency}'")]
    UnknownDependency {
        resource: String,
        dependency: String,
    },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidManifest { path, .. } => vec![
                format!("Check that {} is valid JSON", path.display()),
                "Every manifest needs a string \"name\" field".into(),
            ],
            Self::DuplicateResourceId { first, second, .. } => vec![
                "Folder names are canonicalized by upper-casing and replacing '-' with '_'".into(),
                format!(
                    "Rename either {} or {}",
                    first.display(),
                    second.display()
                ),
            ],
            Self::DuplicatePackageName { package, .. } => vec![
                format!("Give each resource a unique package name instead of '{package}'"),
            ],
            Self::DependencyCycle { cycle } => vec![
                format!("Break the cycle between: {}", cycle.join(", ")),
                "Resource configs must be evaluable dependencies-first".into(),
            ],
            Self::MalformedPayload { .. } => vec![
                "The last line printed by the runtime must be one JSON object".into(),
                "Remove stray console output from resource index files".into(),
            ],
            Self::UnknownDependency { dependency, .. } => vec![format!(
                "Add a resource folder for '{dependency}' or remove the dependency"
            )],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidResourceName { .. }
            | Self::InvalidManifest { .. }
            | Self::MalformedPayload { .. }
            | Self::UnknownResourceType { .. } => ErrorCategory::Validation,
            Self::DuplicateResourceId { .. }
            | Self::DuplicatePackageName { .. }
            | Self::DependencyCycle { .. } => ErrorCategory::Conflict,
            Self::UnknownDependency { .. } => ErrorCategory::NotFound,
            Self::LayoutViolation { .. } => ErrorCategory::Internal,
        }
    }
}
