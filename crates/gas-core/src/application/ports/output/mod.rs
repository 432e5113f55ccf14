//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `gas-adapters` crate provides implementations.

use std::path::Path;

use crate::domain::{
    ConfigScript, EvaluatedConfigs, Extraction, GraphLayout, NameToDeps, Resource,
};
use crate::error::GasResult;

/// Port for locating resources inside a container directory.
///
/// Implemented by:
/// - `gas_adapters::resource_store::LocalResourceStore` (production)
/// - `gas_adapters::resource_store::InMemoryResourceStore` (testing)
///
/// One resource per immediate subdirectory of `container`; non-directory
/// entries are skipped. Each resource carries its decoded `package.json` and,
/// when one exists, its index source file.
pub trait ResourceStore: Send + Sync {
    fn load(&self, container: &Path) -> GasResult<Vec<Resource>>;
}

/// Port for isolating the config expression of an index source file.
///
/// Implemented by:
/// - `gas_adapters::extractor::RegexConfigExtractor`
pub trait ConfigExtractor: Send + Sync {
    /// Module specifier config setters are imported from.
    fn setter_module(&self) -> &str;

    /// Scan `source` for the single config expression it exports.
    ///
    /// Never fails: every outcome other than `Found` is a soft issue.
    fn extract(&self, source: &str) -> Extraction;
}

/// Port for the dependency graph collaborator.
///
/// Implemented by:
/// - `gas_adapters::grapher::PetgraphGrapher`
///
/// ## Contract
///
/// - Every key of `deps` appears in exactly one layer
/// - A resource's layer is strictly greater than each of its dependencies'
/// - Cycles (self-dependency included) fail with `DomainError::DependencyCycle`
/// - An edge to an identifier that is not a key fails with
///   `DomainError::UnknownDependency`
pub trait DependencyGrapher: Send + Sync {
    fn layout(&self, deps: &NameToDeps) -> GasResult<GraphLayout>;
}

/// Port for evaluating the synthesized script in an external runtime.
///
/// Implemented by:
/// - `gas_adapters::evaluator::ProcessEvaluator` (`node --input-type=module`)
#[cfg_attr(test, mockall::automock)]
pub trait ConfigEvaluator: Send + Sync {
    fn evaluate(&self, script: &ConfigScript) -> GasResult<EvaluatedConfigs>;
}
