//! Application layer for gas.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (`ResolveService`)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! resolution rules itself. Those live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

pub use services::{Resolution, ResolutionPlan, ResolveHandle, ResolveService};

pub use ports::{ConfigEvaluator, ConfigExtractor, DependencyGrapher, ResourceStore};

pub use error::ApplicationError;
