//! Gas Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for `gas`, the
//! resource resolution pipeline: it scans a container directory of resource
//! packages, rebuilds their dependency graph, extracts each resource's config
//! expression and turns the evaluated result into typed configuration records.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             gas-cli (CLI)               │
//! │       (Implements Driving Ports)        │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │          Application Services           │
//! │            (ResolveService)             │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │        Application Ports (Traits)       │
//! │  (Store, Extractor, Grapher, Evaluator) │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      gas-adapters (Infrastructure)      │
//! │ (LocalResourceStore, ProcessEvaluator)  │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (ResourceId, GraphLayout, ConfigScript) │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! locate → read manifests → map dependencies → layout graph
//!        → extract configs → synthesize script → evaluate → materialize
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gas_core::application::ResolveService;
//!
//! // Adapters come from `gas-adapters`.
//! let service = ResolveService::new(store, extractor, grapher, evaluator);
//! let resolution = service.resolve("./gas").unwrap();
//!
//! for (id, config) in &resolution.configs {
//!     println!("{id}: {} ({})", config.name(), config.kind());
//! }
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        Resolution, ResolutionPlan, ResolveHandle, ResolveService,
        ports::{ConfigEvaluator, ConfigExtractor, DependencyGrapher, ResourceStore},
    };
    pub use crate::domain::{
        ConfigExpression, ConfigScript, EvaluatedConfigs, Extraction, GraphLayout, NameToDeps,
        PackageManifest, ResolutionIssue, Resource, ResourceId, ResourceKind, TypedConfig,
    };
    pub use crate::error::{GasError, GasResult};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
