//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `gas-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `ResourceStore`: locate resources and read their manifests and index files
//!   - `ConfigExtractor`: isolate the config expression of an index source
//!   - `DependencyGrapher`: lay out the dependency graph
//!   - `ConfigEvaluator`: run the synthesized script in an external runtime
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by `ResolveService`)

pub mod output;

pub use output::{ConfigEvaluator, ConfigExtractor, DependencyGrapher, ResourceStore};

#[cfg(test)]
pub use output::MockConfigEvaluator;
