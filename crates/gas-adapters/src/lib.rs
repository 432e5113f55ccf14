//! Infrastructure adapters for gas.
//!
//! This crate implements the ports defined in `gas-core::application::ports`.
//! It contains all filesystem access, source scanning, graph algorithms and
//! subprocess handling.

pub mod evaluator;
pub mod extractor;
pub mod grapher;
pub mod resource_store;

// Re-export commonly used adapters
pub use evaluator::ProcessEvaluator;
pub use extractor::RegexConfigExtractor;
pub use grapher::PetgraphGrapher;
pub use resource_store::{InMemoryResourceStore, LocalResourceStore};
