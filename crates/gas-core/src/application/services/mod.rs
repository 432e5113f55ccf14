//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish high-level
//! use cases like "resolve every resource config in a container".

pub mod resolve_service;

pub use resolve_service::{Resolution, ResolutionPlan, ResolveHandle, ResolveService};
