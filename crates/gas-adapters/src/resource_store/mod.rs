//! Resource store adapters.

mod local;
mod memory;

pub use local::LocalResourceStore;
pub use memory::InMemoryResourceStore;
