//! Storage Layer
//!
//! Persistence boundary for the hierarchy. The `NodeStore` trait is the
//! contract every backend implements, `MemoryStore` is the embedded
//! reference backend, and `TreeEvent` carries store-acknowledged changes
//! out to subscribers.

mod events;
mod memory_store;
mod node_store;

pub use events::TreeEvent;
pub use memory_store::MemoryStore;
pub use node_store::NodeStore;
