//! Dockyard Core Hierarchy Layer
//!
//! This crate provides the ordered-hierarchy engine for the Dockyard
//! connection manager: sibling-link order reconstruction, move validation
//! and planning, drop-gesture resolution, and store-backed orchestration.
//!
//! # Architecture
//!
//! - **Doubly Linked Ordering**: Sibling order lives in `prevSiblingId` /
//!   `nextSiblingId` links on each node, not in an index column
//! - **Corruption Tolerant**: Every read path reconstructs a usable total
//!   order from whatever link state it finds; nothing is ever dropped
//! - **Snapshot Reads, Authoritative Writes**: Services plan against
//!   immutable snapshots; the store validates and applies every mutation
//! - **Pluggable Persistence**: Backends implement the `NodeStore` trait;
//!   an in-memory reference store ships with the crate
//!
//! # Modules
//!
//! - [`models`] - Data structures (Node, MoveRequest, LinkPatch, etc.)
//! - [`services`] - Hierarchy logic (ordering, moves, gestures, TreeService)
//! - [`store`] - Persistence trait, in-memory backend, and tree events

pub mod models;
pub mod services;
pub mod store;

// Re-export commonly used types
pub use models::*;
pub use services::*;
pub use store::*;
