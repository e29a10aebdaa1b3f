//! Data Models
//!
//! This module contains the core data structures used throughout Dockyard:
//!
//! - `Node` - one entry in the connection hierarchy, with pairwise sibling
//!   links carrying its order
//! - `MoveRequest` / `LinkPatch` - reparent operations and the link mutations
//!   they resolve to
//!
//! Kind-specific data (addresses, ports, credential references) stays in the
//! opaque `properties` field; this crate never interprets it.

mod links;
mod node;

pub use links::{LinkPatch, MovePosition, MoveRequest};
pub use node::{DeleteResult, Node, NodeKind, ValidationError};
