//! Tree Change Events
//!
//! This module defines the events emitted after the authoritative store
//! acknowledges a mutation. They follow the observer pattern: consumers
//! subscribe through `TreeService` and refetch the snapshot when something
//! changed, without coupling to the store implementation.
//!
//! # Event Flow
//!
//! 1. `TreeService` submits a mutation to the store
//! 2. The store acknowledges (or rejects) it
//! 3. On acknowledgement only, the event is emitted via tokio's broadcast
//!    channel
//! 4. Subscribers react, typically by refetching and rebuilding the tree

use crate::models::Node;

/// Change notifications emitted by `TreeService`
///
/// Events describe acknowledged mutations, never attempts: a failed move
/// emits nothing.
#[derive(Debug, Clone)]
pub enum TreeEvent {
    /// A new node was created
    NodeCreated(Node),

    /// A node was moved to a new parent or position
    NodeMoved {
        id: String,
        new_parent_id: Option<String>,
    },

    /// A node's display name changed
    NodeRenamed { id: String, name: String },

    /// A node (and its subtree) was deleted
    NodeDeleted { id: String },
}

impl TreeEvent {
    /// Get a string representation of the event type
    ///
    /// Useful for logging and for consumers that route events by kind.
    pub fn event_type(&self) -> &str {
        match self {
            TreeEvent::NodeCreated(_) => "node:created",
            TreeEvent::NodeMoved { .. } => "node:moved",
            TreeEvent::NodeRenamed { .. } => "node:renamed",
            TreeEvent::NodeDeleted { .. } => "node:deleted",
        }
    }
}
