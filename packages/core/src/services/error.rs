//! Service Layer Error Types
//!
//! This module defines error types for service-layer operations. Move
//! validation failures are typed; failures crossing the store boundary
//! surface as `Transport`.

use crate::models::ValidationError;
use thiserror::Error;

/// Service operation errors
///
/// Covers move validation, hierarchy safety, and store transport failures.
/// Order reconstruction never produces these: bad link data degrades to a
/// deterministic fallback order instead of an error.
#[derive(Error, Debug)]
pub enum TreeServiceError {
    /// Node not found by ID
    #[error("Node not found: {id}")]
    NodeNotFound { id: String },

    /// Move named the same node as subject and reference
    #[error("Node cannot be moved relative to itself: {id}")]
    SelfReference { id: String },

    /// Move would nest a node under itself or one of its descendants
    #[error("Circular reference detected: moving {node_id} under {ancestor_id}")]
    CircularReference { node_id: String, ancestor_id: String },

    /// Append target is not a container kind
    #[error("Invalid parent node: {parent_id}")]
    InvalidParent { parent_id: String },

    /// Malformed position/reference combination
    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    /// Validation failed for node data
    #[error("Node validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// Store operation failed
    #[error("Store operation failed: {0}")]
    Transport(#[from] anyhow::Error),
}

impl TreeServiceError {
    /// Create a node not found error
    pub fn node_not_found(id: impl Into<String>) -> Self {
        Self::NodeNotFound { id: id.into() }
    }

    /// Create a self reference error
    pub fn self_reference(id: impl Into<String>) -> Self {
        Self::SelfReference { id: id.into() }
    }

    /// Create a circular reference error
    pub fn circular_reference(node_id: impl Into<String>, ancestor_id: impl Into<String>) -> Self {
        Self::CircularReference {
            node_id: node_id.into(),
            ancestor_id: ancestor_id.into(),
        }
    }

    /// Create an invalid parent error
    pub fn invalid_parent(parent_id: impl Into<String>) -> Self {
        Self::InvalidParent {
            parent_id: parent_id.into(),
        }
    }

    /// Create an invalid position error
    pub fn invalid_position(msg: impl Into<String>) -> Self {
        Self::InvalidPosition(msg.into())
    }
}
