//! Node Data Structures
//!
//! This module defines the core `Node` struct and related types for Dockyard's
//! ordered connection hierarchy.
//!
//! # Architecture
//!
//! - **Universal Node**: a single struct represents every entry kind (folders,
//!   container hosts, remote hosts, local endpoints)
//! - **Doubly Linked Ordering**: sibling order is persisted as pairwise
//!   `prev_sibling_id` / `next_sibling_id` links, not integer indices
//! - **Explicit Optionals**: absent references are `None`, never sentinel
//!   strings
//! - **Opaque Properties**: kind-specific data (addresses, ports, credential
//!   references) lives in the `properties` JSON field and is not interpreted
//!   by this crate
//!
//! # Examples
//!
//! ```rust
//! use dockyard_core::models::{Node, NodeKind};
//! use serde_json::json;
//!
//! // A root-level folder
//! let folder = Node::new(
//!     NodeKind::Folder,
//!     "Production".to_string(),
//!     None,
//!     json!({}),
//! );
//!
//! // A remote host filed under it
//! let host = Node::new(
//!     NodeKind::RemoteHost,
//!     "db-primary".to_string(),
//!     Some(folder.id.clone()),
//!     json!({
//!         "address": "10.40.1.12",
//!         "port": 22
//!     }),
//! );
//! assert_eq!(host.parent_id.as_deref(), Some(folder.id.as_str()));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Validation errors for Node data
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid parent reference: {0}")]
    InvalidParent(String),

    #[error("Invalid sibling reference: {0}")]
    InvalidSibling(String),

    #[error("Properties validation failed: {0}")]
    InvalidProperties(String),
}

/// Kind of an entry in the connection hierarchy.
///
/// `Folder` and `ContainerHost` may hold children; `RemoteHost` and
/// `LocalEndpoint` are leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    /// Grouping folder with no connection of its own
    Folder,
    /// Host running a container runtime; its containers appear as children
    ContainerHost,
    /// Host reached over the network
    RemoteHost,
    /// Endpoint on the local machine
    LocalEndpoint,
}

impl NodeKind {
    /// Whether entries of this kind may hold children.
    pub fn is_container(&self) -> bool {
        matches!(self, NodeKind::Folder | NodeKind::ContainerHost)
    }
}

/// One entry in the connection hierarchy.
///
/// # Fields
///
/// - `id`: unique identifier (UUID for generated nodes, opaque on read)
/// - `kind`: entry kind (folder, container host, remote host, local endpoint)
/// - `name`: display name
/// - `parent_id`: optional reference to the parent node (`None` means root)
/// - `prev_sibling_id` / `next_sibling_id`: pairwise sibling-order links
/// - `created_at` / `modified_at`: timestamps
/// - `properties`: JSON object holding kind-specific fields
///
/// # Sibling Links
///
/// The links form a doubly linked list within one parent's children. They are
/// upheld as consistent on every write, but readers must never assume they
/// are: order reconstruction tolerates dangling references, self loops, and
/// cycles (see `services::order`).
///
/// # Examples
///
/// ```rust
/// # use dockyard_core::models::{Node, NodeKind};
/// # use serde_json::json;
/// let endpoint = Node::new(
///     NodeKind::LocalEndpoint,
///     "docker.sock".to_string(),
///     None,
///     json!({ "path": "/var/run/docker.sock" }),
/// );
/// assert!(endpoint.is_root());
/// assert!(!endpoint.kind.is_container());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique identifier (UUID v4 for nodes created by this crate)
    pub id: String,

    /// Entry kind
    pub kind: NodeKind,

    /// Display name
    pub name: String,

    /// Parent node ID (`None` means root level)
    pub parent_id: Option<String>,

    /// Previous sibling in the parent's chain (`None` means chain head)
    pub prev_sibling_id: Option<String>,

    /// Next sibling in the parent's chain (`None` means chain tail)
    pub next_sibling_id: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub modified_at: DateTime<Utc>,

    /// Kind-specific fields (address, port, credential reference, ...)
    pub properties: serde_json::Value,
}

impl Node {
    /// Create a new Node with an auto-generated UUID.
    ///
    /// Sibling links start empty; `create_node` on the store wires the new
    /// node to the tail of its parent's chain.
    ///
    /// # Arguments
    ///
    /// * `kind` - entry kind
    /// * `name` - display name
    /// * `parent_id` - optional parent reference (`None` for root level)
    /// * `properties` - JSON object with kind-specific fields
    pub fn new(
        kind: NodeKind,
        name: String,
        parent_id: Option<String>,
        properties: serde_json::Value,
    ) -> Self {
        let now = Utc::now();
        let id = Uuid::new_v4().to_string();

        Self {
            id,
            kind,
            name,
            parent_id,
            prev_sibling_id: None,
            next_sibling_id: None,
            created_at: now,
            modified_at: now,
            properties,
        }
    }

    /// Create a new Node with an explicit ID.
    ///
    /// Used when the caller controls identity, for example when importing an
    /// existing inventory.
    pub fn new_with_id(
        id: String,
        kind: NodeKind,
        name: String,
        parent_id: Option<String>,
        properties: serde_json::Value,
    ) -> Self {
        let now = Utc::now();

        Self {
            id,
            kind,
            name,
            parent_id,
            prev_sibling_id: None,
            next_sibling_id: None,
            created_at: now,
            modified_at: now,
            properties,
        }
    }

    /// Set both sibling links (builder style).
    pub fn with_links(mut self, prev: Option<String>, next: Option<String>) -> Self {
        self.prev_sibling_id = prev;
        self.next_sibling_id = next;
        self
    }

    /// Set the creation timestamp (builder style).
    ///
    /// `modified_at` follows along so a freshly built node never reports a
    /// modification older than its creation.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.modified_at = created_at;
        self
    }

    /// Validate node structure and required fields.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if:
    /// - `id` is empty
    /// - `name` is empty
    /// - `properties` is not a JSON object
    /// - the node references itself as parent or sibling
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::MissingField("id".to_string()));
        }

        if self.name.is_empty() {
            return Err(ValidationError::MissingField("name".to_string()));
        }

        if !self.properties.is_object() {
            return Err(ValidationError::InvalidProperties(
                "properties must be a JSON object".to_string(),
            ));
        }

        if let Some(parent_id) = &self.parent_id {
            if parent_id == &self.id {
                return Err(ValidationError::InvalidParent(
                    "Node cannot be its own parent".to_string(),
                ));
            }
        }

        if let Some(prev_id) = &self.prev_sibling_id {
            if prev_id == &self.id {
                return Err(ValidationError::InvalidSibling(
                    "Node cannot be its own previous sibling".to_string(),
                ));
            }
        }

        if let Some(next_id) = &self.next_sibling_id {
            if next_id == &self.id {
                return Err(ValidationError::InvalidSibling(
                    "Node cannot be its own next sibling".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Check if this node sits at the root level (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Update the display name.
    pub fn set_name(&mut self, name: String) {
        self.name = name;
        self.modified_at = Utc::now();
    }

    /// Replace the kind-specific properties.
    pub fn set_properties(&mut self, properties: serde_json::Value) {
        self.properties = properties;
        self.modified_at = Utc::now();
    }
}

/// Result of a delete operation
///
/// Delete is idempotent: the operation succeeds whether or not the node was
/// present, and `existed` records which case occurred for auditing.
///
/// # Examples
///
/// ```rust
/// use dockyard_core::models::DeleteResult;
///
/// let result = DeleteResult::existed();
/// assert!(result.existed);
///
/// let result = DeleteResult::not_found();
/// assert!(!result.existed);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteResult {
    /// Whether the node existed before deletion
    pub existed: bool,
}

impl DeleteResult {
    /// Create a DeleteResult indicating the node existed
    pub fn existed() -> Self {
        Self { existed: true }
    }

    /// Create a DeleteResult indicating the node didn't exist
    pub fn not_found() -> Self {
        Self { existed: false }
    }
}
