//! NodeStore Trait - Authoritative Store Abstraction
//!
//! This module defines the `NodeStore` trait that abstracts the
//! authoritative hierarchy store behind `TreeService`. The trait enables
//! multiple backends (the embedded `MemoryStore`, a desktop app's settings
//! database, a remote inventory service) without changing any ordering or
//! move logic.
//!
//! # Architecture
//!
//! - **Single Writer of Truth**: all link mutations flow through
//!   `apply_move`; the store re-validates and applies them atomically
//! - **Snapshot Reads**: `fetch_nodes` returns the complete flat node list;
//!   order and nesting are derived client-side from the links
//! - **Async-First**: all methods are async so network-backed stores fit
//!   the same seam as embedded ones
//! - **Error Handling**: `anyhow::Result` at the boundary; `TreeService`
//!   wraps failures as transport errors
//!
//! # Examples
//!
//! ```rust,no_run
//! use dockyard_core::models::{Node, NodeKind};
//! use dockyard_core::store::{MemoryStore, NodeStore};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store: Arc<dyn NodeStore> = Arc::new(MemoryStore::new());
//!
//!     let folder = Node::new(
//!         NodeKind::Folder,
//!         "Production".to_string(),
//!         None,
//!         json!({}),
//!     );
//!     let created = store.create_node(folder).await?;
//!     println!("Created folder: {}", created.id);
//!
//!     let snapshot = store.fetch_nodes().await?;
//!     println!("Store holds {} nodes", snapshot.len());
//!     Ok(())
//! }
//! ```

use crate::models::{DeleteResult, MoveRequest, Node};
use anyhow::Result;
use async_trait::async_trait;

/// Abstraction layer for the authoritative hierarchy store
///
/// Implementations must be `Send + Sync` so the trait object can be shared
/// across async tasks.
///
/// The store is the final authority on writes: `apply_move` re-validates
/// the request against its own current state rather than trusting the
/// caller's snapshot, and every mutating method leaves the sibling chains
/// consistent.
#[async_trait]
pub trait NodeStore: Send + Sync {
    //
    // SNAPSHOT READ
    //

    /// Fetch the complete flat snapshot of all nodes
    ///
    /// # Returns
    ///
    /// Every node in the store with `parent_id`, `prev_sibling_id`, and
    /// `next_sibling_id` populated. No ordering is promised; callers derive
    /// order from the links.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use dockyard_core::store::NodeStore;
    /// # async fn example(store: &dyn NodeStore) -> anyhow::Result<()> {
    /// let snapshot = store.fetch_nodes().await?;
    /// println!("{} nodes", snapshot.len());
    /// # Ok(())
    /// # }
    /// ```
    async fn fetch_nodes(&self) -> Result<Vec<Node>>;

    //
    // MUTATIONS
    //

    /// Apply one validated move atomically
    ///
    /// # Arguments
    ///
    /// * `request` - normalized move request (effective parent resolved,
    ///   reference cleared for append)
    ///
    /// # Errors
    ///
    /// Returns an error and changes nothing if the request fails the
    /// store's own validation: missing node or reference, non-container
    /// append target, or a placement that would nest the node under its
    /// own subtree. Client-side planning is advisory; this check is final.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use dockyard_core::models::MoveRequest;
    /// # use dockyard_core::store::NodeStore;
    /// # async fn example(store: &dyn NodeStore) -> anyhow::Result<()> {
    /// let request = MoveRequest::append("host-1".to_string(), Some("folder-2".to_string()));
    /// store.apply_move(&request).await?;
    /// # Ok(())
    /// # }
    /// ```
    async fn apply_move(&self, request: &MoveRequest) -> Result<()>;

    /// Create a new node
    ///
    /// The node lands at the tail of its parent's sibling chain; any
    /// sibling links supplied by the caller are overwritten with the tail
    /// position.
    ///
    /// # Ownership
    ///
    /// Takes ownership of the node. The returned node carries the final
    /// persisted state, links included.
    ///
    /// # Errors
    ///
    /// Returns an error if the node fails validation, the id already
    /// exists, or the named parent is absent or not a container kind.
    async fn create_node(&self, node: Node) -> Result<Node>;

    /// Delete a node and its subtree
    ///
    /// The deleted node's former neighbors are linked to each other, so the
    /// surviving chain stays consistent. Descendants go with the node.
    ///
    /// # Idempotency
    ///
    /// Deleting an absent node succeeds; `DeleteResult::existed` records
    /// which case occurred.
    async fn delete_node(&self, id: &str) -> Result<DeleteResult>;

    /// Rename a node
    ///
    /// # Errors
    ///
    /// Returns an error if the node is absent or the new name is empty.
    async fn rename_node(&self, id: &str, name: &str) -> Result<()>;
}
