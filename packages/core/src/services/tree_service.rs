//! Tree Service
//!
//! High-level entry point for working with the hierarchy. Wraps a
//! `NodeStore` and coordinates the snapshot-based services on top of it:
//! reads fetch a fresh snapshot and reconstruct order locally, mutations
//! validate against that snapshot before submitting to the store, and
//! store-acknowledged changes fan out to subscribers as `TreeEvent`s.
//!
//! The service never mutates local state itself. The store is the single
//! writer of truth; after a mutation callers refetch (or react to the
//! emitted event) to observe the new shape.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::models::{DeleteResult, MoveRequest, Node};
use crate::services::error::TreeServiceError;
use crate::services::move_engine::MoveEngine;
use crate::services::order;
use crate::services::repository::NodeRepository;
use crate::services::tree::{build_tree, TreeNode};
use crate::store::{NodeStore, TreeEvent};

/// Broadcast channel capacity for tree events.
///
/// 128 provides headroom for burst operations (bulk imports, subtree
/// deletes) while limiting memory overhead. Lagging subscribers lose old
/// events and are expected to refetch the snapshot instead of replaying
/// history.
const TREE_EVENT_CHANNEL_CAPACITY: usize = 128;

/// Orchestrates hierarchy reads, mutations, and change notification.
///
/// # Examples
///
/// ```no_run
/// # use dockyard_core::services::TreeService;
/// # use dockyard_core::store::MemoryStore;
/// # use std::sync::Arc;
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let service = TreeService::new(Arc::new(MemoryStore::new()));
/// let roots = service.tree().await?;
/// println!("{} root nodes", roots.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TreeService {
    /// Store backing all reads and writes
    store: Arc<dyn NodeStore>,

    /// Broadcast channel for store-acknowledged changes
    event_tx: broadcast::Sender<TreeEvent>,
}

impl TreeService {
    /// Create a new TreeService over the given store.
    pub fn new(store: Arc<dyn NodeStore>) -> Self {
        let (event_tx, _) = broadcast::channel(TREE_EVENT_CHANNEL_CAPACITY);
        Self { store, event_tx }
    }

    /// Get access to the underlying store.
    pub fn store(&self) -> &Arc<dyn NodeStore> {
        &self.store
    }

    /// Subscribe to tree events.
    ///
    /// Returns a broadcast receiver that sees every change the store
    /// acknowledged after the subscription (node created, moved, renamed,
    /// deleted). Events for rejected operations are never emitted.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use dockyard_core::services::TreeService;
    /// # use dockyard_core::store::MemoryStore;
    /// # use std::sync::Arc;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// # let service = TreeService::new(Arc::new(MemoryStore::new()));
    /// let mut rx = service.subscribe_to_events();
    /// tokio::spawn(async move {
    ///     while let Ok(event) = rx.recv().await {
    ///         println!("{}", event.event_type());
    ///     }
    /// });
    /// # Ok(())
    /// # }
    /// ```
    pub fn subscribe_to_events(&self) -> broadcast::Receiver<TreeEvent> {
        self.event_tx.subscribe()
    }

    /// Emit a tree event to all subscribers.
    ///
    /// Ignores errors if no subscribers (expected in some tests).
    fn emit_event(&self, event: TreeEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Fetch a fresh snapshot of every node, indexed for O(1) lookup.
    pub async fn snapshot(&self) -> Result<NodeRepository, TreeServiceError> {
        let nodes = self.store.fetch_nodes().await?;
        Ok(NodeRepository::from_snapshot(nodes))
    }

    /// Fetch the whole hierarchy as ordered root trees.
    ///
    /// Corrupted parent or sibling links never fail the call; affected
    /// nodes surface at the nearest consistent position (see `build_tree`).
    pub async fn tree(&self) -> Result<Vec<TreeNode>, TreeServiceError> {
        let repo = self.snapshot().await?;
        Ok(build_tree(&repo))
    }

    /// Fetch the ordered children of a parent (`None` for root nodes).
    pub async fn children(&self, parent_id: Option<&str>) -> Result<Vec<Node>, TreeServiceError> {
        let repo = self.snapshot().await?;
        Ok(order::reconstruct(repo.sibling_group(parent_id)))
    }

    /// Move a node to a new parent and/or position.
    ///
    /// Plans the move against a fresh snapshot first, so structural errors
    /// (unknown ids, non-container parents, cycles) surface as typed errors
    /// before anything is submitted. The store then re-validates and applies
    /// the move atomically; only after its acknowledgement is a `NodeMoved`
    /// event emitted.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use dockyard_core::models::MoveRequest;
    /// # use dockyard_core::services::TreeService;
    /// # use dockyard_core::store::MemoryStore;
    /// # use std::sync::Arc;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// # let service = TreeService::new(Arc::new(MemoryStore::new()));
    /// service
    ///     .move_node(MoveRequest::before("b".to_string(), "a".to_string()))
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn move_node(&self, request: MoveRequest) -> Result<(), TreeServiceError> {
        let repo = self.snapshot().await?;
        let plan = MoveEngine::new(&repo).plan(&request)?;

        // The store is the final authority; it re-validates against its
        // own state before applying.
        self.store.apply_move(&plan.request).await?;

        tracing::debug!(
            "Moved node {} to parent {:?}",
            plan.request.node_id,
            plan.request.new_parent_id
        );
        self.emit_event(TreeEvent::NodeMoved {
            id: plan.request.node_id,
            new_parent_id: plan.request.new_parent_id,
        });
        Ok(())
    }

    /// Create a node.
    ///
    /// The store wires the node to the tail of its sibling chain; the
    /// returned node carries the final links.
    pub async fn create_node(&self, node: Node) -> Result<Node, TreeServiceError> {
        node.validate()?;
        let created = self.store.create_node(node).await?;

        tracing::debug!("Created node {}", created.id);
        self.emit_event(TreeEvent::NodeCreated(created.clone()));
        Ok(created)
    }

    /// Delete a node and its subtree.
    ///
    /// Idempotent: deleting an unknown id reports `existed: false` instead
    /// of failing. A `NodeDeleted` event is emitted only when something was
    /// actually removed.
    pub async fn delete_node(&self, id: &str) -> Result<DeleteResult, TreeServiceError> {
        let result = self.store.delete_node(id).await?;

        if result.existed {
            tracing::debug!("Deleted node {}", id);
            self.emit_event(TreeEvent::NodeDeleted { id: id.to_string() });
        }
        Ok(result)
    }

    /// Rename a node.
    pub async fn rename_node(&self, id: &str, name: &str) -> Result<(), TreeServiceError> {
        self.store.rename_node(id, name).await?;

        self.emit_event(TreeEvent::NodeRenamed {
            id: id.to_string(),
            name: name.to_string(),
        });
        Ok(())
    }
}

// Comprehensive tests in separate module
#[cfg(test)]
#[path = "tree_service_test.rs"]
mod tree_service_test;
