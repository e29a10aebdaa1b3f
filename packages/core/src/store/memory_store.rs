//! In-Memory Store
//!
//! Embedded reference implementation of `NodeStore`. It keeps the whole
//! hierarchy in a `HashMap` behind a `tokio::sync::RwLock` and enforces the
//! same invariants a production backend must: moves are re-validated with
//! the move engine against the store's own state and applied atomically
//! under one write guard, creation wires new nodes to the tail of their
//! chain, and deletion closes the gap it leaves behind.
//!
//! Used by tests throughout the crate and suitable as the backing store for
//! embedded setups that persist snapshots elsewhere.

use std::collections::{HashMap, HashSet, VecDeque};

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::models::{DeleteResult, MoveRequest, Node};
use crate::services::{order, MoveEngine, NodeRepository};
use crate::store::node_store::NodeStore;

/// In-memory `NodeStore` backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    nodes: RwLock<HashMap<String, Node>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with the given nodes.
    ///
    /// Links are taken exactly as supplied, corrupted shapes included; this
    /// is how tests stage broken chains. Use `create_node` when tail wiring
    /// should happen automatically.
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        let map = nodes
            .into_iter()
            .map(|node| (node.id.clone(), node))
            .collect();
        Self {
            nodes: RwLock::new(map),
        }
    }

    /// Resolve a link against the map, dropping dangling and excluded ids.
    fn resolve_link<'a>(
        nodes: &HashMap<String, Node>,
        link: Option<&'a str>,
        exclude: &[&str],
    ) -> Option<&'a str> {
        let id = link?;
        if exclude.contains(&id) || !nodes.contains_key(id) {
            return None;
        }
        Some(id)
    }

    /// Ids of `root_id` and every node below it, bounded by a visited set
    /// so corrupted parent loops terminate.
    fn subtree_ids(nodes: &HashMap<String, Node>, root_id: &str) -> Vec<String> {
        let mut children_of: HashMap<&str, Vec<&str>> = HashMap::new();
        for node in nodes.values() {
            if let Some(parent_id) = node.parent_id.as_deref() {
                children_of.entry(parent_id).or_default().push(&node.id);
            }
        }

        let mut collected = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        queue.push_back(root_id);

        while let Some(id) = queue.pop_front() {
            if !visited.insert(id) {
                continue;
            }
            collected.push(id.to_string());
            if let Some(child_ids) = children_of.get(id) {
                queue.extend(child_ids.iter().copied());
            }
        }
        collected
    }
}

#[async_trait]
impl NodeStore for MemoryStore {
    async fn fetch_nodes(&self) -> Result<Vec<Node>> {
        let nodes = self.nodes.read().await;
        Ok(nodes.values().cloned().collect())
    }

    async fn apply_move(&self, request: &MoveRequest) -> Result<()> {
        let mut nodes = self.nodes.write().await;

        // Replan against the store's own state; the caller's snapshot may
        // be stale and its validation is only advisory.
        let repo = NodeRepository::from_snapshot(nodes.values().cloned().collect());
        let plan = MoveEngine::new(&repo)
            .plan(request)
            .map_err(anyhow::Error::new)?;

        for patch in &plan.patches {
            if let Some(node) = nodes.get_mut(&patch.node_id) {
                patch.apply_to(node);
            }
        }
        if let Some(moved) = nodes.get_mut(&request.node_id) {
            moved.modified_at = Utc::now();
        }

        tracing::debug!(
            "Applied move of {} ({} patches)",
            request.node_id,
            plan.patches.len()
        );
        Ok(())
    }

    async fn create_node(&self, mut node: Node) -> Result<Node> {
        node.validate()?;

        let mut nodes = self.nodes.write().await;
        if nodes.contains_key(&node.id) {
            anyhow::bail!("Node already exists: {}", node.id);
        }
        if let Some(parent_id) = node.parent_id.as_deref() {
            let parent = nodes
                .get(parent_id)
                .ok_or_else(|| anyhow::anyhow!("Parent not found: {}", parent_id))?;
            if !parent.kind.is_container() {
                anyhow::bail!("Parent is not a container: {}", parent_id);
            }
        }

        // New nodes land at the tail of their sibling chain.
        let group: Vec<Node> = nodes
            .values()
            .filter(|existing| existing.parent_id == node.parent_id)
            .cloned()
            .collect();
        let tail_id = order::reconstruct(group).pop().map(|tail| tail.id);

        node.prev_sibling_id = tail_id.clone();
        node.next_sibling_id = None;
        if let Some(tail_id) = tail_id {
            if let Some(tail) = nodes.get_mut(&tail_id) {
                tail.next_sibling_id = Some(node.id.clone());
            }
        }

        tracing::debug!("Created node {} under {:?}", node.id, node.parent_id);
        nodes.insert(node.id.clone(), node.clone());
        Ok(node)
    }

    async fn delete_node(&self, id: &str) -> Result<DeleteResult> {
        let mut nodes = self.nodes.write().await;
        let target = match nodes.get(id) {
            Some(node) => node,
            None => return Ok(DeleteResult::not_found()),
        };

        // Close the gap the node leaves in its sibling chain.
        let prev = Self::resolve_link(&nodes, target.prev_sibling_id.as_deref(), &[id])
            .map(str::to_string);
        let next = Self::resolve_link(&nodes, target.next_sibling_id.as_deref(), &[id])
            .map(str::to_string);
        if let Some(prev_id) = &prev {
            if let Some(prev_node) = nodes.get_mut(prev_id) {
                prev_node.next_sibling_id = next.clone().filter(|next_id| next_id != prev_id);
            }
        }
        if let Some(next_id) = &next {
            if let Some(next_node) = nodes.get_mut(next_id) {
                next_node.prev_sibling_id = prev.clone().filter(|prev_id| prev_id != next_id);
            }
        }

        let subtree = Self::subtree_ids(&nodes, id);
        for subtree_id in &subtree {
            nodes.remove(subtree_id);
        }

        tracing::debug!("Deleted node {} and {} descendants", id, subtree.len() - 1);
        Ok(DeleteResult::existed())
    }

    async fn rename_node(&self, id: &str, name: &str) -> Result<()> {
        if name.is_empty() {
            anyhow::bail!("Name cannot be empty");
        }

        let mut nodes = self.nodes.write().await;
        let node = nodes
            .get_mut(id)
            .ok_or_else(|| anyhow::anyhow!("Node not found: {}", id))?;
        node.set_name(name.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NodeKind;
    use crate::services::error::TreeServiceError;
    use serde_json::json;

    fn entry(id: &str, kind: NodeKind, parent: Option<&str>) -> Node {
        Node::new_with_id(
            id.to_string(),
            kind,
            id.to_string(),
            parent.map(str::to_string),
            json!({}),
        )
    }

    fn linked(id: &str, parent: Option<&str>, prev: Option<&str>, next: Option<&str>) -> Node {
        entry(id, NodeKind::RemoteHost, parent)
            .with_links(prev.map(str::to_string), next.map(str::to_string))
    }

    async fn ordered_ids(store: &MemoryStore, parent: Option<&str>) -> Vec<String> {
        let snapshot = store.fetch_nodes().await.unwrap();
        let group: Vec<Node> = snapshot
            .into_iter()
            .filter(|node| node.parent_id.as_deref() == parent)
            .collect();
        order::reconstruct(group)
            .into_iter()
            .map(|node| node.id)
            .collect()
    }

    #[tokio::test]
    async fn test_create_appends_to_tail() {
        let store = MemoryStore::new();
        store
            .create_node(entry("a", NodeKind::RemoteHost, None))
            .await
            .unwrap();
        let b = store
            .create_node(entry("b", NodeKind::RemoteHost, None))
            .await
            .unwrap();

        assert_eq!(b.prev_sibling_id.as_deref(), Some("a"));
        assert!(b.next_sibling_id.is_none());
        assert_eq!(ordered_ids(&store, None).await, vec!["a", "b"]);

        let snapshot = store.fetch_nodes().await.unwrap();
        let a = snapshot.iter().find(|node| node.id == "a").unwrap();
        assert_eq!(a.next_sibling_id.as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_create_under_folder() {
        let store = MemoryStore::new();
        store
            .create_node(entry("folder", NodeKind::Folder, None))
            .await
            .unwrap();
        let child = store
            .create_node(entry("child", NodeKind::RemoteHost, Some("folder")))
            .await
            .unwrap();

        assert_eq!(child.parent_id.as_deref(), Some("folder"));
        assert!(child.prev_sibling_id.is_none());
        assert_eq!(ordered_ids(&store, Some("folder")).await, vec!["child"]);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_parents_and_duplicates() {
        let store = MemoryStore::new();
        store
            .create_node(entry("leaf", NodeKind::RemoteHost, None))
            .await
            .unwrap();

        let under_leaf = store
            .create_node(entry("x", NodeKind::RemoteHost, Some("leaf")))
            .await;
        assert!(under_leaf.is_err());

        let under_missing = store
            .create_node(entry("y", NodeKind::RemoteHost, Some("ghost")))
            .await;
        assert!(under_missing.is_err());

        let duplicate = store
            .create_node(entry("leaf", NodeKind::RemoteHost, None))
            .await;
        assert!(duplicate.is_err());
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_node() {
        let store = MemoryStore::new();
        let mut node = entry("a", NodeKind::RemoteHost, None);
        node.name = String::new();
        assert!(store.create_node(node).await.is_err());
    }

    #[tokio::test]
    async fn test_apply_move_reorders_chain() {
        let store = MemoryStore::from_nodes(vec![
            linked("a", None, None, Some("b")),
            linked("b", None, Some("a"), Some("c")),
            linked("c", None, Some("b"), None),
        ]);

        store
            .apply_move(&MoveRequest::before("c".to_string(), "a".to_string()))
            .await
            .unwrap();

        assert_eq!(ordered_ids(&store, None).await, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_apply_move_reparents() {
        let store = MemoryStore::new();
        store
            .create_node(entry("folder", NodeKind::Folder, None))
            .await
            .unwrap();
        store
            .create_node(entry("a", NodeKind::RemoteHost, None))
            .await
            .unwrap();
        store
            .create_node(entry("b", NodeKind::RemoteHost, None))
            .await
            .unwrap();

        store
            .apply_move(&MoveRequest::append(
                "a".to_string(),
                Some("folder".to_string()),
            ))
            .await
            .unwrap();

        assert_eq!(ordered_ids(&store, Some("folder")).await, vec!["a"]);
        assert_eq!(ordered_ids(&store, None).await, vec!["folder", "b"]);
    }

    #[tokio::test]
    async fn test_apply_move_rejects_cycle_and_leaves_state_alone() {
        let store = MemoryStore::new();
        store
            .create_node(entry("outer", NodeKind::Folder, None))
            .await
            .unwrap();
        store
            .create_node(entry("inner", NodeKind::Folder, Some("outer")))
            .await
            .unwrap();

        let result = store
            .apply_move(&MoveRequest::append(
                "outer".to_string(),
                Some("inner".to_string()),
            ))
            .await;
        assert!(result.is_err());
        let error = result.unwrap_err();
        assert!(matches!(
            error.downcast_ref::<TreeServiceError>(),
            Some(TreeServiceError::CircularReference { .. })
        ));

        let snapshot = store.fetch_nodes().await.unwrap();
        let outer = snapshot.iter().find(|node| node.id == "outer").unwrap();
        assert!(outer.parent_id.is_none());
    }

    #[tokio::test]
    async fn test_apply_move_bumps_modified_at() {
        let store = MemoryStore::new();
        store
            .create_node(entry("a", NodeKind::RemoteHost, None))
            .await
            .unwrap();
        let before = store.fetch_nodes().await.unwrap()[0].modified_at;

        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        store
            .apply_move(&MoveRequest::append("a".to_string(), None))
            .await
            .unwrap();

        let after = store.fetch_nodes().await.unwrap()[0].modified_at;
        assert!(after > before);
    }

    #[tokio::test]
    async fn test_delete_relinks_neighbors() {
        let store = MemoryStore::from_nodes(vec![
            linked("a", None, None, Some("b")),
            linked("b", None, Some("a"), Some("c")),
            linked("c", None, Some("b"), None),
        ]);

        let result = store.delete_node("b").await.unwrap();
        assert!(result.existed);
        assert_eq!(ordered_ids(&store, None).await, vec!["a", "c"]);

        let snapshot = store.fetch_nodes().await.unwrap();
        let a = snapshot.iter().find(|node| node.id == "a").unwrap();
        let c = snapshot.iter().find(|node| node.id == "c").unwrap();
        assert_eq!(a.next_sibling_id.as_deref(), Some("c"));
        assert_eq!(c.prev_sibling_id.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryStore::new();
        store
            .create_node(entry("a", NodeKind::RemoteHost, None))
            .await
            .unwrap();

        assert!(store.delete_node("a").await.unwrap().existed);
        assert!(!store.delete_node("a").await.unwrap().existed);
        assert!(!store.delete_node("never-there").await.unwrap().existed);
    }

    #[tokio::test]
    async fn test_delete_removes_subtree() {
        let store = MemoryStore::new();
        store
            .create_node(entry("keep", NodeKind::RemoteHost, None))
            .await
            .unwrap();
        store
            .create_node(entry("folder", NodeKind::Folder, None))
            .await
            .unwrap();
        store
            .create_node(entry("child", NodeKind::Folder, Some("folder")))
            .await
            .unwrap();
        store
            .create_node(entry("grandchild", NodeKind::RemoteHost, Some("child")))
            .await
            .unwrap();

        store.delete_node("folder").await.unwrap();

        let snapshot = store.fetch_nodes().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, "keep");
        assert!(snapshot[0].next_sibling_id.is_none());
    }

    #[tokio::test]
    async fn test_delete_terminates_on_parent_loop() {
        let store = MemoryStore::from_nodes(vec![
            entry("p", NodeKind::Folder, Some("q")),
            entry("q", NodeKind::Folder, Some("p")),
            entry("bystander", NodeKind::RemoteHost, None),
        ]);

        store.delete_node("p").await.unwrap();

        let snapshot = store.fetch_nodes().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, "bystander");
    }

    #[tokio::test]
    async fn test_rename() {
        let store = MemoryStore::new();
        store
            .create_node(entry("a", NodeKind::RemoteHost, None))
            .await
            .unwrap();

        store.rename_node("a", "renamed").await.unwrap();
        let snapshot = store.fetch_nodes().await.unwrap();
        assert_eq!(snapshot[0].name, "renamed");

        assert!(store.rename_node("ghost", "x").await.is_err());
        assert!(store.rename_node("a", "").await.is_err());
    }
}
