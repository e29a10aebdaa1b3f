//! Node Repository
//!
//! Per-snapshot index over a flat node list. The repository is built once
//! from each fetched snapshot, queried while that snapshot is displayed, and
//! discarded on the next fetch. It owns id lookup, the parent grouping, and
//! the ancestor walk used for cycle prevention; nothing else in the crate
//! scans the node list directly.

use std::collections::{HashMap, HashSet};

use crate::models::Node;

/// Index over one hierarchy snapshot.
///
/// Lookup by id is O(1). Groupings are computed at construction so repeated
/// sibling-set queries stay cheap while a snapshot is live.
#[derive(Debug, Clone)]
pub struct NodeRepository {
    nodes: HashMap<String, Node>,
    groups: HashMap<Option<String>, Vec<String>>,
}

impl NodeRepository {
    /// Build the index from a flat snapshot.
    ///
    /// Duplicate ids should not occur in a well-formed snapshot; if they do,
    /// the last occurrence wins and the collision is logged.
    pub fn from_snapshot(snapshot: Vec<Node>) -> Self {
        let mut nodes: HashMap<String, Node> = HashMap::with_capacity(snapshot.len());
        let mut duplicates = 0usize;

        for node in snapshot {
            if nodes.insert(node.id.clone(), node).is_some() {
                duplicates += 1;
            }
        }

        if duplicates > 0 {
            tracing::debug!(
                "Snapshot contained {} duplicate node ids, keeping the last occurrence of each",
                duplicates
            );
        }

        let mut groups: HashMap<Option<String>, Vec<String>> = HashMap::new();
        for node in nodes.values() {
            groups
                .entry(node.parent_id.clone())
                .or_default()
                .push(node.id.clone());
        }

        Self { nodes, groups }
    }

    /// Look up a node by id.
    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Check whether a node id exists in this snapshot.
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of nodes in the snapshot.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all nodes, in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Clone the sibling set filed under `parent_id` (`None` for the root
    /// level), in no particular order.
    ///
    /// Nodes whose `parent_id` names a missing node still form a group under
    /// that id; `dangling_parent_ids` enumerates those groups.
    pub fn sibling_group(&self, parent_id: Option<&str>) -> Vec<Node> {
        self.groups
            .get(&parent_id.map(str::to_string))
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.nodes.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Parent ids referenced by some node but absent from the snapshot,
    /// sorted for deterministic iteration.
    pub fn dangling_parent_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .groups
            .keys()
            .filter_map(|key| key.as_deref())
            .filter(|parent_id| !self.nodes.contains_key(*parent_id))
            .map(str::to_string)
            .collect();
        ids.sort();
        ids
    }

    /// Whether `descendant_id` lies in `ancestor_id`'s subtree, the node
    /// itself included.
    ///
    /// Walks `parent_id` links upward from `descendant_id`. A visited set
    /// bounds the walk, so corrupted parent cycles terminate (and answer
    /// `false` once the cycle closes without meeting `ancestor_id`).
    pub fn is_descendant_or_self(&self, descendant_id: &str, ancestor_id: &str) -> bool {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut current = descendant_id;

        loop {
            if current == ancestor_id {
                return true;
            }
            if !visited.insert(current) {
                tracing::debug!(
                    "Parent chain starting at {} loops back through {}, stopping ancestor walk",
                    descendant_id,
                    current
                );
                return false;
            }
            match self.nodes.get(current).and_then(|node| node.parent_id.as_deref()) {
                Some(parent_id) => current = parent_id,
                None => return false,
            }
        }
    }
}
