//! Materialized Tree Assembly
//!
//! Builds the renderable forest out of one snapshot: every sibling set is
//! put through order reconstruction, and parent links decide nesting. The
//! builder shares the reconstructor's tolerance contract: no input shape
//! may crash it or drop a node. Children of a missing parent and nodes
//! trapped in parent reference loops are promoted to the root level in a
//! deterministic position instead of disappearing.
//!
//! Traversal uses an explicit work stack with a visited set, so depth is
//! bounded by memory rather than the call stack and corrupted parent loops
//! terminate.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::models::Node;
use crate::services::order;
use crate::services::repository::NodeRepository;

/// One node of the materialized tree, children in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    /// The node itself
    pub node: Node,
    /// Reconstructed children, recursively assembled
    pub children: Vec<TreeNode>,
}

/// Assemble the display forest for a snapshot.
///
/// Top-level entries appear in this order: the root sibling group
/// (reconstructed), then the children of each missing parent (groups keyed
/// by the absent id, ascending), then nodes rescued from parent loops in
/// fallback-key order. Every node of the snapshot appears exactly once.
pub fn build_tree(repo: &NodeRepository) -> Vec<TreeNode> {
    let mut top_ids: Vec<String> = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut visit_order: Vec<String> = Vec::new();
    let mut child_order: HashMap<String, Vec<String>> = HashMap::new();

    let mut seeds: Vec<String> = order::reconstruct(repo.sibling_group(None))
        .into_iter()
        .map(|node| node.id)
        .collect();

    let orphan_parents = repo.dangling_parent_ids();
    if !orphan_parents.is_empty() {
        tracing::warn!(
            "{} parent ids are missing from the snapshot, promoting their children to the root level",
            orphan_parents.len()
        );
        for parent_id in &orphan_parents {
            seeds.extend(
                order::reconstruct(repo.sibling_group(Some(parent_id)))
                    .into_iter()
                    .map(|node| node.id),
            );
        }
    }

    for seed in seeds {
        if traverse(repo, &seed, &mut visited, &mut visit_order, &mut child_order) {
            top_ids.push(seed);
        }
    }

    // Anything still unvisited hangs on a parent reference loop. Seeding new
    // roots in fallback order keeps those nodes visible; the visited guard
    // cuts the looping edge during traversal.
    let mut trapped: Vec<Node> = repo
        .nodes()
        .filter(|node| !visited.contains(&node.id))
        .cloned()
        .collect();
    if !trapped.is_empty() {
        tracing::warn!(
            "{} nodes are trapped in parent reference loops, promoting to the root level",
            trapped.len()
        );
        trapped.sort_by_cached_key(order::fallback_key);
        for seed in trapped {
            if traverse(
                repo,
                &seed.id,
                &mut visited,
                &mut visit_order,
                &mut child_order,
            ) {
                top_ids.push(seed.id);
            }
        }
    }

    // Assemble bottom-up over the reversed visit order: children are always
    // built before their parent claims them. An edge that loops back to an
    // ancestor finds nothing to claim and drops out here.
    let mut built: HashMap<String, TreeNode> = HashMap::new();
    for id in visit_order.iter().rev() {
        let node = match repo.get(id) {
            Some(node) => node,
            None => continue,
        };
        let children: Vec<TreeNode> = child_order
            .get(id)
            .map(|child_ids| {
                child_ids
                    .iter()
                    .filter_map(|child_id| built.remove(child_id))
                    .collect()
            })
            .unwrap_or_default();
        built.insert(
            id.clone(),
            TreeNode {
                node: node.clone(),
                children,
            },
        );
    }

    top_ids
        .into_iter()
        .filter_map(|id| built.remove(&id))
        .collect()
}

/// Preorder walk from one seed. Returns whether the seed was still
/// unvisited and therefore forms a new top-level entry.
fn traverse(
    repo: &NodeRepository,
    seed: &str,
    visited: &mut HashSet<String>,
    visit_order: &mut Vec<String>,
    child_order: &mut HashMap<String, Vec<String>>,
) -> bool {
    if visited.contains(seed) {
        return false;
    }

    let mut stack: Vec<String> = vec![seed.to_string()];
    while let Some(id) = stack.pop() {
        if !visited.insert(id.clone()) {
            continue;
        }
        visit_order.push(id.clone());

        let children: Vec<String> = order::reconstruct(repo.sibling_group(Some(&id)))
            .into_iter()
            .map(|child| child.id)
            .collect();
        for child_id in children.iter().rev() {
            stack.push(child_id.clone());
        }
        child_order.insert(id.clone(), children);
    }
    true
}
