//! Sibling Order Reconstruction
//!
//! Rebuilds the display order of one sibling set from its pairwise
//! `prev_sibling_id` / `next_sibling_id` links. Link data arrives from
//! storage and may be arbitrarily corrupted (dangling references, broken
//! symmetry, self loops, full cycles), so reconstruction never fails: every
//! input node appears in the output exactly once, and the result is
//! identical for a given node set no matter how the input was ordered.
//!
//! # Algorithm
//!
//! 1. Collect chain heads: nodes with no `prev_sibling_id`, or whose
//!    `prev_sibling_id` points outside the set. A dangling link marks a
//!    chain boundary, not an error.
//! 2. Sort heads by the fallback key (`created_at`, then the name lowered,
//!    then id) so multiple fragments land in a stable order.
//! 3. Walk each head forward along `next_sibling_id`, marking nodes
//!    visited. A walk ends at a missing link, a link pointing outside the
//!    set, a self reference, or a node that was already emitted.
//! 4. Nodes no walk reached sit on pure cycles; append them in fallback-key
//!    order so nothing is lost.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::Node;

/// Stable sort key used whenever link data cannot decide an order.
///
/// The id component makes the key total, so nodes sharing a timestamp and a
/// name still land deterministically.
pub(crate) fn fallback_key(node: &Node) -> (DateTime<Utc>, String, String) {
    (node.created_at, node.name.to_lowercase(), node.id.clone())
}

/// Reconstruct the display order of one sibling set.
///
/// The output is a permutation of the input. Corrupted links degrade to the
/// fallback order instead of failing; recovery is logged but never surfaced
/// as an error.
pub fn reconstruct(siblings: Vec<Node>) -> Vec<Node> {
    let total = siblings.len();
    if total <= 1 {
        return siblings;
    }

    let mut order: Vec<usize> = Vec::with_capacity(total);
    let mut visited = vec![false; total];

    {
        // First occurrence wins so link walking stays well defined even if
        // a caller passes duplicate ids; later occurrences fall through to
        // the fallback tail.
        let mut index_of: HashMap<&str, usize> = HashMap::with_capacity(total);
        for (position, node) in siblings.iter().enumerate() {
            index_of.entry(node.id.as_str()).or_insert(position);
        }

        let mut dangling_links = 0usize;

        let mut heads: Vec<usize> = Vec::new();
        for (position, node) in siblings.iter().enumerate() {
            if index_of.get(node.id.as_str()) != Some(&position) {
                continue;
            }
            match node.prev_sibling_id.as_deref() {
                None => heads.push(position),
                Some(prev_id) if !index_of.contains_key(prev_id) => {
                    dangling_links += 1;
                    heads.push(position);
                }
                Some(_) => {}
            }
        }
        heads.sort_by_cached_key(|&position| fallback_key(&siblings[position]));

        for head in heads {
            if visited[head] {
                // Reachable from an earlier head through shared next links.
                continue;
            }

            let mut current = head;
            loop {
                visited[current] = true;
                order.push(current);

                let node = &siblings[current];
                let next_id = match node.next_sibling_id.as_deref() {
                    Some(next_id) => next_id,
                    None => break,
                };
                if next_id == node.id {
                    tracing::debug!(
                        "Node {} lists itself as its next sibling, ending chain walk",
                        node.id
                    );
                    break;
                }
                let next = match index_of.get(next_id) {
                    Some(&next) => next,
                    None => {
                        dangling_links += 1;
                        break;
                    }
                };
                if visited[next] {
                    // The link loops back into an already emitted node.
                    break;
                }
                current = next;
            }
        }

        if dangling_links > 0 {
            tracing::debug!(
                "{} dangling sibling links treated as chain boundaries",
                dangling_links
            );
        }
    }

    let unreached = total - order.len();
    if unreached > 0 {
        tracing::warn!(
            "{} sibling nodes were unreachable from any chain head, appending in fallback order",
            unreached
        );
        let mut leftovers: Vec<usize> = (0..total).filter(|&position| !visited[position]).collect();
        leftovers.sort_by_cached_key(|&position| fallback_key(&siblings[position]));
        order.extend(leftovers);
    }

    let mut slots: Vec<Option<Node>> = siblings.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|position| slots[position].take())
        .collect()
}
