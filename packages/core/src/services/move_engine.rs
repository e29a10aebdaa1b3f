//! Move Planning
//!
//! Turns a `MoveRequest` into the exact set of link mutations that realizes
//! it, or a typed error explaining why the move is unsafe. Planning never
//! mutates anything: the resulting `MovePlan` is handed to the authoritative
//! store, which applies it (or refuses) as one atomic unit.
//!
//! Validation happens in a fixed order: the moved node must exist, the
//! placement must be coherent (reference sibling for before/after, container
//! parent for append), and the effective destination parent must not sit
//! inside the moved node's own subtree. Only then are patches computed:
//! first the detach of the node from its current neighborhood, then the
//! splice at the destination, expressed against the post-detach chain state.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::models::{LinkPatch, MovePosition, MoveRequest, Node};
use crate::services::error::TreeServiceError;
use crate::services::order;
use crate::services::repository::NodeRepository;

/// A validated move and the link mutations that realize it.
///
/// `request` is the normalized form: the effective parent is resolved (for
/// before/after it comes from the reference sibling) and the reference is
/// cleared for append. `patches` are sorted by node id and conceptually
/// atomic: either all of them apply or none do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    /// Normalized request, suitable for submission to the store
    pub request: MoveRequest,
    /// Link mutations, one patch per affected node
    pub patches: Vec<LinkPatch>,
}

/// Plans reparent/reposition operations against one snapshot.
pub struct MoveEngine<'a> {
    repo: &'a NodeRepository,
}

impl<'a> MoveEngine<'a> {
    /// Create an engine over the given snapshot index.
    pub fn new(repo: &'a NodeRepository) -> Self {
        Self { repo }
    }

    /// Validate a move and compute its link patches.
    ///
    /// # Errors
    ///
    /// - `NodeNotFound` if the moved node, the reference sibling, or the
    ///   append parent is absent from the snapshot
    /// - `SelfReference` if the reference sibling is the moved node itself
    /// - `InvalidPosition` if before/after placement arrives without a
    ///   reference sibling
    /// - `InvalidParent` if the append target is not a container kind
    /// - `CircularReference` if the destination parent lies inside the
    ///   moved node's subtree
    ///
    /// On error no patches are produced and nothing may be applied.
    pub fn plan(&self, request: &MoveRequest) -> Result<MovePlan, TreeServiceError> {
        let moving = self
            .repo
            .get(&request.node_id)
            .ok_or_else(|| TreeServiceError::node_not_found(&request.node_id))?;

        let (effective_parent, reference) = match request.position {
            MovePosition::Append => {
                if let Some(parent_id) = request.new_parent_id.as_deref() {
                    let parent = self
                        .repo
                        .get(parent_id)
                        .ok_or_else(|| TreeServiceError::node_not_found(parent_id))?;
                    if !parent.kind.is_container() {
                        return Err(TreeServiceError::invalid_parent(parent_id));
                    }
                }
                (request.new_parent_id.clone(), None)
            }
            MovePosition::Before | MovePosition::After => {
                let reference_id = request.reference_sibling_id.as_deref().ok_or_else(|| {
                    TreeServiceError::invalid_position(
                        "before/after placement requires a reference sibling",
                    )
                })?;
                if reference_id == request.node_id {
                    return Err(TreeServiceError::self_reference(&request.node_id));
                }
                let reference = self
                    .repo
                    .get(reference_id)
                    .ok_or_else(|| TreeServiceError::node_not_found(reference_id))?;
                // The caller's new_parent_id is advisory here; the reference
                // sibling decides where the node actually lands.
                (reference.parent_id.clone(), Some(reference.clone()))
            }
        };

        if let Some(parent_id) = effective_parent.as_deref() {
            if self.repo.is_descendant_or_self(parent_id, &request.node_id) {
                return Err(TreeServiceError::circular_reference(
                    &request.node_id,
                    parent_id,
                ));
            }
        }

        let mut merged: BTreeMap<String, LinkPatch> = BTreeMap::new();
        for patch in self.detach_patches(moving) {
            merge_patch(&mut merged, patch);
        }

        let splice = match (request.position, reference.as_ref()) {
            (MovePosition::Append, _) => self.append_patches(moving, effective_parent.as_deref()),
            (MovePosition::Before, Some(reference)) => {
                self.splice_before(moving, reference, effective_parent.as_deref())
            }
            (MovePosition::After, Some(reference)) => {
                self.splice_after(moving, reference, effective_parent.as_deref())
            }
            // Before/After without a reference was rejected above.
            _ => Vec::new(),
        };
        for patch in splice {
            merge_patch(&mut merged, patch);
        }

        let patches: Vec<LinkPatch> = merged.into_values().collect();
        tracing::debug!(
            "Planned move of {} to parent {:?} with {} link patches",
            request.node_id,
            effective_parent,
            patches.len()
        );

        Ok(MovePlan {
            request: MoveRequest {
                node_id: request.node_id.clone(),
                new_parent_id: effective_parent,
                position: request.position,
                reference_sibling_id: reference.map(|node| node.id),
            },
            patches,
        })
    }

    /// Resolve a raw link to an existing node id, treating excluded and
    /// dangling targets as absent.
    fn resolve_neighbor(&self, link: Option<&str>, exclude: &[&str]) -> Option<String> {
        let id = link?;
        if exclude.contains(&id) || !self.repo.contains(id) {
            return None;
        }
        Some(id.to_string())
    }

    /// Patches that lift the moving node out of its current neighborhood by
    /// joining its former neighbors to each other.
    fn detach_patches(&self, moving: &Node) -> Vec<LinkPatch> {
        let moving_id = moving.id.as_str();
        let prev = self.resolve_neighbor(moving.prev_sibling_id.as_deref(), &[moving_id]);
        let next = self.resolve_neighbor(moving.next_sibling_id.as_deref(), &[moving_id]);

        let mut patches = Vec::new();
        if let Some(prev_id) = &prev {
            let new_next = next.clone().filter(|id| id != prev_id);
            patches.push(LinkPatch::new(prev_id.clone()).next(new_next));
        }
        if let Some(next_id) = &next {
            let new_prev = prev.clone().filter(|id| id != next_id);
            patches.push(LinkPatch::new(next_id.clone()).prev(new_prev));
        }
        patches
    }

    /// The reference sibling's previous neighbor once the moving node has
    /// been lifted out.
    fn post_detach_prev(&self, reference: &Node, moving: &Node) -> Option<String> {
        let raw = match reference.prev_sibling_id.as_deref() {
            Some(prev_id) if prev_id == moving.id => moving.prev_sibling_id.as_deref(),
            other => other,
        };
        self.resolve_neighbor(raw, &[moving.id.as_str(), reference.id.as_str()])
    }

    /// The reference sibling's next neighbor once the moving node has been
    /// lifted out.
    fn post_detach_next(&self, reference: &Node, moving: &Node) -> Option<String> {
        let raw = match reference.next_sibling_id.as_deref() {
            Some(next_id) if next_id == moving.id => moving.next_sibling_id.as_deref(),
            other => other,
        };
        self.resolve_neighbor(raw, &[moving.id.as_str(), reference.id.as_str()])
    }

    fn splice_before(
        &self,
        moving: &Node,
        reference: &Node,
        parent: Option<&str>,
    ) -> Vec<LinkPatch> {
        let left = self.post_detach_prev(reference, moving);

        let mut patches = vec![
            LinkPatch::new(moving.id.clone())
                .parent(parent.map(str::to_string))
                .prev(left.clone())
                .next(Some(reference.id.clone())),
            LinkPatch::new(reference.id.clone()).prev(Some(moving.id.clone())),
        ];
        if let Some(left_id) = left {
            patches.push(LinkPatch::new(left_id).next(Some(moving.id.clone())));
        }
        patches
    }

    fn splice_after(
        &self,
        moving: &Node,
        reference: &Node,
        parent: Option<&str>,
    ) -> Vec<LinkPatch> {
        let right = self.post_detach_next(reference, moving);

        let mut patches = vec![
            LinkPatch::new(moving.id.clone())
                .parent(parent.map(str::to_string))
                .prev(Some(reference.id.clone()))
                .next(right.clone()),
            LinkPatch::new(reference.id.clone()).next(Some(moving.id.clone())),
        ];
        if let Some(right_id) = right {
            patches.push(LinkPatch::new(right_id).prev(Some(moving.id.clone())));
        }
        patches
    }

    /// Patches that land the moving node at the tail of the destination
    /// group. The tail is derived by reconstructing the destination order
    /// with the moving node excluded, so a same-parent append works too.
    fn append_patches(&self, moving: &Node, parent: Option<&str>) -> Vec<LinkPatch> {
        let mut group = self.repo.sibling_group(parent);
        group.retain(|node| node.id != moving.id);
        let ordered = order::reconstruct(group);
        let tail = ordered.last().map(|node| node.id.clone());

        let mut patches = vec![LinkPatch::new(moving.id.clone())
            .parent(parent.map(str::to_string))
            .prev(tail.clone())
            .next(None)];
        if let Some(tail_id) = tail {
            patches.push(LinkPatch::new(tail_id).next(Some(moving.id.clone())));
        }
        patches
    }
}

fn merge_patch(merged: &mut BTreeMap<String, LinkPatch>, patch: LinkPatch) {
    match merged.entry(patch.node_id.clone()) {
        Entry::Occupied(mut entry) => entry.get_mut().merge(patch),
        Entry::Vacant(entry) => {
            entry.insert(patch);
        }
    }
}
