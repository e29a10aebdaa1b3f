//! Move Requests and Link Patches
//!
//! Wire types for reparent/reposition operations. A `MoveRequest` describes
//! one move in user terms (which node, where); a `LinkPatch` describes one
//! node's resulting link mutation in storage terms. The move engine turns the
//! former into a set of the latter.

use serde::{Deserialize, Deserializer, Serialize};

use super::node::Node;

/// Where the moved node lands relative to its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MovePosition {
    /// Become the last child of the target parent
    Append,
    /// Land immediately before the reference sibling
    Before,
    /// Land immediately after the reference sibling
    After,
}

/// One reparent/reposition operation.
///
/// For `Before`/`After` the effective parent is derived from the reference
/// sibling; `new_parent_id` is advisory there and authoritative only for
/// `Append`.
///
/// # Examples
///
/// ```rust
/// use dockyard_core::models::{MovePosition, MoveRequest};
///
/// // File a node as the last child of a folder
/// let req = MoveRequest::append("host-1".to_string(), Some("folder-9".to_string()));
/// assert_eq!(req.position, MovePosition::Append);
///
/// // Place it before one of its siblings
/// let req = MoveRequest::before("host-1".to_string(), "host-2".to_string());
/// assert_eq!(req.reference_sibling_id.as_deref(), Some("host-2"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    /// Node being moved
    pub node_id: String,

    /// Destination parent (`None` means root level; authoritative for
    /// `Append` only)
    pub new_parent_id: Option<String>,

    /// Placement relative to the destination
    pub position: MovePosition,

    /// Sibling the placement is relative to (required for `Before`/`After`,
    /// ignored for `Append`)
    pub reference_sibling_id: Option<String>,
}

impl MoveRequest {
    /// Request appending `node_id` as the last child of `new_parent_id`.
    pub fn append(node_id: String, new_parent_id: Option<String>) -> Self {
        Self {
            node_id,
            new_parent_id,
            position: MovePosition::Append,
            reference_sibling_id: None,
        }
    }

    /// Request placing `node_id` immediately before `reference_sibling_id`.
    pub fn before(node_id: String, reference_sibling_id: String) -> Self {
        Self {
            node_id,
            new_parent_id: None,
            position: MovePosition::Before,
            reference_sibling_id: Some(reference_sibling_id),
        }
    }

    /// Request placing `node_id` immediately after `reference_sibling_id`.
    pub fn after(node_id: String, reference_sibling_id: String) -> Self {
        Self {
            node_id,
            new_parent_id: None,
            position: MovePosition::After,
            reference_sibling_id: Some(reference_sibling_id),
        }
    }
}

/// Custom deserializer for optional fields that accepts both plain values and
/// nested Options
///
/// Maps three input formats to the double-Option pattern:
/// - Missing field -> None (don't update)
/// - null -> Some(None) (clear the reference)
/// - "value" -> Some(Some("value")) (set the reference)
fn deserialize_optional_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    // Missing field is handled by #[serde(default)] on the struct field
    Ok(Some(Option::<T>::deserialize(deserializer)?))
}

/// One node's link mutation within a move plan.
///
/// # Double-Option Pattern
///
/// Each field distinguishes three states:
///
/// - `None`: leave the link untouched
/// - `Some(None)`: clear the link
/// - `Some(Some(id))`: point the link at `id`
///
/// # Examples
///
/// ```rust
/// # use dockyard_core::models::LinkPatch;
/// // Detach a node from its old neighborhood and file it under a new parent
/// let patch = LinkPatch::new("host-1".to_string())
///     .parent(Some("folder-2".to_string()))
///     .prev(Some("host-9".to_string()))
///     .next(None);
/// assert_eq!(patch.next_sibling_id, Some(None));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkPatch {
    /// Node whose links change
    pub node_id: String,

    /// Parent link change
    ///
    /// - `None`: don't change `parent_id`
    /// - `Some(None)`: move to root level
    /// - `Some(Some(id))`: file under `id`
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub parent_id: Option<Option<String>>,

    /// Previous-sibling link change (same three states)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub prev_sibling_id: Option<Option<String>>,

    /// Next-sibling link change (same three states)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub next_sibling_id: Option<Option<String>>,
}

impl LinkPatch {
    /// Create an empty patch for `node_id`.
    pub fn new(node_id: String) -> Self {
        Self {
            node_id,
            ..Default::default()
        }
    }

    /// Set the parent link (builder style).
    pub fn parent(mut self, parent_id: Option<String>) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Set the previous-sibling link (builder style).
    pub fn prev(mut self, prev_sibling_id: Option<String>) -> Self {
        self.prev_sibling_id = Some(prev_sibling_id);
        self
    }

    /// Set the next-sibling link (builder style).
    pub fn next(mut self, next_sibling_id: Option<String>) -> Self {
        self.next_sibling_id = Some(next_sibling_id);
        self
    }

    /// Check if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.parent_id.is_none() && self.prev_sibling_id.is_none() && self.next_sibling_id.is_none()
    }

    /// Fold another patch for the same node into this one.
    ///
    /// Later assignments win field by field.
    pub fn merge(&mut self, other: LinkPatch) {
        if let Some(parent_id) = other.parent_id {
            self.parent_id = Some(parent_id);
        }
        if let Some(prev_sibling_id) = other.prev_sibling_id {
            self.prev_sibling_id = Some(prev_sibling_id);
        }
        if let Some(next_sibling_id) = other.next_sibling_id {
            self.next_sibling_id = Some(next_sibling_id);
        }
    }

    /// Apply the patch to a node's link fields.
    ///
    /// Timestamps are left alone; the store decides whose `modified_at`
    /// a move bumps.
    pub fn apply_to(&self, node: &mut Node) {
        if let Some(parent_id) = &self.parent_id {
            node.parent_id = parent_id.clone();
        }
        if let Some(prev_sibling_id) = &self.prev_sibling_id {
            node.prev_sibling_id = prev_sibling_id.clone();
        }
        if let Some(next_sibling_id) = &self.next_sibling_id {
            node.next_sibling_id = next_sibling_id.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NodeKind;
    use serde_json::json;

    #[test]
    fn test_request_constructors() {
        let req = MoveRequest::append("n1".to_string(), None);
        assert_eq!(req.position, MovePosition::Append);
        assert!(req.new_parent_id.is_none());
        assert!(req.reference_sibling_id.is_none());

        let req = MoveRequest::before("n1".to_string(), "n2".to_string());
        assert_eq!(req.position, MovePosition::Before);
        assert_eq!(req.reference_sibling_id.as_deref(), Some("n2"));

        let req = MoveRequest::after("n1".to_string(), "n2".to_string());
        assert_eq!(req.position, MovePosition::After);
    }

    #[test]
    fn test_request_wire_format() {
        let req = MoveRequest::append("n1".to_string(), Some("p1".to_string()));
        let value = serde_json::to_value(&req).expect("serialize");
        assert_eq!(value.get("nodeId"), Some(&json!("n1")));
        assert_eq!(value.get("newParentId"), Some(&json!("p1")));
        assert_eq!(value.get("position"), Some(&json!("append")));
        assert_eq!(value.get("referenceSiblingId"), Some(&json!(null)));
    }

    #[test]
    fn test_patch_three_states_deserialization() {
        // Missing field: leave untouched
        let patch: LinkPatch = serde_json::from_value(json!({ "nodeId": "n1" })).expect("parse");
        assert!(patch.prev_sibling_id.is_none());

        // Explicit null: clear
        let patch: LinkPatch =
            serde_json::from_value(json!({ "nodeId": "n1", "prevSiblingId": null }))
                .expect("parse");
        assert_eq!(patch.prev_sibling_id, Some(None));

        // Plain value: set
        let patch: LinkPatch =
            serde_json::from_value(json!({ "nodeId": "n1", "prevSiblingId": "n2" }))
                .expect("parse");
        assert_eq!(patch.prev_sibling_id, Some(Some("n2".to_string())));
    }

    #[test]
    fn test_patch_merge_field_by_field() {
        let mut patch = LinkPatch::new("n1".to_string()).prev(Some("a".to_string()));
        patch.merge(LinkPatch::new("n1".to_string()).next(None));
        assert_eq!(patch.prev_sibling_id, Some(Some("a".to_string())));
        assert_eq!(patch.next_sibling_id, Some(None));

        // Later prev assignment wins
        patch.merge(LinkPatch::new("n1".to_string()).prev(None));
        assert_eq!(patch.prev_sibling_id, Some(None));
    }

    #[test]
    fn test_patch_apply_to_node() {
        let mut node = Node::new(NodeKind::RemoteHost, "n1".to_string(), None, json!({}))
            .with_links(Some("old-prev".to_string()), Some("old-next".to_string()));

        let patch = LinkPatch::new(node.id.clone())
            .parent(Some("folder".to_string()))
            .prev(None);
        patch.apply_to(&mut node);

        assert_eq!(node.parent_id.as_deref(), Some("folder"));
        assert!(node.prev_sibling_id.is_none());
        // Untouched field keeps its old value
        assert_eq!(node.next_sibling_id.as_deref(), Some("old-next"));
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(LinkPatch::new("n1".to_string()).is_empty());
        assert!(!LinkPatch::new("n1".to_string()).prev(None).is_empty());
    }
}
