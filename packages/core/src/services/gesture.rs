//! Drop Gesture Resolution
//!
//! Pure translation of a pointer position over a rendered row into a move
//! intent. The resolver owns the zone thresholds so hover feedback and the
//! drop itself can never disagree: both call the same function with the
//! same inputs.
//!
//! Container rows expose three zones (before, append, after); leaf rows and
//! container rows with the modifier held expose two. The caller supplies
//! `would_cycle` (whether appending to the target would nest the dragged
//! node under itself) and an append intent degrades to invalid when it is
//! set, letting the pointer feedback warn before the move engine would
//! reject the drop.

use serde::{Deserialize, Serialize};

use crate::models::{MoveRequest, NodeKind};

/// Upper bound of the before zone on container rows.
const CONTAINER_BEFORE_MAX: f64 = 0.33;

/// Upper bound of the append zone on container rows.
const CONTAINER_APPEND_MAX: f64 = 0.66;

/// Two-zone boundary for leaf rows and modified container rows. The
/// boundary itself resolves to after.
const SPLIT_RATIO: f64 = 0.5;

/// Classified drop intent for one pointer position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DropIntent {
    /// Insert before the target row
    Before,
    /// Insert after the target row
    After,
    /// File as the target's last child
    Append,
    /// No legal drop at this position
    Invalid,
}

/// Classify a pointer position over a target row.
///
/// `pointer_ratio` is the vertical position within the row, 0.0 at the top
/// edge and 1.0 at the bottom; out-of-range values are clamped. The
/// function is pure, so calling it during hover and again at drop time
/// yields the same intent.
pub fn resolve_intent(
    pointer_ratio: f64,
    target_kind: NodeKind,
    modifier_active: bool,
    would_cycle: bool,
) -> DropIntent {
    let ratio = if pointer_ratio.is_nan() {
        SPLIT_RATIO
    } else {
        pointer_ratio.clamp(0.0, 1.0)
    };

    let intent = if target_kind.is_container() && !modifier_active {
        if ratio < CONTAINER_BEFORE_MAX {
            DropIntent::Before
        } else if ratio <= CONTAINER_APPEND_MAX {
            DropIntent::Append
        } else {
            DropIntent::After
        }
    } else if ratio < SPLIT_RATIO {
        DropIntent::Before
    } else {
        DropIntent::After
    };

    if intent == DropIntent::Append && would_cycle {
        return DropIntent::Invalid;
    }
    intent
}

/// Turn a resolved intent into a move request, or nothing when the gesture
/// cannot produce a legal move (invalid intent, or a node dropped onto
/// itself).
///
/// For before/after the destination parent is left for the move engine to
/// derive from the reference sibling.
pub fn plan_move(dragged_id: &str, target_id: &str, intent: DropIntent) -> Option<MoveRequest> {
    if dragged_id == target_id {
        return None;
    }

    match intent {
        DropIntent::Before => Some(MoveRequest::before(
            dragged_id.to_string(),
            target_id.to_string(),
        )),
        DropIntent::After => Some(MoveRequest::after(
            dragged_id.to_string(),
            target_id.to_string(),
        )),
        DropIntent::Append => Some(MoveRequest::append(
            dragged_id.to_string(),
            Some(target_id.to_string()),
        )),
        DropIntent::Invalid => None,
    }
}
