//! Business Services
//!
//! This module contains the core hierarchy logic:
//!
//! - `NodeRepository` - Snapshot index with O(1) id lookup
//! - `order` - Sibling order reconstruction from doubly linked chains
//! - `MoveEngine` - Validation and link-patch planning for moves
//! - `build_tree` - Full forest assembly from a snapshot
//! - `gesture` - Drop-gesture resolution and move planning for drag UIs
//! - `TreeService` - Store-backed orchestration and change notification
//!
//! Everything except `TreeService` is pure: functions of a snapshot with no
//! I/O, so the same inputs always produce the same answer.

pub mod error;
pub mod gesture;
pub mod move_engine;
pub mod order;
pub mod repository;
pub mod tree;
pub mod tree_service;

pub use error::TreeServiceError;
pub use gesture::{plan_move, resolve_intent, DropIntent};
pub use move_engine::{MoveEngine, MovePlan};
pub use order::reconstruct;
pub use repository::NodeRepository;
pub use tree::{build_tree, TreeNode};
pub use tree_service::TreeService;
