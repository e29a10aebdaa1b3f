//! Comprehensive tests for TreeService
//!
//! Tests cover:
//! - Ordered reads (children, tree) through the service
//! - Move orchestration: client-side planning, store submission, events
//! - Create/delete/rename flows and their event semantics

#[cfg(test)]
mod tests {
    use crate::models::{MoveRequest, Node, NodeKind};
    use crate::services::error::TreeServiceError;
    use crate::services::TreeService;
    use crate::store::{MemoryStore, TreeEvent};
    use serde_json::json;
    use std::sync::Arc;

    /// Helper to create a service over an empty in-memory store
    fn create_test_service() -> TreeService {
        TreeService::new(Arc::new(MemoryStore::new()))
    }

    fn entry(id: &str, kind: NodeKind, parent: Option<&str>) -> Node {
        Node::new_with_id(
            id.to_string(),
            kind,
            id.to_string(),
            parent.map(str::to_string),
            json!({}),
        )
    }

    async fn child_ids(service: &TreeService, parent: Option<&str>) -> Vec<String> {
        service
            .children(parent)
            .await
            .unwrap()
            .into_iter()
            .map(|node| node.id)
            .collect()
    }

    #[tokio::test]
    async fn test_create_then_read_ordered_children() {
        let service = create_test_service();

        service
            .create_node(entry("a", NodeKind::RemoteHost, None))
            .await
            .unwrap();
        service
            .create_node(entry("b", NodeKind::RemoteHost, None))
            .await
            .unwrap();
        service
            .create_node(entry("c", NodeKind::RemoteHost, None))
            .await
            .unwrap();

        assert_eq!(child_ids(&service, None).await, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_create_returns_final_links_and_emits() {
        let service = create_test_service();
        service
            .create_node(entry("a", NodeKind::RemoteHost, None))
            .await
            .unwrap();

        let mut rx = service.subscribe_to_events();
        let created = service
            .create_node(entry("b", NodeKind::RemoteHost, None))
            .await
            .unwrap();
        assert_eq!(created.prev_sibling_id.as_deref(), Some("a"));

        match rx.try_recv().unwrap() {
            TreeEvent::NodeCreated(node) => {
                assert_eq!(node.id, "b");
                assert_eq!(node.prev_sibling_id.as_deref(), Some("a"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_move_before_updates_order_and_emits() {
        let service = create_test_service();
        service
            .create_node(entry("a", NodeKind::RemoteHost, None))
            .await
            .unwrap();
        service
            .create_node(entry("b", NodeKind::RemoteHost, None))
            .await
            .unwrap();

        let mut rx = service.subscribe_to_events();
        service
            .move_node(MoveRequest::before("b".to_string(), "a".to_string()))
            .await
            .unwrap();

        assert_eq!(child_ids(&service, None).await, vec!["b", "a"]);

        match rx.try_recv().unwrap() {
            TreeEvent::NodeMoved { id, new_parent_id } => {
                assert_eq!(id, "b");
                assert_eq!(new_parent_id, None);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(rx.try_recv().is_err(), "exactly one event expected");
    }

    #[tokio::test]
    async fn test_append_into_folder_emits_effective_parent() {
        let service = create_test_service();
        service
            .create_node(entry("folder", NodeKind::Folder, None))
            .await
            .unwrap();
        service
            .create_node(entry("a", NodeKind::RemoteHost, None))
            .await
            .unwrap();

        let mut rx = service.subscribe_to_events();
        service
            .move_node(MoveRequest::append(
                "a".to_string(),
                Some("folder".to_string()),
            ))
            .await
            .unwrap();

        assert_eq!(child_ids(&service, Some("folder")).await, vec!["a"]);
        assert_eq!(child_ids(&service, None).await, vec!["folder"]);

        match rx.try_recv().unwrap() {
            TreeEvent::NodeMoved { id, new_parent_id } => {
                assert_eq!(id, "a");
                assert_eq!(new_parent_id.as_deref(), Some("folder"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_move_emits_nothing_and_changes_nothing() {
        let service = create_test_service();
        service
            .create_node(entry("a", NodeKind::RemoteHost, None))
            .await
            .unwrap();

        let mut rx = service.subscribe_to_events();
        let result = service
            .move_node(MoveRequest::before("ghost".to_string(), "a".to_string()))
            .await;

        assert!(matches!(
            result,
            Err(TreeServiceError::NodeNotFound { .. })
        ));
        assert!(rx.try_recv().is_err(), "no event for a rejected move");
        assert_eq!(child_ids(&service, None).await, vec!["a"]);
    }

    #[tokio::test]
    async fn test_cycle_rejected_before_reaching_store() {
        let service = create_test_service();
        service
            .create_node(entry("outer", NodeKind::Folder, None))
            .await
            .unwrap();
        service
            .create_node(entry("inner", NodeKind::Folder, Some("outer")))
            .await
            .unwrap();

        // A typed CircularReference proves client-side planning caught it;
        // store rejections surface as Transport.
        let result = service
            .move_node(MoveRequest::append(
                "outer".to_string(),
                Some("inner".to_string()),
            ))
            .await;
        assert!(matches!(
            result,
            Err(TreeServiceError::CircularReference { .. })
        ));

        assert_eq!(child_ids(&service, None).await, vec!["outer"]);
        assert_eq!(child_ids(&service, Some("outer")).await, vec!["inner"]);
    }

    #[tokio::test]
    async fn test_tree_nests_children() {
        let service = create_test_service();
        service
            .create_node(entry("folder", NodeKind::Folder, None))
            .await
            .unwrap();
        service
            .create_node(entry("leaf", NodeKind::RemoteHost, None))
            .await
            .unwrap();
        service
            .create_node(entry("child", NodeKind::LocalEndpoint, Some("folder")))
            .await
            .unwrap();

        let roots = service.tree().await.unwrap();
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0].node.id, "folder");
        assert_eq!(roots[0].children.len(), 1);
        assert_eq!(roots[0].children[0].node.id, "child");
        assert_eq!(roots[1].node.id, "leaf");
    }

    #[tokio::test]
    async fn test_delete_event_only_when_existed() {
        let service = create_test_service();
        service
            .create_node(entry("a", NodeKind::RemoteHost, None))
            .await
            .unwrap();

        let mut rx = service.subscribe_to_events();

        let first = service.delete_node("a").await.unwrap();
        assert!(first.existed);
        match rx.try_recv().unwrap() {
            TreeEvent::NodeDeleted { id } => assert_eq!(id, "a"),
            other => panic!("unexpected event: {:?}", other),
        }

        let second = service.delete_node("a").await.unwrap();
        assert!(!second.existed);
        assert!(rx.try_recv().is_err(), "no event when nothing was deleted");
    }

    #[tokio::test]
    async fn test_rename_updates_and_emits() {
        let service = create_test_service();
        service
            .create_node(entry("a", NodeKind::RemoteHost, None))
            .await
            .unwrap();

        let mut rx = service.subscribe_to_events();
        service.rename_node("a", "renamed").await.unwrap();

        let children = service.children(None).await.unwrap();
        assert_eq!(children[0].name, "renamed");

        match rx.try_recv().unwrap() {
            TreeEvent::NodeRenamed { id, name } => {
                assert_eq!(id, "a");
                assert_eq!(name, "renamed");
            }
            other => panic!("unexpected event: {:?}", other),
        }

        let missing = service.rename_node("ghost", "x").await;
        assert!(matches!(missing, Err(TreeServiceError::Transport(_))));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_snapshot_indexes_nodes() {
        let service = create_test_service();
        service
            .create_node(entry("a", NodeKind::RemoteHost, None))
            .await
            .unwrap();

        let repo = service.snapshot().await.unwrap();
        assert_eq!(repo.len(), 1);
        assert!(repo.get("a").is_some());
        assert!(repo.get("ghost").is_none());
    }
}
