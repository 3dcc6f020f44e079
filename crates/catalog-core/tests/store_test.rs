// Entity store behavior through the controller: fetch, create, update,
// destroy, ordering, and "no mutation on failure".
#![allow(clippy::unwrap_used)]

mod support;

use pretty_assertions::assert_eq;

use catalog_core::{
    CategoryId, CoreError, CreateItemRequest, EntityKind, EntityRef, ImageId, ItemId,
    Notification, SessionTarget, UpdateCategoryRequest, UpdateItemRequest,
};
use support::{Call, FakeServer, ME, SOMEONE_ELSE, connected, drain, transport_error};

fn item_ids(items: &[std::sync::Arc<catalog_core::Item>]) -> Vec<i64> {
    items.iter().map(|i| i.id.get()).collect()
}

#[tokio::test]
async fn connect_loads_sorted_collections() {
    let server = FakeServer::new();
    server.seed_category(1, "soccer", ME);
    server.seed_category(2, "Baseball", SOMEONE_ELSE);
    server.seed_item(12, 1, ME, None);
    server.seed_item(11, 2, ME, None);

    let controller = connected(&server).await;

    let names: Vec<String> = controller
        .categories_snapshot()
        .iter()
        .map(|c| c.name.clone())
        .collect();
    assert_eq!(names, vec!["Baseball", "soccer"]);
    assert_eq!(item_ids(&controller.items_snapshot()), vec![11, 12]);
    assert!(controller.store().last_full_refresh().is_some());
}

#[tokio::test]
async fn failed_refresh_leaves_state_unchanged() {
    let server = FakeServer::new();
    server.seed_category(1, "A", ME);
    server.seed_item(5, 1, ME, None);
    let controller = connected(&server).await;

    server.seed_category(2, "B", ME);
    server.seed_item(6, 2, ME, None);
    server.fail_next(Call::ListItems, transport_error(503));
    let mut rx = controller.subscribe();

    let err = controller.refresh().await.unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert_eq!(controller.store().category_count(), 1);
    assert_eq!(item_ids(&controller.items_snapshot()), vec![5]);
    let seen = drain(&mut rx);
    assert_eq!(seen.len(), 1);
    assert!(matches!(seen[0], Notification::OperationFailed { .. }));
}

#[tokio::test]
async fn fetch_all_replaces_one_collection() {
    let server = FakeServer::new();
    server.seed_category(1, "A", ME);
    let controller = connected(&server).await;
    server.seed_item(7, 1, ME, None);
    let mut rx = controller.subscribe();

    controller.fetch_all(EntityKind::Item).await.unwrap();

    assert_eq!(item_ids(&controller.items_snapshot()), vec![7]);
    assert_eq!(drain(&mut rx), vec![Notification::Reset(EntityKind::Item)]);
}

#[tokio::test]
async fn create_then_partial_update_keeps_category() {
    let server = FakeServer::new();
    server.seed_category(3, "Hockey", ME);
    let controller = connected(&server).await;
    let mut rx = controller.subscribe();

    let created = controller
        .create_item(&CreateItemRequest {
            name: "Stick".into(),
            description: "carbon".into(),
            category_id: CategoryId(3),
            image_id: None,
        })
        .await
        .unwrap();

    let updated = controller
        .update_item(
            created.id,
            &UpdateItemRequest {
                description: Some("wooden".into()),
                ..UpdateItemRequest::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.category_id, CategoryId(3));
    assert_eq!(updated.name, "Stick");
    assert_eq!(updated.description, "wooden");
    assert_eq!(controller.store().item_by_id(created.id).unwrap().description, "wooden");
    assert_eq!(
        drain(&mut rx),
        vec![
            Notification::Added(EntityRef::Item(created.id)),
            Notification::Changed(EntityRef::Item(created.id)),
        ]
    );
}

#[tokio::test]
async fn sparse_update_echo_keeps_unsubmitted_fields() {
    let server = FakeServer::new();
    server.seed_category(1, "A", ME);
    server.seed_item(4, 1, ME, Some(40));
    let controller = connected(&server).await;
    server.echo_sparsely();

    let updated = controller
        .update_item(
            ItemId(4),
            &UpdateItemRequest {
                name: Some("Renamed".into()),
                ..UpdateItemRequest::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.description, "about 4");
    assert_eq!(updated.image_id, Some(ImageId(40)));
    assert_eq!(updated.image_url.as_deref(), Some("/static/images/40.png"));
    assert_eq!(updated.owner_id, Some(ME));

    // Still ours to edit.
    controller.begin_edit(SessionTarget::Existing(ItemId(4))).unwrap();
}

#[tokio::test]
async fn sparse_save_echo_keeps_owner_and_image() {
    let server = FakeServer::new();
    server.seed_category(1, "A", ME);
    server.seed_item(4, 1, ME, Some(40));
    let controller = connected(&server).await;
    server.echo_sparsely();

    controller.begin_edit(SessionTarget::Existing(ItemId(4))).unwrap();
    controller
        .edit_draft(|draft| draft.description = "waxed".into())
        .unwrap();
    let saved = controller.save_item().await.unwrap();

    assert_eq!(saved.description, "waxed");
    assert_eq!(saved.image_id, Some(ImageId(40)));
    assert_eq!(saved.owner_id, Some(ME));
    assert_eq!(controller.store().item_by_id(ItemId(4)).unwrap().owner_id, Some(ME));
}

#[tokio::test]
async fn sparse_category_echo_keeps_owner_and_selected_flag() {
    let server = FakeServer::new();
    server.seed_category(1, "A", ME);
    let controller = connected(&server).await;
    controller.select_category(Some(CategoryId(1))).unwrap();
    server.echo_sparsely();

    let updated = controller
        .update_category(
            CategoryId(1),
            &UpdateCategoryRequest {
                name: Some("B".into()),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "B");
    assert_eq!(updated.owner_id, Some(ME));
    assert!(updated.selected);
    assert!(controller.store().category_by_id(CategoryId(1)).unwrap().selected);
}

#[tokio::test]
async fn failed_update_does_not_touch_the_record() {
    let server = FakeServer::new();
    server.seed_category(1, "A", ME);
    server.seed_item(4, 1, ME, None);
    let controller = connected(&server).await;
    server.fail_next(
        Call::UpdateItem(4),
        CoreError::Validation {
            message: "name too long".into(),
        },
    );

    let err = controller
        .update_item(
            ItemId(4),
            &UpdateItemRequest {
                name: Some("x".repeat(500)),
                ..UpdateItemRequest::default()
            },
        )
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(controller.store().item_by_id(ItemId(4)).unwrap().name, "item-4");
}

#[tokio::test]
async fn update_of_unknown_record_is_not_found() {
    let server = FakeServer::new();
    let controller = connected(&server).await;

    let err = controller
        .update_item(ItemId(9), &UpdateItemRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::NotFound(EntityRef::Item(ItemId(9)))));
    assert_eq!(server.count(Call::UpdateItem(9)), 0);
}

#[tokio::test]
async fn failed_destroy_keeps_the_record() {
    let server = FakeServer::new();
    server.seed_category(1, "A", ME);
    server.seed_item(4, 1, ME, None);
    let controller = connected(&server).await;
    server.fail_next(Call::DeleteItem(4), transport_error(500));

    assert!(controller.destroy(EntityRef::Item(ItemId(4))).await.is_err());
    assert!(controller.store().item_by_id(ItemId(4)).is_some());
}

#[tokio::test]
async fn concurrent_deletes_completing_out_of_order() {
    let server = FakeServer::new();
    server.seed_category(1, "A", ME);
    server.seed_item(1, 1, ME, None);
    server.seed_item(2, 1, ME, None);
    let controller = connected(&server).await;
    let mut rx = controller.subscribe();

    let first_gate = server.gate(Call::DeleteItem(1));
    let second_gate = server.gate(Call::DeleteItem(2));

    let first = tokio::spawn({
        let c = controller.clone();
        async move { c.delete_item(ItemId(1)).await }
    });
    let second = tokio::spawn({
        let c = controller.clone();
        async move { c.delete_item(ItemId(2)).await }
    });
    support::settle().await;

    second_gate.send(()).unwrap();
    second.await.unwrap().unwrap();
    first_gate.send(()).unwrap();
    first.await.unwrap().unwrap();

    assert_eq!(controller.store().item_count(), 0);
    assert_eq!(
        drain(&mut rx),
        vec![
            Notification::Removed(EntityRef::Item(ItemId(2))),
            Notification::Removed(EntityRef::Item(ItemId(1))),
        ]
    );
}

#[tokio::test]
async fn recent_items_show_the_newest_ten() {
    let server = FakeServer::new();
    server.seed_category(1, "A", ME);
    for id in 1..=13 {
        server.seed_item(id, 1, ME, None);
    }
    let controller = connected(&server).await;

    assert_eq!(
        item_ids(&controller.visible_items()),
        (4..=13).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn stream_sees_store_changes() {
    let server = FakeServer::new();
    server.seed_category(1, "A", ME);
    let controller = connected(&server).await;
    let mut items = controller.items();
    assert!(items.current().is_empty());

    server.seed_item(8, 1, ME, None);
    controller.fetch_all(EntityKind::Item).await.unwrap();

    let snap = items.changed().await.unwrap();
    assert_eq!(item_ids(&snap), vec![8]);
}
