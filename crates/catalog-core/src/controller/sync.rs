// ── Entity store operations ──
//
// Server-confirmed writes into the store. Nothing is mutated before the
// transport call succeeds, and every mutation is followed by a
// reconciliation of the selection tracker.

use std::sync::{Arc, MutexGuard};

use tracing::{debug, info};

use super::Controller;
use crate::command::{
    CreateCategoryRequest, CreateItemRequest, UpdateCategoryRequest, UpdateItemRequest,
};
use crate::error::CoreError;
use crate::event::Notification;
use crate::model::{
    Category, CategoryId, EntityKind, EntityRef, Item, ItemId, PatchedCategory, PatchedItem,
};
use crate::selection::{Intent, SessionTarget};

impl Controller {
    /// Replace one local collection with the server's.
    pub async fn fetch_all(&self, kind: EntityKind) -> Result<(), CoreError> {
        match kind {
            EntityKind::Category => {
                let categories = self.inner.catalog.list_categories().await?;
                self.apply_categories(categories);
            }
            EntityKind::Item => {
                let items = self.inner.catalog.list_items().await?;
                self.apply_items(items);
            }
        }
        Ok(())
    }

    pub async fn create_category(&self, req: &CreateCategoryRequest) -> Result<Arc<Category>, CoreError> {
        let created = self.inner.catalog.create_category(req).await?;
        let (category, _) = self.inner.store.upsert_category(created);
        self.publish(Notification::Added(category.id.into()));
        Ok(category)
    }

    pub async fn create_item(&self, req: &CreateItemRequest) -> Result<Arc<Item>, CoreError> {
        let created = self.inner.catalog.create_item(req).await?;
        Ok(self.store_created_item(created))
    }

    pub async fn update_category(
        &self,
        id: CategoryId,
        req: &UpdateCategoryRequest,
    ) -> Result<Arc<Category>, CoreError> {
        if !self.inner.store.has_category(id) {
            return Err(CoreError::NotFound(id.into()));
        }
        let returned = self.inner.catalog.update_category(id, req).await?;
        let returned = PatchedCategory {
            name: returned.name.or_else(|| req.name.clone()),
            ..returned
        };
        let local = self
            .inner
            .store
            .category_by_id(id)
            .ok_or(CoreError::NotFound(id.into()))?;
        let (category, _) = self.inner.store.upsert_category(returned.merge_into(&local));
        self.publish(Notification::Changed(id.into()));
        Ok(category)
    }

    /// PATCH an item. Fields neither submitted in `req` nor echoed by the
    /// server keep their local value.
    pub async fn update_item(&self, id: ItemId, req: &UpdateItemRequest) -> Result<Arc<Item>, CoreError> {
        if self.inner.store.item_by_id(id).is_none() {
            return Err(CoreError::NotFound(id.into()));
        }
        let returned = self.inner.catalog.update_item(id, req).await?;
        self.store_updated_item(req, returned)
    }

    /// Delete on the server, then locally.
    pub async fn destroy(&self, target: EntityRef) -> Result<(), CoreError> {
        let removed = match target {
            EntityRef::Category(id) => {
                self.inner.catalog.delete_category(id).await?;
                self.inner.store.remove_category(id).is_some()
            }
            EntityRef::Item(id) => {
                self.inner.catalog.delete_item(id).await?;
                self.inner.store.remove_item(id).is_some()
            }
        };

        if removed {
            self.publish(Notification::Removed(target));
            let guard = self.lock_selection();
            self.reconcile_locked(&guard);
        }
        debug!(%target, "destroyed");
        Ok(())
    }

    // ── Store application ────────────────────────────────────────

    pub(super) fn apply_categories(&self, categories: Vec<Category>) {
        let guard = self.lock_selection();
        let selected = self.inner.tracker.selected_category();
        self.inner.store.apply_categories(categories, selected);
        self.publish(Notification::Reset(EntityKind::Category));
        self.reconcile_locked(&guard);
    }

    pub(super) fn apply_items(&self, items: Vec<Item>) {
        let guard = self.lock_selection();
        self.inner.store.apply_items(items);
        self.publish(Notification::Reset(EntityKind::Item));
        self.reconcile_locked(&guard);
    }

    pub(super) fn store_created_item(&self, created: Item) -> Arc<Item> {
        let (item, _) = self.inner.store.upsert_item(created);
        self.publish(Notification::Added(item.id.into()));
        item
    }

    /// Merge an update reply into the current local record. An item
    /// removed while the request was in flight is not brought back.
    pub(super) fn store_updated_item(
        &self,
        submitted: &UpdateItemRequest,
        returned: PatchedItem,
    ) -> Result<Arc<Item>, CoreError> {
        let id = returned.id;
        let local = self
            .inner
            .store
            .item_by_id(id)
            .ok_or(CoreError::NotFound(id.into()))?;
        let (item, _) = self
            .inner
            .store
            .upsert_item(merge_item(&local, submitted, returned));
        self.publish(Notification::Changed(id.into()));
        Ok(item)
    }

    /// Bring the tracker back in line with the store: a selection or a
    /// session pointing at a record that is gone is closed.
    pub(super) fn reconcile_locked(&self, guard: &MutexGuard<'_, ()>) {
        let store = &self.inner.store;

        if let Some(id) = self.inner.tracker.selected_category() {
            if !store.has_category(id) {
                info!(category = %id, "selected category is gone, clearing selection");
                self.transition_locked(guard, Intent::SelectCategory(None));
            }
        }

        let Some(session) = self.inner.tracker.active_session() else {
            return;
        };
        let item_gone = match session.target {
            SessionTarget::Existing(id) => store.item_by_id(id).is_none(),
            SessionTarget::New => false,
        };
        let category_gone = session
            .draft
            .category_id
            .is_some_and(|id| !store.has_category(id));

        if item_gone || category_gone {
            info!(token = %session.token, target = %session.target, "edit session target is gone, closing");
            self.transition_locked(guard, Intent::Invalidate);
        }
    }
}

/// Overlay an update reply onto `local`: echoed fields win, then the
/// submitted ones, then the local values. A display URL the reply left
/// out is kept only while the image is unchanged.
pub(super) fn merge_item(local: &Item, submitted: &UpdateItemRequest, returned: PatchedItem) -> Item {
    let image_id = returned
        .image_id
        .unwrap_or(submitted.image_id.or(local.image_id));
    let image_url = match returned.image_url {
        Some(url) => url,
        None if image_id == local.image_id => local.image_url.clone(),
        None => None,
    };

    Item {
        id: local.id,
        name: returned
            .name
            .or_else(|| submitted.name.clone())
            .unwrap_or_else(|| local.name.clone()),
        description: returned
            .description
            .or_else(|| submitted.description.clone())
            .unwrap_or_else(|| local.description.clone()),
        category_id: returned
            .category_id
            .or(submitted.category_id)
            .unwrap_or(local.category_id),
        image_id,
        image_url,
        owner_id: returned.owner_id.unwrap_or(local.owner_id),
        created_on: local.created_on,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{ImageId, OwnerId};
    use chrono::Utc;

    fn item(image: Option<i64>, url: Option<&str>) -> Item {
        Item {
            id: ItemId(1),
            name: "Board".into(),
            description: String::new(),
            category_id: CategoryId(1),
            image_id: image.map(ImageId),
            image_url: url.map(str::to_owned),
            owner_id: None,
            created_on: Utc::now(),
        }
    }

    fn echo(id: i64) -> PatchedItem {
        PatchedItem {
            id: ItemId(id),
            name: None,
            description: None,
            category_id: None,
            image_id: None,
            image_url: None,
            owner_id: None,
        }
    }

    #[test]
    fn merge_keeps_url_for_unchanged_image() {
        let merged = merge_item(
            &item(Some(3), Some("/img/3.png")),
            &UpdateItemRequest::default(),
            PatchedItem {
                image_id: Some(Some(ImageId(3))),
                ..echo(1)
            },
        );
        assert_eq!(merged.image_url.as_deref(), Some("/img/3.png"));
    }

    #[test]
    fn merge_drops_url_for_replaced_image() {
        let merged = merge_item(
            &item(Some(3), Some("/img/3.png")),
            &UpdateItemRequest {
                image_id: Some(ImageId(4)),
                ..UpdateItemRequest::default()
            },
            echo(1),
        );
        assert_eq!(merged.image_url, None);
        assert_eq!(merged.image_id, Some(ImageId(4)));
    }

    #[test]
    fn merge_keeps_local_fields_a_sparse_reply_omits() {
        let mut local = item(Some(3), Some("/img/3.png"));
        local.description = "Anti-fog".into();
        local.owner_id = Some(OwnerId(7));

        let merged = merge_item(
            &local,
            &UpdateItemRequest {
                name: Some("Goggles".into()),
                ..UpdateItemRequest::default()
            },
            echo(1),
        );

        assert_eq!(merged.name, "Goggles");
        assert_eq!(merged.description, "Anti-fog");
        assert_eq!(merged.image_id, Some(ImageId(3)));
        assert_eq!(merged.image_url.as_deref(), Some("/img/3.png"));
        assert_eq!(merged.owner_id, Some(OwnerId(7)));
        assert_eq!(merged.created_on, local.created_on);
    }

    #[test]
    fn echoed_values_beat_submitted_ones() {
        let merged = merge_item(
            &item(Some(3), None),
            &UpdateItemRequest {
                name: Some("  Goggles ".into()),
                ..UpdateItemRequest::default()
            },
            PatchedItem {
                name: Some("Goggles".into()),
                image_id: Some(None),
                ..echo(1)
            },
        );
        assert_eq!(merged.name, "Goggles");
        assert_eq!(merged.image_id, None);
    }
}
