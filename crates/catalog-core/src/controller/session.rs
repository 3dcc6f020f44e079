// ── Session coordinator flows ──
//
// User intents: selection, edit sessions, and the multi-step save and
// delete sequences. Each public method surfaces a failure exactly once,
// as its `Err` plus one `OperationFailed` notification.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::Controller;
use super::sync::merge_item;
use crate::command::{CreateCategoryRequest, CreateItemRequest, UpdateCategoryRequest, UpdateItemRequest};
use crate::config::{ImageCleanup, StaleCompletionPolicy};
use crate::error::CoreError;
use crate::event::{Notification, Operation};
use crate::model::{
    Category, CategoryId, EntityKind, EntityRef, ImageId, Item, ItemId, OwnerId, PatchedItem,
};
use crate::selection::{
    DraftUpdate, EditSession, Intent, ItemDraft, SessionTarget, SessionToken, Transition,
};

enum Persisted {
    Created(Item),
    /// `merged` is the reply laid over the record the save started from.
    Updated {
        merged: Item,
        returned: PatchedItem,
        req: UpdateItemRequest,
    },
}

impl Persisted {
    fn item(&self) -> &Item {
        match self {
            Self::Created(item) | Self::Updated { merged: item, .. } => item,
        }
    }

    fn into_item(self) -> Item {
        match self {
            Self::Created(item) | Self::Updated { merged: item, .. } => item,
        }
    }
}

impl Controller {
    // ── Selection ────────────────────────────────────────────────

    /// Select a category, or toggle it off if it is already selected.
    /// Returns the selection afterwards.
    pub fn select_category(&self, id: Option<CategoryId>) -> Result<Option<CategoryId>, CoreError> {
        let result = self.try_select_category(id);
        self.report(Operation::SelectCategory, result)
    }

    fn try_select_category(&self, id: Option<CategoryId>) -> Result<Option<CategoryId>, CoreError> {
        if let Some(id) = id {
            if !self.inner.store.has_category(id) {
                return Err(CoreError::NotFound(id.into()));
            }
        }
        let guard = self.lock_selection();
        self.transition_locked(&guard, Intent::SelectCategory(id));
        Ok(self.inner.tracker.selected_category())
    }

    /// Change the signed-in user. Sessions the new user may not keep
    /// editing are closed.
    pub fn set_user(&self, user: Option<OwnerId>) {
        let changed = self.inner.user.send_if_modified(|current| {
            let changed = *current != user;
            *current = user;
            changed
        });
        if !changed {
            return;
        }
        self.publish(Notification::UserChanged(user));

        let guard = self.lock_selection();
        let Some(session) = self.inner.tracker.active_session() else {
            return;
        };
        let allowed = match session.target {
            SessionTarget::New => user.is_some(),
            SessionTarget::Existing(id) => self
                .inner
                .store
                .item_by_id(id)
                .is_some_and(|item| item.is_owned_by(user)),
        };
        if !allowed {
            debug!(token = %session.token, "user changed, closing edit session");
            self.transition_locked(&guard, Intent::Invalidate);
        }
    }

    // ── Edit sessions ────────────────────────────────────────────

    /// Open an edit session, closing any open one first.
    pub fn begin_edit(&self, target: SessionTarget) -> Result<SessionToken, CoreError> {
        let result = self.try_begin_edit(target);
        self.report(Operation::BeginEdit, result)
    }

    fn try_begin_edit(&self, target: SessionTarget) -> Result<SessionToken, CoreError> {
        let user = self.user();
        let draft = match target {
            SessionTarget::New => {
                if user.is_none() {
                    return Err(CoreError::NotSignedIn);
                }
                ItemDraft::in_category(self.inner.tracker.selected_category())
            }
            SessionTarget::Existing(id) => {
                let item = self
                    .inner
                    .store
                    .item_by_id(id)
                    .ok_or(CoreError::NotFound(id.into()))?;
                self.require_owner(item.is_owned_by(user), id.into())?;
                ItemDraft::from_item(&item)
            }
        };

        let guard = self.lock_selection();
        self.transition_locked(&guard, Intent::BeginEdit { target, draft })
            .into_iter()
            .find_map(|t| match t {
                Transition::SessionOpened { token, .. } => Some(token),
                _ => None,
            })
            .ok_or_else(|| CoreError::Consistency {
                message: format!("edit session for {target} did not open"),
            })
    }

    /// Mutate the open session's draft.
    pub fn edit_draft<R>(&self, f: impl FnOnce(&mut ItemDraft) -> R) -> Result<R, CoreError> {
        let result = self.inner.tracker.edit_draft(f).ok_or(CoreError::NoActiveSession);
        self.report(Operation::EditDraft, result)
    }

    pub fn update_draft(&self, update: DraftUpdate) -> Result<(), CoreError> {
        self.edit_draft(|draft| draft.apply(update))
    }

    /// Close the open session without saving. Returns whether one was open.
    pub fn cancel_edit(&self) -> bool {
        let guard = self.lock_selection();
        !self.transition_locked(&guard, Intent::CancelEdit).is_empty()
    }

    /// Close the session opened as `token`, if it is still the open one.
    pub fn end_edit(&self, token: SessionToken) -> bool {
        let guard = self.lock_selection();
        !self.transition_locked(&guard, Intent::EndEdit(token)).is_empty()
    }

    // ── Save flow ────────────────────────────────────────────────

    /// Persist the open session: upload a staged image, then create or
    /// update the item, then close the session.
    ///
    /// On any failure the session stays open and the store is untouched.
    pub async fn save_item(&self) -> Result<Arc<Item>, CoreError> {
        let result = self.try_save_item().await;
        self.report(Operation::SaveItem, result)
    }

    async fn try_save_item(&self) -> Result<Arc<Item>, CoreError> {
        let EditSession {
            token,
            target,
            draft,
        } = self
            .inner
            .tracker
            .active_session()
            .ok_or(CoreError::NoActiveSession)?;

        let name = draft.name.trim().to_owned();
        if name.is_empty() {
            return Err(CoreError::Validation {
                message: "item name must not be empty".into(),
            });
        }
        let category_id = draft.category_id.ok_or_else(|| CoreError::Validation {
            message: "choose a category for the item".into(),
        })?;

        if !self.inner.store.has_category(category_id) {
            return Err(self
                .abandon_session(token, format!("category {category_id} no longer exists"))
                .await);
        }
        let original = match target {
            SessionTarget::New => None,
            SessionTarget::Existing(id) => match self.inner.store.item_by_id(id) {
                Some(item) => Some(item),
                None => {
                    return Err(self
                        .abandon_session(token, format!("item {id} no longer exists"))
                        .await);
                }
            },
        };

        let uploaded = match draft.image {
            Some(ref image) => {
                let id = self.inner.images.upload_image(image).await?;
                debug!(%token, image = %id, "image uploaded");
                Some(id)
            }
            None => None,
        };

        let persisted = match target {
            SessionTarget::New => {
                let req = CreateItemRequest {
                    name,
                    description: draft.description,
                    category_id,
                    image_id: uploaded,
                };
                self.inner
                    .catalog
                    .create_item(&req)
                    .await
                    .map(Persisted::Created)
            }
            SessionTarget::Existing(id) => match original.as_deref() {
                Some(original) => {
                    let req = UpdateItemRequest {
                        name: Some(name),
                        description: Some(draft.description),
                        category_id: Some(category_id),
                        image_id: uploaded,
                    };
                    self.inner
                        .catalog
                        .update_item(id, &req)
                        .await
                        .map(|returned| Persisted::Updated {
                            merged: merge_item(original, &req, returned.clone()),
                            returned,
                            req,
                        })
                }
                None => Err(CoreError::NotFound(id.into())),
            },
        };

        let persisted = match persisted {
            Ok(persisted) => persisted,
            Err(e) => {
                if let Some(orphan) = uploaded {
                    self.reclaim_image(orphan, "item save failed").await;
                }
                return Err(e);
            }
        };

        let previous_image = original.as_ref().and_then(|item| item.image_id);
        if let Some(replaced) = previous_image.filter(|old| uploaded.is_some_and(|new| new != *old)) {
            self.reclaim_image(replaced, "replaced by a new upload").await;
        }

        let stale = !self.inner.tracker.is_active(token);
        let suppressed = stale && self.inner.config.stale_completions == StaleCompletionPolicy::Suppress;
        let saved = persisted.item();
        let orphaned = !self.inner.store.has_category(saved.category_id)
            || (matches!(persisted, Persisted::Updated { .. })
                && self.inner.store.item_by_id(saved.id).is_none());
        if suppressed || orphaned {
            let item = persisted.into_item();
            debug!(%token, item = %item.id, orphaned, "session closed before save completed, result not applied");
            self.end_edit(token);
            return Ok(Arc::new(item));
        }

        let item = match persisted {
            Persisted::Created(item) => self.store_created_item(item),
            Persisted::Updated { returned, req, .. } => self.store_updated_item(&req, returned)?,
        };
        self.end_edit(token);
        info!(%token, item = %item.id, stale, "item saved");
        Ok(item)
    }

    /// Close the session that hit a consistency failure and re-fetch so
    /// the store matches the server again.
    async fn abandon_session(&self, token: SessionToken, message: String) -> CoreError {
        warn!(%token, %message, "edit session is inconsistent with the store");
        {
            let guard = self.lock_selection();
            if self.inner.tracker.is_active(token) {
                self.transition_locked(&guard, Intent::Invalidate);
            }
        }
        for kind in [EntityKind::Category, EntityKind::Item] {
            if let Err(e) = self.fetch_all(kind).await {
                warn!(%kind, error = %e, "re-fetch after consistency failure failed");
            }
        }
        CoreError::Consistency { message }
    }

    // ── Delete flows ─────────────────────────────────────────────

    /// Delete an item, then its image. The image deletion is best
    /// effort and never changes the outcome.
    pub async fn delete_item(&self, id: ItemId) -> Result<(), CoreError> {
        let result = self.try_delete_item(id).await;
        self.report(Operation::DeleteItem, result)
    }

    async fn try_delete_item(&self, id: ItemId) -> Result<(), CoreError> {
        let item = self
            .inner
            .store
            .item_by_id(id)
            .ok_or(CoreError::NotFound(id.into()))?;
        self.require_owner(item.is_owned_by(self.user()), id.into())?;

        self.destroy(EntityRef::Item(id)).await?;

        if let Some(image) = item.image_id {
            self.delete_image_best_effort(image).await;
        }
        Ok(())
    }

    /// Delete a category. The server cascades to its items, so the
    /// items are dropped locally and re-fetched.
    pub async fn delete_category(&self, id: CategoryId) -> Result<(), CoreError> {
        let result = self.try_delete_category(id).await;
        self.report(Operation::DeleteCategory, result)
    }

    async fn try_delete_category(&self, id: CategoryId) -> Result<(), CoreError> {
        let category = self
            .inner
            .store
            .category_by_id(id)
            .ok_or(CoreError::NotFound(id.into()))?;
        self.require_owner(category.is_owned_by(self.user()), id.into())?;

        self.destroy(EntityRef::Category(id)).await?;

        let pruned = self.inner.store.prune_items_in_category(id);
        for item in &pruned {
            self.publish(Notification::Removed(item.id.into()));
        }
        {
            let guard = self.lock_selection();
            self.reconcile_locked(&guard);
        }

        if let Err(e) = self.fetch_all(EntityKind::Item).await {
            // The category is gone either way; the local prune already
            // keeps orphaned items out of view.
            let _ = self.report::<()>(Operation::Refresh, Err(e));
        }
        info!(category = %id, cascaded = pruned.len(), "category deleted");
        Ok(())
    }

    // ── Category writes ──────────────────────────────────────────

    pub async fn add_category(&self, name: &str) -> Result<Arc<Category>, CoreError> {
        let result = match validated_name(name) {
            Ok(name) => self.create_category(&CreateCategoryRequest { name }).await,
            Err(e) => Err(e),
        };
        self.report(Operation::CreateCategory, result)
    }

    pub async fn rename_category(&self, id: CategoryId, name: &str) -> Result<Arc<Category>, CoreError> {
        let result = self.try_rename_category(id, name).await;
        self.report(Operation::RenameCategory, result)
    }

    async fn try_rename_category(&self, id: CategoryId, name: &str) -> Result<Arc<Category>, CoreError> {
        let name = validated_name(name)?;
        let category = self
            .inner
            .store
            .category_by_id(id)
            .ok_or(CoreError::NotFound(id.into()))?;
        self.require_owner(category.is_owned_by(self.user()), id.into())?;
        self.update_category(id, &UpdateCategoryRequest { name: Some(name) })
            .await
    }

    // ── Helpers ──────────────────────────────────────────────────

    fn require_owner(&self, owned: bool, target: EntityRef) -> Result<(), CoreError> {
        match (self.user(), owned) {
            (None, _) => Err(CoreError::NotSignedIn),
            (Some(_), false) => Err(CoreError::NotOwner(target)),
            (Some(_), true) => Ok(()),
        }
    }

    /// Delete an image the save flow orphaned, unless configured to keep it.
    async fn reclaim_image(&self, id: ImageId, reason: &str) {
        match self.inner.config.image_cleanup {
            ImageCleanup::Retain => debug!(image = %id, reason, "retaining orphaned image"),
            ImageCleanup::Reclaim => {
                debug!(image = %id, reason, "reclaiming orphaned image");
                self.delete_image_best_effort(id).await;
            }
        }
    }

    async fn delete_image_best_effort(&self, id: ImageId) {
        if let Err(e) = self.inner.images.delete_image(id).await {
            let _ = self.report::<()>(Operation::DeleteImage, Err(e));
        }
    }
}

fn validated_name(name: &str) -> Result<String, CoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation {
            message: "category name must not be empty".into(),
        });
    }
    Ok(name.to_owned())
}
