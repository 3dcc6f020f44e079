// ── Store mutations ──
//
// Write paths used by the controller after the server confirmed a
// change. The transient `selected` flag is client state and survives
// every server-driven rewrite of a category.

use std::sync::Arc;

use chrono::Utc;

use super::DataStore;
use crate::model::{Category, CategoryId, Item, ItemId};

impl DataStore {
    /// Replace all categories, flagging `selected` if it is still present.
    pub(crate) fn apply_categories(&self, categories: Vec<Category>, selected: Option<CategoryId>) {
        self.categories.replace_all(categories.into_iter().map(|mut c| {
            c.selected = Some(c.id) == selected;
            c
        }));
    }

    pub(crate) fn apply_items(&self, items: Vec<Item>) {
        self.items.replace_all(items);
    }

    pub(crate) fn mark_refreshed(&self) {
        self.last_full_refresh.send_replace(Some(Utc::now()));
    }

    /// Insert or replace a category. The flag tells whether it was new.
    pub(crate) fn upsert_category(&self, mut category: Category) -> (Arc<Category>, bool) {
        if let Some(existing) = self.categories.get(category.id) {
            category.selected = existing.selected;
        }
        let category = Arc::new(category);
        let is_new = self.categories.upsert(Arc::clone(&category));
        (category, is_new)
    }

    /// Insert or replace an item. The flag tells whether it was new.
    pub(crate) fn upsert_item(&self, item: Item) -> (Arc<Item>, bool) {
        let item = Arc::new(item);
        let is_new = self.items.upsert(Arc::clone(&item));
        (item, is_new)
    }

    pub(crate) fn remove_category(&self, id: CategoryId) -> Option<Arc<Category>> {
        self.categories.remove(id)
    }

    pub(crate) fn remove_item(&self, id: ItemId) -> Option<Arc<Item>> {
        self.items.remove(id)
    }

    /// Drop every item filed under `id`, mirroring the server's cascade.
    pub(crate) fn prune_items_in_category(&self, id: CategoryId) -> Vec<Arc<Item>> {
        self.items.remove_where(|i| i.category_id == id)
    }

    pub(crate) fn set_category_selected(&self, id: CategoryId, selected: bool) {
        self.categories.modify(id, |c| c.selected = selected);
    }
}
