// ── Central reactive data store ──
//
// In-memory mirror of the server's categories and items. Reads are
// lock-free snapshots; writes go through `store::refresh` and are only
// performed by the controller once the server has confirmed them.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use super::collection::EntityCollection;
use crate::model::{Category, CategoryId, Item, ItemId, OwnerId};
use crate::stream::EntityStream;

/// Central reactive store for catalog records.
pub struct DataStore {
    pub(crate) categories: EntityCollection<Category>,
    pub(crate) items: EntityCollection<Item>,
    pub(crate) last_full_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl DataStore {
    pub fn new() -> Self {
        let (last_full_refresh, _) = watch::channel(None);

        Self {
            categories: EntityCollection::new(),
            items: EntityCollection::new(),
            last_full_refresh,
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    /// Categories in name order.
    pub fn categories_snapshot(&self) -> Arc<Vec<Arc<Category>>> {
        self.categories.snapshot()
    }

    /// Items in `created_on` order.
    pub fn items_snapshot(&self) -> Arc<Vec<Arc<Item>>> {
        self.items.snapshot()
    }

    // ── Lookups ──────────────────────────────────────────────────────

    pub fn category_by_id(&self, id: CategoryId) -> Option<Arc<Category>> {
        self.categories.get(id)
    }

    pub fn item_by_id(&self, id: ItemId) -> Option<Arc<Item>> {
        self.items.get(id)
    }

    pub fn has_category(&self, id: CategoryId) -> bool {
        self.categories.contains(id)
    }

    /// The currently flagged category, if any.
    pub fn selected_category(&self) -> Option<Arc<Category>> {
        self.categories_snapshot().iter().find(|c| c.selected).cloned()
    }

    pub fn items_in_category(&self, id: CategoryId) -> Vec<Arc<Item>> {
        self.items_snapshot()
            .iter()
            .filter(|i| i.category_id == id)
            .cloned()
            .collect()
    }

    pub fn categories_by_owner(&self, owner: OwnerId) -> Vec<Arc<Category>> {
        self.categories_snapshot()
            .iter()
            .filter(|c| c.owner_id == Some(owner))
            .cloned()
            .collect()
    }

    /// Items to show for `selected`: that category's items, or the
    /// `recent_limit` newest items when nothing is selected. Oldest
    /// first either way. Items whose category is gone are never returned.
    pub fn visible_items(&self, selected: Option<CategoryId>, recent_limit: usize) -> Vec<Arc<Item>> {
        let live: Vec<Arc<Item>> = self
            .items_snapshot()
            .iter()
            .filter(|i| self.categories.contains(i.category_id))
            .cloned()
            .collect();

        match selected {
            Some(id) => live.into_iter().filter(|i| i.category_id == id).collect(),
            None => {
                let skip = live.len().saturating_sub(recent_limit);
                live.into_iter().skip(skip).collect()
            }
        }
    }

    // ── Counts ───────────────────────────────────────────────────────

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_categories(&self) -> EntityStream<Category> {
        EntityStream::new(self.categories.subscribe())
    }

    pub fn subscribe_items(&self) -> EntityStream<Item> {
        EntityStream::new(self.items.subscribe())
    }

    // ── Metadata ─────────────────────────────────────────────────────

    pub fn last_full_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_full_refresh.borrow()
    }

    /// How long ago the last full refresh occurred, or `None` if never refreshed.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        self.last_full_refresh().map(|t| Utc::now() - t)
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}
