// ── Generic reactive entity collection ──
//
// Concurrent storage keyed by server id, with an ordered snapshot that
// subscribers receive through a `watch` channel after every mutation.

use std::cmp::Ordering;
use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

use crate::model::{Category, CategoryId, Item, ItemId};

/// A record the store can hold: keyed by id, with a display order.
pub(crate) trait Keyed: Clone + Send + Sync + 'static {
    type Key: Copy + Eq + Hash + Send + Sync + 'static;

    fn key(&self) -> Self::Key;

    /// Snapshot order. Must be total so snapshots are deterministic.
    fn order(a: &Self, b: &Self) -> Ordering;
}

impl Keyed for Category {
    type Key = CategoryId;

    fn key(&self) -> CategoryId {
        self.id
    }

    fn order(a: &Self, b: &Self) -> Ordering {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then(a.id.cmp(&b.id))
    }
}

impl Keyed for Item {
    type Key = ItemId;

    fn key(&self) -> ItemId {
        self.id
    }

    fn order(a: &Self, b: &Self) -> Ordering {
        a.created_on.cmp(&b.created_on).then(a.id.cmp(&b.id))
    }
}

/// Reactive collection for a single entity type.
///
/// `DashMap` gives O(1) concurrent lookups; every mutation rebuilds the
/// sorted snapshot that subscribers receive.
pub(crate) struct EntityCollection<T: Keyed> {
    by_key: DashMap<T::Key, Arc<T>>,
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Keyed> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            by_key: DashMap::new(),
            snapshot,
        }
    }

    /// Insert or replace an entity. Returns `true` if the key was new.
    pub(crate) fn upsert(&self, entity: impl Into<Arc<T>>) -> bool {
        let entity = entity.into();
        let is_new = self.by_key.insert(entity.key(), entity).is_none();
        self.rebuild_snapshot();
        is_new
    }

    /// Remove an entity. Returns it if it existed.
    pub(crate) fn remove(&self, key: T::Key) -> Option<Arc<T>> {
        let removed = self.by_key.remove(&key).map(|(_, v)| v);
        if removed.is_some() {
            self.rebuild_snapshot();
        }
        removed
    }

    /// Remove every entity matching `predicate`, returning them.
    pub(crate) fn remove_where(&self, predicate: impl Fn(&T) -> bool) -> Vec<Arc<T>> {
        let keys: Vec<T::Key> = self
            .by_key
            .iter()
            .filter(|r| predicate(r.value()))
            .map(|r| *r.key())
            .collect();

        let removed: Vec<Arc<T>> = keys
            .into_iter()
            .filter_map(|k| self.by_key.remove(&k).map(|(_, v)| v))
            .collect();

        if !removed.is_empty() {
            self.rebuild_snapshot();
        }
        removed
    }

    /// Copy-on-write update of one entity. Returns the new value.
    pub(crate) fn modify(&self, key: T::Key, f: impl FnOnce(&mut T)) -> Option<Arc<T>> {
        let updated = {
            let mut entry = self.by_key.get_mut(&key)?;
            let mut value = T::clone(entry.value());
            f(&mut value);
            let value = Arc::new(value);
            *entry = Arc::clone(&value);
            value
        };
        self.rebuild_snapshot();
        Some(updated)
    }

    /// Swap the whole contents for `entities` with a single snapshot rebuild.
    pub(crate) fn replace_all(&self, entities: impl IntoIterator<Item = T>) {
        self.by_key.clear();
        for entity in entities {
            self.by_key.insert(entity.key(), Arc::new(entity));
        }
        self.rebuild_snapshot();
    }

    pub(crate) fn get(&self, key: T::Key) -> Option<Arc<T>> {
        self.by_key.get(&key).map(|r| Arc::clone(r.value()))
    }

    pub(crate) fn contains(&self, key: T::Key) -> bool {
        self.by_key.contains_key(&key)
    }

    /// The current ordered snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<T>>>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_key.len()
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Collect and publish under the channel's write lock, so the last
    /// snapshot sent always reflects the last write to `by_key`.
    fn rebuild_snapshot(&self) {
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| {
            let mut values: Vec<Arc<T>> =
                self.by_key.iter().map(|r| Arc::clone(r.value())).collect();
            values.sort_by(|a, b| T::order(a, b));
            *snap = Arc::new(values);
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn item(id: i64, minute: u32) -> Item {
        Item {
            id: ItemId(id),
            name: format!("item-{id}"),
            description: String::new(),
            category_id: CategoryId(1),
            image_id: None,
            image_url: None,
            owner_id: None,
            created_on: Utc.with_ymd_and_hms(2024, 1, 1, 0, minute, 0).unwrap(),
        }
    }

    fn category(id: i64, name: &str) -> Category {
        Category {
            id: CategoryId(id),
            name: name.into(),
            owner_id: None,
            selected: false,
        }
    }

    fn ids(col: &EntityCollection<Item>) -> Vec<i64> {
        col.snapshot().iter().map(|i| i.id.get()).collect()
    }

    #[test]
    fn upsert_reports_new_keys() {
        let col: EntityCollection<Item> = EntityCollection::new();
        assert!(col.upsert(item(1, 0)));
        assert!(!col.upsert(item(1, 0)));
        assert_eq!(col.len(), 1);
    }

    #[test]
    fn snapshot_is_ordered_by_creation_then_id() {
        let col: EntityCollection<Item> = EntityCollection::new();
        col.upsert(item(3, 5));
        col.upsert(item(1, 9));
        col.upsert(item(2, 5));
        assert_eq!(ids(&col), vec![2, 3, 1]);
    }

    #[test]
    fn categories_sort_by_name_case_insensitively() {
        let col: EntityCollection<Category> = EntityCollection::new();
        col.upsert(category(1, "soccer"));
        col.upsert(category(2, "Baseball"));
        col.upsert(category(3, "hockey"));
        let names: Vec<String> = col.snapshot().iter().map(|c| c.name.clone()).collect();
        assert_eq!(names, vec!["Baseball", "hockey", "soccer"]);
    }

    #[test]
    fn modify_is_copy_on_write() {
        let col: EntityCollection<Item> = EntityCollection::new();
        col.upsert(item(1, 0));
        let before = col.get(ItemId(1)).unwrap();

        let after = col.modify(ItemId(1), |i| i.name = "renamed".into()).unwrap();

        assert_eq!(before.name, "item-1");
        assert_eq!(after.name, "renamed");
        assert_eq!(col.snapshot()[0].name, "renamed");
        assert!(col.modify(ItemId(99), |_| {}).is_none());
    }

    #[test]
    fn remove_where_drops_matches() {
        let col: EntityCollection<Item> = EntityCollection::new();
        col.upsert(item(1, 0));
        col.upsert(item(2, 1));
        let removed = col.remove_where(|i| i.id == ItemId(2));
        assert_eq!(removed.len(), 1);
        assert_eq!(ids(&col), vec![1]);
        assert!(col.remove_where(|_| false).is_empty());
    }

    #[test]
    fn replace_all_notifies_once() {
        let col: EntityCollection<Item> = EntityCollection::new();
        col.upsert(item(1, 0));
        let mut rx = col.subscribe();
        rx.borrow_and_update();

        col.replace_all(vec![item(5, 1), item(6, 2)]);

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 2);
        assert!(!col.contains(ItemId(1)));
        assert!(col.remove(ItemId(1)).is_none());
    }

    #[test]
    fn concurrent_writers_leave_a_matching_snapshot() {
        let col: EntityCollection<Item> = EntityCollection::new();
        std::thread::scope(|scope| {
            for t in 0..8_i64 {
                let col = &col;
                scope.spawn(move || {
                    for n in 0..50_i64 {
                        col.upsert(item(t * 100 + n, 0));
                    }
                });
            }
        });

        assert_eq!(col.len(), 400);
        assert_eq!(col.snapshot().len(), 400);
    }
}
