use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CategoryId, ImageId, ItemId, OwnerId};

/// A catalog item. Items are ordered by `created_on`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub category_id: CategoryId,
    pub image_id: Option<ImageId>,
    /// Server-resolved path of the attached image, for display.
    pub image_url: Option<String>,
    pub owner_id: Option<OwnerId>,
    pub created_on: DateTime<Utc>,
}

impl Item {
    /// Whether `user` may modify this item.
    pub fn is_owned_by(&self, user: Option<OwnerId>) -> bool {
        matches!((self.owner_id, user), (Some(owner), Some(user)) if owner == user)
    }
}

/// An item as echoed by a partial update.
///
/// `None` marks a field the response left out. For nullable fields,
/// `Some(None)` is an explicit null.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchedItem {
    pub id: ItemId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub image_id: Option<Option<ImageId>>,
    pub image_url: Option<Option<String>>,
    pub owner_id: Option<Option<OwnerId>>,
}

impl From<Item> for PatchedItem {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            name: Some(item.name),
            description: Some(item.description),
            category_id: Some(item.category_id),
            image_id: Some(item.image_id),
            image_url: Some(item.image_url),
            owner_id: Some(item.owner_id),
        }
    }
}
