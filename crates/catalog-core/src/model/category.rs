use serde::{Deserialize, Serialize};

use super::{CategoryId, OwnerId};

/// A category that items are filed under.
///
/// `selected` is client-only state maintained by the selection tracker;
/// it is never serialized and never sent to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub owner_id: Option<OwnerId>,
    #[serde(skip)]
    pub selected: bool,
}

impl Category {
    /// Whether `user` may modify this category.
    pub fn is_owned_by(&self, user: Option<OwnerId>) -> bool {
        matches!((self.owner_id, user), (Some(owner), Some(user)) if owner == user)
    }
}

/// A category as echoed by a partial update. `None` marks a field the
/// response left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchedCategory {
    pub id: CategoryId,
    pub name: Option<String>,
    pub owner_id: Option<Option<OwnerId>>,
}

impl PatchedCategory {
    /// Overlay the echoed fields onto `local`. The selection flag is
    /// client state and always comes from `local`.
    pub fn merge_into(self, local: &Category) -> Category {
        Category {
            id: local.id,
            name: self.name.unwrap_or_else(|| local.name.clone()),
            owner_id: self.owner_id.unwrap_or(local.owner_id),
            selected: local.selected,
        }
    }
}

impl From<Category> for PatchedCategory {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: Some(category.name),
            owner_id: Some(category.owner_id),
        }
    }
}
