// ── Common types shared across the domain model ──

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::{CategoryId, ItemId};

/// The two synchronized collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Category,
    Item,
}

/// A typed back-reference to one record in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum EntityRef {
    Category(CategoryId),
    Item(ItemId),
}

impl EntityRef {
    pub fn kind(self) -> EntityKind {
        match self {
            Self::Category(_) => EntityKind::Category,
            Self::Item(_) => EntityKind::Item,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Category(id) => write!(f, "category {id}"),
            Self::Item(id) => write!(f, "item {id}"),
        }
    }
}

impl From<CategoryId> for EntityRef {
    fn from(id: CategoryId) -> Self {
        Self::Category(id)
    }
}

impl From<ItemId> for EntityRef {
    fn from(id: ItemId) -> Self {
        Self::Item(id)
    }
}
