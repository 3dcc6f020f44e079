// ── Edit sessions ──
//
// Client-only state for the single item currently being created or
// edited. Nothing here is sent to the server until the coordinator
// saves the draft.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{CategoryId, Item, ItemId, StagedImage};

/// Identifies one opened session. Strictly increasing per tracker, so a
/// completion can tell whether the session it started from is still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(pub u64);

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What an edit session is editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionTarget {
    Existing(ItemId),
    /// The new-item slot. Discarded entirely when the session closes.
    New,
}

impl fmt::Display for SessionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Existing(id) => write!(f, "item {id}"),
            Self::New => f.write_str("new item"),
        }
    }
}

/// Form values of an open session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemDraft {
    pub name: String,
    pub description: String,
    pub category_id: Option<CategoryId>,
    pub image: Option<StagedImage>,
}

impl ItemDraft {
    /// A draft pre-filled from an existing item. No image is staged; the
    /// item keeps its current one unless a new file is picked.
    pub fn from_item(item: &Item) -> Self {
        Self {
            name: item.name.clone(),
            description: item.description.clone(),
            category_id: Some(item.category_id),
            image: None,
        }
    }

    /// An empty draft filed under `category_id`.
    pub fn in_category(category_id: Option<CategoryId>) -> Self {
        Self {
            category_id,
            ..Self::default()
        }
    }

    pub fn apply(&mut self, update: DraftUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(category_id) = update.category_id {
            self.category_id = Some(category_id);
        }
        if let Some(image) = update.image {
            self.image = Some(image);
        }
    }
}

/// A data-only draft edit, for hosts that cannot pass closures
/// (the `Command` facade, the CLI). Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub image: Option<StagedImage>,
}

/// The single open edit session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub token: SessionToken,
    pub target: SessionTarget,
    pub draft: ItemDraft,
}

/// Per-row presentation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowState {
    View,
    Editing,
    /// The unsaved new-item slot.
    New,
}
