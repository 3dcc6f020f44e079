// ── Command API ──
//
// Presentation-adapter intents as data. `Controller::execute` routes
// each variant to the matching coordinator method, so a host can drive
// the core without holding closures.

pub mod requests;

use std::sync::Arc;

use crate::model::{Category, CategoryId, Item, ItemId, OwnerId};
use crate::selection::{DraftUpdate, SessionTarget, SessionToken};

pub use requests::{
    CreateCategoryRequest, CreateItemRequest, UpdateCategoryRequest, UpdateItemRequest,
};

#[derive(Debug, Clone)]
pub enum Command {
    // ── Selection ────────────────────────────────────────────────────
    SelectCategory(Option<CategoryId>),
    SetUser(Option<OwnerId>),

    // ── Edit sessions ────────────────────────────────────────────────
    BeginEdit(SessionTarget),
    UpdateDraft(DraftUpdate),
    CancelEdit,
    SaveItem,

    // ── Direct writes ────────────────────────────────────────────────
    DeleteItem { id: ItemId },
    CreateCategory { name: String },
    RenameCategory { id: CategoryId, name: String },
    DeleteCategory { id: CategoryId },

    Refresh,
}

#[derive(Debug)]
pub enum CommandResult {
    Ok,
    Selection(Option<CategoryId>),
    SessionOpened(SessionToken),
    /// Whether a session was actually closed.
    SessionClosed(bool),
    Item(Arc<Item>),
    Category(Arc<Category>),
}
