// catalog-core: client-side state synchronization for a category/item
// catalog. Sits between catalog-api (HTTP) and presentation adapters.

pub mod command;
pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod event;
pub mod model;
pub mod selection;
pub mod store;
pub mod stream;
pub mod transport;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::requests::*;
pub use command::{Command, CommandResult};
pub use config::{ControllerConfig, ImageCleanup, StaleCompletionPolicy, TlsVerification};
pub use controller::{ConnectionState, Controller};
pub use error::CoreError;
pub use event::{Notification, Operation, SessionChange};
pub use selection::{
    CloseReason, DraftUpdate, EditSession, ItemDraft, RowState, SelectionState, SelectionTracker,
    SessionTarget, SessionToken,
};
pub use store::DataStore;
pub use stream::EntityStream;
pub use transport::{CatalogTransport, ImageTransport};

pub use model::{
    ACCEPTED_IMAGE_TYPES, Category, CategoryId, EntityKind, EntityRef, ImageId, Item, ItemId,
    OwnerId, PatchedCategory, PatchedItem, StagedImage,
};
