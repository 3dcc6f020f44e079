// ── Domain model ──
//
// Canonical client-side representation of catalog records. Wire shapes
// from `catalog-api` are converted into these in `crate::convert`.

pub mod category;
pub mod common;
pub mod entity_id;
pub mod image;
pub mod item;

// ── Re-exports ──────────────────────────────────────────────────────

pub use category::{Category, PatchedCategory};
pub use common::{EntityKind, EntityRef};
pub use entity_id::{CategoryId, ImageId, ItemId, OwnerId};
pub use image::{ACCEPTED_IMAGE_TYPES, StagedImage};
pub use item::{Item, PatchedItem};
