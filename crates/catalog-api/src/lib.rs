// catalog-api: Async Rust client for the catalog REST API

pub mod categories;
pub mod client;
pub mod error;
pub mod images;
pub mod items;
pub mod models;
pub mod transport;

pub use client::CatalogClient;
pub use error::Error;
pub use models::{
    ApiCategory, ApiCategoryPatched, ApiImage, ApiItem, ApiItemPatched, CategoryCreate,
    CategoryPatch, ItemCreate, ItemPatch,
};
pub use transport::{TlsMode, TransportConfig};
