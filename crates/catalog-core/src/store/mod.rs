// ── Entity store ──

mod collection;
mod data_store;
mod refresh;

pub use data_store::DataStore;
