//! inkpad storage - storage trait and in-memory implementation
//!
//! Defines the persistence interface consumed by the API services.
//! The Postgres implementation lives in `inkpad-api::db`.

pub mod memory;
pub mod store;

pub use memory::MemoryStore;
pub use store::Store;
