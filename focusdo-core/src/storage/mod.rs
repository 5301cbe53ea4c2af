//! Storage layer for focusdo
//!
//! State lives in a flat key-value byte store:
//! - [`KeyValueStore`] trait with in-memory and SQLite implementations
//! - Schema migrations for the SQLite backend
//! - The JSON codec that maps [`AppState`](crate::types::AppState) onto four keys

pub mod codec;
pub mod kv;
pub mod schema;
pub mod sqlite;

pub use kv::{KeyValueStore, MemoryStore};
pub use sqlite::SqliteStore;
