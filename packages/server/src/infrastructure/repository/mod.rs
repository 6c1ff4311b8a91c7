//! Room directory implementations.
//!
//! - `inmemory`: process-local store, used in tests and when no database is configured
//! - `sqlite`: `sqlx` backed store

pub mod inmemory;
pub mod sqlite;

pub use inmemory::InMemoryRoomRepository;
pub use sqlite::SqliteRoomRepository;
