//! Storage backends for the API.
//!
//! Handlers talk to the `StorageBackend` trait only. Production uses the
//! managed PostgreSQL service; tests and local development without a
//! `DATABASE_URL` use the in-memory backend.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod traits;

pub use error::StorageError;
pub use memory::MemoryStorageBackend;
pub use postgres::PostgresStorageBackend;
pub use traits::{StorageBackend, UserContext};
