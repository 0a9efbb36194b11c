//! SQLite store for the catalog: connection pool, migration runner, and store errors.

mod database;
mod error;

pub use database::Database;
pub use error::StoreError;
pub use sqlx::SqlitePool;

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
