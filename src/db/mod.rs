/// Storage layer for the campus backend.
/// One shared SQLite connection; per-exercise operations live in the
/// submodules (posts, tasks, bank, courses) as impl blocks on `Store`.
pub mod bank;
pub mod courses;
pub mod init;
pub mod models;
pub mod posts;
pub mod tasks;

use rusqlite::{Connection, Result as SqliteResult};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

pub type DbPool = Arc<Mutex<Connection>>;

/// Create a connection pool (simplified for single-threaded SQLite)
pub fn create_pool(db_path: &str) -> SqliteResult<DbPool> {
    let conn = Connection::open(db_path)?;
    init::initialize_database(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// Create an in-memory database for testing
pub fn create_test_pool() -> DbPool {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory DB");
    init::initialize_database(&conn).expect("Failed to initialize DB");
    Arc::new(Mutex::new(conn))
}

/// Errors surfaced by store operations. Handlers map these onto
/// HTTP statuses at the boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Addressed entity does not exist; carries the entity name for the
    /// error body ("Post not found", "User not found", ...).
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Bad request")]
    BadRequest,
    /// A terminal transaction was addressed by a decide call.
    #[error("Can not edit this transaction.")]
    TransactionDecided,
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Store operations. Unit struct; the impl blocks are spread across the
/// per-exercise submodules.
pub struct Store;
