//! SQLite game library.
//!
//! [`Database`] opens the pool and applies the embedded migrations from
//! `migrations/`. [`SqliteGameRepository`] implements [`GameRepository`]
//! over it: games are stored as flat [`chess::GameRecord`] columns plus the
//! exported PGN, with players deduplicated by name.

mod database;
mod repository;

pub use database::Database;
pub use repository::{GameFilter, GameRepository, SqliteGameRepository, StoredGame};

/// Errors from the game library.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Migration failed: {0}")]
    Migration(String),
}
