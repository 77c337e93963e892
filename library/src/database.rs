//! The game library file: a SQLite database holding `players` and `games`.
//!
//! Every open applies the embedded schema under `migrations/`, so a fresh
//! path becomes an empty library and an existing one is upgraded in place.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;

use crate::PersistenceError;

/// Connections used by a file-backed library. Imports are written from one
/// task, so a handful covers concurrent searches.
const FILE_CONNECTIONS: u32 = 5;

/// An open game library.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the library at `path`, creating the file and its parent
    /// directories on first use.
    #[tracing::instrument(level = "debug")]
    pub async fn open(path: &Path) -> Result<Self, PersistenceError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let url = format!("sqlite:{}", path.display());
        let options = SqliteConnectOptions::from_str(&url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let db = Self::connect(options, FILE_CONNECTIONS).await?;
        tracing::info!("Opened game library at {}", path.display());
        Ok(db)
    }

    /// A throwaway library that lives as long as the returned value.
    ///
    /// SQLite gives each `:memory:` connection its own database, so the pool
    /// is held to one connection.
    pub async fn open_in_memory() -> Result<Self, PersistenceError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        Self::connect(options, 1).await
    }

    async fn connect(
        options: SqliteConnectOptions,
        max_connections: u32,
    ) -> Result<Self, PersistenceError> {
        // games reference players; keep SQLite honest about it
        let options = options.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| PersistenceError::Migration(e.to_string()))?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn names(db: &Database, kind: &str) -> Vec<String> {
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = ? ORDER BY name")
            .bind(kind)
            .fetch_all(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_new_library_has_schema() {
        let db = Database::open_in_memory().await.unwrap();

        let tables = names(&db, "table").await;
        assert!(tables.iter().any(|t| t == "players"));
        assert!(tables.iter().any(|t| t == "games"));

        let indexes: Vec<String> = names(&db, "index")
            .await
            .into_iter()
            .filter(|n| n.starts_with("idx_"))
            .collect();
        assert_eq!(indexes.len(), 5);
    }

    #[tokio::test]
    async fn test_game_needs_known_players() {
        let db = Database::open_in_memory().await.unwrap();
        let orphan = sqlx::query(
            "INSERT INTO games (event, site, date, round, white_id, black_id, result, eco, pgn)
             VALUES ('?', '?', '????.??.??', '?', 1, 2, '*', '', '*')",
        )
        .execute(db.pool())
        .await;
        assert!(orphan.is_err());
    }

    #[tokio::test]
    async fn test_library_file_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("master.db");

        let db = Database::open(&db_path).await.unwrap();
        sqlx::query("INSERT INTO players (name, total_games) VALUES ('Tal', 1)")
            .execute(db.pool())
            .await
            .unwrap();
        db.close().await;
        assert!(db_path.exists());

        let db = Database::open(&db_path).await.unwrap();
        let players: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM players")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(players, 1);
    }
}
