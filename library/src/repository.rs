//! Game storage and filtered retrieval.

use std::future::Future;

use chess::GameRecord;
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use crate::PersistenceError;

/// Exact-match filters; `None` fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameFilter {
    pub white: Option<String>,
    pub black: Option<String>,
    pub event: Option<String>,
    pub eco: Option<String>,
    pub result: Option<String>,
    pub date: Option<String>,
}

impl GameFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A game as read back from the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredGame {
    pub id: i64,
    pub import_date: String,
    #[serde(flatten)]
    pub record: GameRecord,
}

/// Repository for imported games.
pub trait GameRepository: Send + Sync {
    /// Store one game, creating or updating both players. Returns the new id.
    fn add_game(
        &self,
        record: &GameRecord,
    ) -> impl Future<Output = Result<i64, PersistenceError>> + Send;
    /// Games matching `filter`, newest date first, then newest id.
    fn get_games(
        &self,
        filter: &GameFilter,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> impl Future<Output = Result<Vec<StoredGame>, PersistenceError>> + Send;
    fn get_game(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<StoredGame>, PersistenceError>> + Send;
    fn count_games(
        &self,
        filter: &GameFilter,
    ) -> impl Future<Output = Result<u64, PersistenceError>> + Send;
}

/// Row type for game queries, mapped via `sqlx::FromRow`.
#[derive(sqlx::FromRow)]
struct GameRow {
    id: i64,
    event: String,
    site: String,
    date: String,
    round: String,
    white_name: String,
    black_name: String,
    result: String,
    white_elo: Option<i64>,
    black_elo: Option<i64>,
    eco: String,
    pgn: String,
    import_date: String,
}

impl From<GameRow> for StoredGame {
    fn from(r: GameRow) -> Self {
        Self {
            id: r.id,
            import_date: r.import_date,
            record: GameRecord {
                event: r.event,
                site: r.site,
                date: r.date,
                round: r.round,
                white: r.white_name,
                black: r.black_name,
                result: r.result,
                white_elo: r.white_elo.and_then(|v| u16::try_from(v).ok()),
                black_elo: r.black_elo.and_then(|v| u16::try_from(v).ok()),
                eco: r.eco,
                pgn_text: r.pgn,
            },
        }
    }
}

const SELECT_GAMES: &str = r#"
    SELECT g.id, g.event, g.site, g.date, g.round,
           w.name AS white_name, b.name AS black_name,
           g.result, g.white_elo, g.black_elo, g.eco, g.pgn, g.import_date
    FROM games g
    JOIN players w ON g.white_id = w.id
    JOIN players b ON g.black_id = b.id
"#;

fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &GameFilter) {
    let conditions = [
        ("w.name", &filter.white),
        ("b.name", &filter.black),
        ("g.event", &filter.event),
        ("g.eco", &filter.eco),
        ("g.result", &filter.result),
        ("g.date", &filter.date),
    ];

    let mut first = true;
    for (column, value) in conditions {
        let Some(value) = value else {
            continue;
        };
        qb.push(if first { " WHERE " } else { " AND " });
        first = false;
        qb.push(column).push(" = ").push_bind(value.clone());
    }
}

/// SQLite implementation of [`GameRepository`].
pub struct SqliteGameRepository {
    pool: SqlitePool,
}

impl SqliteGameRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl GameRepository for SqliteGameRepository {
    async fn add_game(&self, record: &GameRecord) -> Result<i64, PersistenceError> {
        let mut tx = self.pool.begin().await?;

        let white_id = get_or_create_player(&mut tx, &record.white).await?;
        let black_id = get_or_create_player(&mut tx, &record.black).await?;

        let id = sqlx::query(
            r#"
            INSERT INTO games
                (event, site, date, round, white_id, black_id, result,
                 white_elo, black_elo, eco, pgn)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.event)
        .bind(&record.site)
        .bind(&record.date)
        .bind(&record.round)
        .bind(white_id)
        .bind(black_id)
        .bind(&record.result)
        .bind(record.white_elo.map(i64::from))
        .bind(record.black_elo.map(i64::from))
        .bind(&record.eco)
        .bind(&record.pgn_text)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        tx.commit().await?;
        tracing::debug!(id, "stored game {} vs {}", record.white, record.black);
        Ok(id)
    }

    async fn get_games(
        &self,
        filter: &GameFilter,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<StoredGame>, PersistenceError> {
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_GAMES);
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY g.date DESC, g.id DESC");

        // SQLite needs a LIMIT before an OFFSET; -1 means unbounded.
        if limit.is_some() || offset.is_some() {
            qb.push(" LIMIT ")
                .push_bind(limit.map_or(-1, i64::from));
            if let Some(offset) = offset {
                qb.push(" OFFSET ").push_bind(i64::from(offset));
            }
        }

        let rows: Vec<GameRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(StoredGame::from).collect())
    }

    async fn get_game(&self, id: i64) -> Result<Option<StoredGame>, PersistenceError> {
        let row: Option<GameRow> = sqlx::query_as(&format!("{} WHERE g.id = ?", SELECT_GAMES))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(StoredGame::from))
    }

    async fn count_games(&self, filter: &GameFilter) -> Result<u64, PersistenceError> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT COUNT(*) FROM games g \
             JOIN players w ON g.white_id = w.id \
             JOIN players b ON g.black_id = b.id",
        );
        push_filter(&mut qb, filter);
        let (count,): (i64,) = qb.build_query_as().fetch_one(&self.pool).await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

/// Look up a player by name, bumping their game count and last-seen date,
/// or insert them with a count of one.
async fn get_or_create_player(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<i64, PersistenceError> {
    let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM players WHERE name = ?")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

    if let Some((id,)) = existing {
        sqlx::query(
            r#"
            UPDATE players
            SET last_seen_date = CURRENT_TIMESTAMP,
                total_games = total_games + 1
            WHERE id = ?
            "#,
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;
        return Ok(id);
    }

    let id = sqlx::query("INSERT INTO players (name, total_games) VALUES (?, 1)")
        .bind(name)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();
    tracing::debug!(id, "new player {}", name);
    Ok(id)
}
