use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection};

use crate::error::AppError;

/// Per-user symbol list persisted outside the render cycle.
///
/// `add_symbol` and `remove_symbol` are idempotent.
pub trait WatchlistStore: Send + Sync {
    fn list_symbols(&self, user: &str) -> Result<Vec<String>>;
    fn add_symbol(&self, user: &str, symbol: &str) -> Result<()>;
    fn remove_symbol(&self, user: &str, symbol: &str) -> Result<()>;
}

pub struct SqliteWatchlistStore {
    conn: Mutex<Connection>,
}

impl SqliteWatchlistStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS watchlists (
                user_id TEXT NOT NULL,
                symbol TEXT NOT NULL,
                created_at_ms INTEGER NOT NULL,
                PRIMARY KEY(user_id, symbol)
            );
            "#,
        )
        .map_err(AppError::from)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("watchlist store connection lock poisoned"))
    }
}

fn normalized<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let v = value.trim();
    if v.is_empty() {
        return Err(AppError::Validation(format!("{} must not be empty", field)).into());
    }
    Ok(v)
}

impl WatchlistStore for SqliteWatchlistStore {
    fn list_symbols(&self, user: &str) -> Result<Vec<String>> {
        let user = normalized("user", user)?;
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                r#"
                SELECT symbol
                FROM watchlists
                WHERE user_id = ?1
                ORDER BY created_at_ms ASC, rowid ASC
                "#,
            )
            .map_err(AppError::from)?;

        let rows = stmt
            .query_map([user], |row| row.get::<_, String>(0))
            .map_err(AppError::from)?;

        let mut symbols = Vec::new();
        for row in rows {
            symbols.push(row.map_err(AppError::from)?);
        }
        Ok(symbols)
    }

    fn add_symbol(&self, user: &str, symbol: &str) -> Result<()> {
        let user = normalized("user", user)?;
        let symbol = normalized("symbol", symbol)?;
        let now_ms = chrono::Utc::now().timestamp_millis();
        let conn = self.lock()?;
        let inserted = conn
            .execute(
                r#"
                INSERT INTO watchlists (user_id, symbol, created_at_ms)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(user_id, symbol) DO NOTHING
                "#,
                params![user, symbol, now_ms],
            )
            .map_err(AppError::from)?;
        tracing::info!(user, symbol, inserted, "watchlist add");
        Ok(())
    }

    fn remove_symbol(&self, user: &str, symbol: &str) -> Result<()> {
        let user = normalized("user", user)?;
        let symbol = normalized("symbol", symbol)?;
        let conn = self.lock()?;
        let removed = conn
            .execute(
                "DELETE FROM watchlists WHERE user_id = ?1 AND symbol = ?2",
                params![user, symbol],
            )
            .map_err(AppError::from)?;
        tracing::info!(user, symbol, removed, "watchlist remove");
        Ok(())
    }
}
