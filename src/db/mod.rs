mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior};
use uuid::Uuid;

use crate::config;
use crate::models::*;
use crate::rank::{self, RankStore, Ranker};

/// SQLite-backed rank storage.
///
/// Every ranking operation runs under the connection lock inside a single
/// `IMMEDIATE` transaction, so a context is never observed half re-sequenced
/// and a failed operation leaves no partial writes behind.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        tracing::debug!("Opened rank database at {}", path.display());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        Self::open(config::default_db_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    /// Run `f` against a ranker inside one transaction.
    ///
    /// Commits if `f` succeeds; any error rolls the whole operation back.
    pub fn with_ranker<T>(
        &self,
        f: impl FnOnce(&Ranker<'_, SqlRankStore<'_>>) -> rank::Result<T>,
    ) -> rank::Result<T> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let value = {
            let store = SqlRankStore::new(&tx);
            f(&Ranker::new(&store))?
        };

        tx.commit()?;
        Ok(value)
    }

    // ============================================================
    // Ranking operations
    // ============================================================

    pub fn rank_above(
        &self,
        item_id: Uuid,
        context_id: Uuid,
        reference_id: Uuid,
    ) -> rank::Result<()> {
        self.with_ranker(|r| r.rank_above(item_id, context_id, reference_id))
    }

    pub fn rank_below(
        &self,
        item_id: Uuid,
        context_id: Uuid,
        reference_id: Uuid,
    ) -> rank::Result<()> {
        self.with_ranker(|r| r.rank_below(item_id, context_id, reference_id))
    }

    pub fn rank_to_head(&self, item_id: Uuid, context_id: Uuid) -> rank::Result<()> {
        self.with_ranker(|r| r.rank_to_head(item_id, context_id))
    }

    pub fn rank_to_bottom(&self, item_id: Uuid, context_id: Uuid) -> rank::Result<()> {
        self.with_ranker(|r| r.rank_to_bottom(item_id, context_id))
    }

    pub fn rank(&self, item_id: Uuid, context_id: Uuid, placement: Placement) -> rank::Result<()> {
        self.with_ranker(|r| r.rank(item_id, context_id, placement))
    }

    pub fn move_to_context(
        &self,
        item_id: Uuid,
        from_context_id: Uuid,
        to_context_id: Uuid,
        placement: Placement,
    ) -> rank::Result<()> {
        self.with_ranker(|r| {
            r.move_to_context(item_id, from_context_id, to_context_id, placement)
        })
    }

    pub fn remove_rank(&self, item_id: Uuid, context_id: Uuid) -> rank::Result<bool> {
        self.with_ranker(|r| r.remove_rank(item_id, context_id))
    }

    pub fn remove_all_ranks_for_item(&self, item_id: Uuid) -> rank::Result<usize> {
        self.with_ranker(|r| r.remove_all_ranks_for_item(item_id))
    }

    pub fn remove_all_ranks_for_context(&self, context_id: Uuid) -> rank::Result<usize> {
        self.with_ranker(|r| r.remove_all_ranks_for_context(context_id))
    }

    // ============================================================
    // Reads
    // ============================================================

    pub fn list_ordered(&self, context_id: Uuid) -> rank::Result<Vec<Uuid>> {
        self.with_ranker(|r| r.list_ordered(context_id))
    }

    pub fn list_entries(&self, context_id: Uuid) -> rank::Result<Vec<RankEntry>> {
        self.with_ranker(|r| r.list_entries(context_id))
    }

    pub fn position_of(&self, item_id: Uuid, context_id: Uuid) -> rank::Result<Option<u32>> {
        self.with_ranker(|r| r.position_of(item_id, context_id))
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

/// [`RankStore`] over an open connection or transaction.
pub struct SqlRankStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqlRankStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

const ENTRY_COLUMNS: &str = "id, context_id, item_id, position, created_at";

impl RankStore for SqlRankStore<'_> {
    fn find_entry(&self, context_id: Uuid, item_id: Uuid) -> rank::Result<Option<RankEntry>> {
        let entry = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM story_ranks WHERE context_id = ? AND item_id = ?",
                    ENTRY_COLUMNS
                ),
                (context_id.to_string(), item_id.to_string()),
                row_to_entry,
            )
            .optional()?;
        Ok(entry)
    }

    fn create_entry(&self, context_id: Uuid, item_id: Uuid) -> rank::Result<RankEntry> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        self.conn.execute(
            "INSERT INTO story_ranks (id, context_id, item_id, position, created_at)
             VALUES (?, ?, ?, NULL, ?)",
            (
                id.to_string(),
                context_id.to_string(),
                item_id.to_string(),
                now.to_rfc3339(),
            ),
        )?;

        Ok(RankEntry {
            id,
            context_id,
            item_id,
            position: None,
            created_at: now,
        })
    }

    fn delete_entry(&self, entry: &RankEntry) -> rank::Result<()> {
        self.conn
            .execute("DELETE FROM story_ranks WHERE id = ?", [entry.id.to_string()])?;
        Ok(())
    }

    fn list_entries(&self, context_id: Uuid) -> rank::Result<Vec<RankEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM story_ranks WHERE context_id = ?
             ORDER BY position IS NULL, position, created_at, rowid",
            ENTRY_COLUMNS
        ))?;

        let entries = stmt
            .query_map([context_id.to_string()], row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    fn list_entries_for_item(&self, item_id: Uuid) -> rank::Result<Vec<RankEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM story_ranks WHERE item_id = ? ORDER BY created_at, rowid",
            ENTRY_COLUMNS
        ))?;

        let entries = stmt
            .query_map([item_id.to_string()], row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    fn update_entry(&self, entry: &RankEntry, position: u32) -> rank::Result<()> {
        self.conn.execute(
            "UPDATE story_ranks SET position = ? WHERE id = ?",
            (position, entry.id.to_string()),
        )?;
        Ok(())
    }
}

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<RankEntry> {
    Ok(RankEntry {
        id: parse_uuid(row.get::<_, String>(0)?),
        context_id: parse_uuid(row.get::<_, String>(1)?),
        item_id: parse_uuid(row.get::<_, String>(2)?),
        position: row.get(3)?,
        created_at: parse_datetime(row.get::<_, String>(4)?),
    })
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
