//! Persistent candidate store backed by SQLite

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::domain::abi::{CandidateFragment, CandidateStore, InterfaceDefinition, LookupError};

/// Summary of what the store holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentStats {
    pub fragments: usize,
    pub identifiers: usize,
    pub newest: Option<DateTime<Utc>>,
}

/// SQLite-backed fragment store
///
/// Store order is insertion order. Lookups run on the blocking pool so the
/// async callers never hold the connection across an await.
#[derive(Debug, Clone)]
pub struct SqliteCandidateStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCandidateStore {
    /// Open or create the store database
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).with_context(|| format!("open db {}", path.display()))?;
        Self::with_connection(conn)
    }

    /// Throwaway store, mostly for tests
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory().context("open in-memory db")?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        init(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("fragment store connection poisoned"))
    }

    /// Save a fragment; re-recording the same signatures refreshes it in place
    pub fn record(&self, fragment: &CandidateFragment, source: &str) -> Result<()> {
        let conn = self.lock()?;
        upsert(&conn, fragment, source)
    }

    /// Save many `(fragment, source)` pairs in one transaction
    pub fn record_all<'a, I, S>(&self, fragments: I) -> Result<usize>
    where
        I: IntoIterator<Item = (&'a CandidateFragment, S)>,
        S: AsRef<str>,
    {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut count = 0;
        for (fragment, source) in fragments {
            upsert(&tx, fragment, source.as_ref())?;
            count += 1;
        }
        tx.commit()?;
        Ok(count)
    }

    /// Get store statistics
    pub fn stats(&self) -> Result<FragmentStats> {
        let conn = self.lock()?;
        let (fragments, identifiers, newest): (i64, i64, Option<i64>) = conn.query_row(
            "SELECT COUNT(*), COUNT(DISTINCT identifier), MAX(created_at) FROM fragments",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;
        Ok(FragmentStats {
            fragments: fragments as usize,
            identifiers: identifiers as usize,
            newest: newest.and_then(|secs| DateTime::from_timestamp(secs, 0)),
        })
    }
}

/// Initialize database schema
fn init(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- Interface fragments keyed by 4-byte identifier
        CREATE TABLE IF NOT EXISTS fragments (
            identifier  TEXT NOT NULL,
            signature   TEXT NOT NULL,
            definition  TEXT NOT NULL,
            source      TEXT,
            created_at  INTEGER DEFAULT (strftime('%s', 'now')),
            PRIMARY KEY (identifier, signature)
        );

        CREATE INDEX IF NOT EXISTS idx_fragments_created ON fragments(created_at);
        ",
    )?;
    Ok(())
}

fn upsert(conn: &Connection, fragment: &CandidateFragment, source: &str) -> Result<()> {
    let definition = serde_json::to_string(&fragment.definition)?;
    conn.execute(
        "INSERT INTO fragments(identifier, signature, definition, source) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(identifier, signature) DO UPDATE SET
            definition=excluded.definition,
            source=excluded.source",
        params![
            fragment.identifier_hex(),
            fragment.signature_key(),
            definition,
            source
        ],
    )?;
    Ok(())
}

fn query(
    conn: &Connection,
    identifier: [u8; 4],
    limit: usize,
) -> rusqlite::Result<Vec<CandidateFragment>> {
    let key = format!("0x{}", hex::encode(identifier));
    let mut stmt = conn.prepare(
        "SELECT signature, definition FROM fragments
         WHERE identifier = ?1 ORDER BY rowid LIMIT ?2",
    )?;

    let mut rows = stmt.query(params![key, limit as i64])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let signature: String = row.get(0)?;
        let json: String = row.get(1)?;
        match serde_json::from_str::<InterfaceDefinition>(&json) {
            Ok(definition) => out.push(CandidateFragment::new(identifier, definition)),
            Err(err) => {
                tracing::warn!(identifier = %key, %signature, %err, "skipping unreadable fragment")
            }
        }
    }
    Ok(out)
}

#[async_trait]
impl CandidateStore for SqliteCandidateStore {
    async fn lookup_by_identifier(
        &self,
        identifier: [u8; 4],
        limit: usize,
    ) -> Result<Vec<CandidateFragment>, LookupError> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| LookupError::Store("connection poisoned".to_string()))?;
            query(&conn, identifier, limit).map_err(|err| LookupError::Store(err.to_string()))
        })
        .await
        .map_err(|err| LookupError::Store(err.to_string()))?
    }
}
