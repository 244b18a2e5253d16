//! [`SqliteGateway`] — the SQLite implementation of [`PersistenceGateway`].

use std::{
  path::Path,
  sync::{Mutex, MutexGuard},
};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _};
use studypal_core::gateway::{PersistenceGateway, StoreKey};

use crate::{Error, Result, schema::SCHEMA};

const UPSERT: &str = "
INSERT INTO entries (key, value, updated_at) VALUES (?1, ?2, ?3)
ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at";

/// A persistence gateway backed by a single SQLite file.
///
/// The connection sits behind a mutex; the engine is single-writer, so there
/// is no contention in practice.
pub struct SqliteGateway {
  conn: Mutex<Connection>,
}

impl SqliteGateway {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "opening sqlite gateway");
    Self::init(Connection::open(path)?)
  }

  /// Open an in-memory store, for tests.
  pub fn open_in_memory() -> Result<Self> { Self::init(Connection::open_in_memory()?) }

  fn init(conn: Connection) -> Result<Self> {
    conn.execute_batch(SCHEMA)?;
    Ok(Self { conn: Mutex::new(conn) })
  }

  fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
    self.conn.lock().map_err(|_| Error::LockPoisoned)
  }

  /// Keys currently holding a value, in key order.
  pub fn keys(&self) -> Result<Vec<String>> {
    let conn = self.lock()?;
    let mut stmt = conn.prepare("SELECT key FROM entries ORDER BY key")?;
    let keys = stmt
      .query_map([], |row| row.get(0))?
      .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(keys)
  }
}

impl PersistenceGateway for SqliteGateway {
  type Error = Error;

  fn save(&self, key: StoreKey, bytes: &[u8]) -> Result<()> {
    let conn = self.lock()?;
    conn.execute(
      UPSERT,
      rusqlite::params![key.as_str(), bytes, Utc::now().to_rfc3339()],
    )?;
    Ok(())
  }

  fn load(&self, key: StoreKey) -> Result<Option<Vec<u8>>> {
    let conn = self.lock()?;
    Ok(
      conn
        .query_row(
          "SELECT value FROM entries WHERE key = ?1",
          rusqlite::params![key.as_str()],
          |row| row.get(0),
        )
        .optional()?,
    )
  }

  fn remove(&self, key: StoreKey) -> Result<()> {
    let conn = self.lock()?;
    conn.execute("DELETE FROM entries WHERE key = ?1", rusqlite::params![key.as_str()])?;
    Ok(())
  }

  /// All entries are written in one transaction.
  fn save_all(&self, entries: &[(StoreKey, Vec<u8>)]) -> Result<()> {
    let mut conn = self.lock()?;
    let tx = conn.transaction()?;
    let at = Utc::now().to_rfc3339();
    {
      let mut stmt = tx.prepare_cached(UPSERT)?;
      for (key, bytes) in entries {
        stmt.execute(rusqlite::params![key.as_str(), bytes, at])?;
      }
    }
    tx.commit()?;
    Ok(())
  }
}
