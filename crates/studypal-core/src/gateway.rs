//! The `PersistenceGateway` trait and an in-memory implementation.
//!
//! The gateway is an opaque byte store addressed by a handful of fixed keys.
//! Encoding entity collections to bytes is the engine's job (see
//! [`crate::codec`]); the gateway only moves bytes.

use std::{
  collections::HashMap,
  sync::{
    Arc,
    Mutex,
    MutexGuard,
    atomic::{AtomicBool, Ordering},
  },
};

use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use thiserror::Error;

// ─── Keys ────────────────────────────────────────────────────────────────────

/// The logical keys the engine persists under.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr,
)]
pub enum StoreKey {
  #[strum(serialize = "studypal_documents")]
  Documents,
  #[strum(serialize = "studypal_flashcards")]
  Flashcards,
  #[strum(serialize = "studypal_current_user")]
  CurrentUser,
}

impl StoreKey {
  /// The stable string the key is stored under.
  pub fn as_str(self) -> &'static str { self.into() }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the durable key/value store.
///
/// Calls are synchronous. Implementations must make [`save_all`] apply all
/// entries or none of them when the backend supports it.
///
/// [`save_all`]: PersistenceGateway::save_all
pub trait PersistenceGateway: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Store `bytes` under `key`, replacing any previous value.
  fn save(&self, key: StoreKey, bytes: &[u8]) -> Result<(), Self::Error>;

  /// Fetch the bytes stored under `key`. Returns `None` if absent.
  fn load(&self, key: StoreKey) -> Result<Option<Vec<u8>>, Self::Error>;

  /// Delete whatever is stored under `key`. Absent keys are not an error.
  fn remove(&self, key: StoreKey) -> Result<(), Self::Error>;

  /// Store several entries as one unit.
  ///
  /// The default implementation saves sequentially and is therefore not
  /// atomic; backends with transactions should override it.
  fn save_all(&self, entries: &[(StoreKey, Vec<u8>)]) -> Result<(), Self::Error> {
    for (key, bytes) in entries {
      self.save(*key, bytes)?;
    }
    Ok(())
  }
}

impl<G: PersistenceGateway + ?Sized> PersistenceGateway for Arc<G> {
  type Error = G::Error;

  fn save(&self, key: StoreKey, bytes: &[u8]) -> Result<(), Self::Error> {
    (**self).save(key, bytes)
  }

  fn load(&self, key: StoreKey) -> Result<Option<Vec<u8>>, Self::Error> {
    (**self).load(key)
  }

  fn remove(&self, key: StoreKey) -> Result<(), Self::Error> { (**self).remove(key) }

  fn save_all(&self, entries: &[(StoreKey, Vec<u8>)]) -> Result<(), Self::Error> {
    (**self).save_all(entries)
  }
}

// ─── In-memory gateway ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum MemoryGatewayError {
  #[error("gateway is read-only; refused to write {0}")]
  ReadOnly(StoreKey),
}

/// A gateway that keeps everything in a `HashMap`. Useful for tests and for
/// embedding the engine without durable storage.
///
/// Can be switched to read-only to simulate a failing backend.
#[derive(Debug, Default)]
pub struct MemoryGateway {
  entries:   Mutex<HashMap<StoreKey, Vec<u8>>>,
  read_only: AtomicBool,
}

impl MemoryGateway {
  pub fn new() -> Self { Self::default() }

  /// Make every subsequent write fail (or succeed again).
  pub fn set_read_only(&self, read_only: bool) {
    self.read_only.store(read_only, Ordering::SeqCst);
  }

  /// Raw bytes under `key`, bypassing the trait.
  pub fn get(&self, key: StoreKey) -> Option<Vec<u8>> { self.lock().get(&key).cloned() }

  /// Overwrite `key` with arbitrary bytes, ignoring the read-only flag.
  pub fn put(&self, key: StoreKey, bytes: impl Into<Vec<u8>>) {
    self.lock().insert(key, bytes.into());
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<StoreKey, Vec<u8>>> {
    // A panic while holding the lock cannot leave the map half-written.
    self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  fn check_writable(&self, key: StoreKey) -> Result<(), MemoryGatewayError> {
    if self.read_only.load(Ordering::SeqCst) {
      return Err(MemoryGatewayError::ReadOnly(key));
    }
    Ok(())
  }
}

impl PersistenceGateway for MemoryGateway {
  type Error = MemoryGatewayError;

  fn save(&self, key: StoreKey, bytes: &[u8]) -> Result<(), Self::Error> {
    self.check_writable(key)?;
    self.lock().insert(key, bytes.to_vec());
    Ok(())
  }

  fn load(&self, key: StoreKey) -> Result<Option<Vec<u8>>, Self::Error> {
    Ok(self.get(key))
  }

  fn remove(&self, key: StoreKey) -> Result<(), Self::Error> {
    self.check_writable(key)?;
    self.lock().remove(&key);
    Ok(())
  }

  fn save_all(&self, entries: &[(StoreKey, Vec<u8>)]) -> Result<(), Self::Error> {
    if let Some((key, _)) = entries.first() {
      self.check_writable(*key)?;
    }
    let mut map = self.lock();
    for (key, bytes) in entries {
      map.insert(*key, bytes.clone());
    }
    Ok(())
  }
}
