//! Glue between the engine's services and a [`PersistenceGateway`]: lossy
//! loads and best-effort, batched saves that report instead of failing.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::{
  codec,
  event::EventBus,
  gateway::{PersistenceGateway, StoreKey},
};

pub(crate) struct Persister<G> {
  gateway: Arc<G>,
  events:  EventBus,
}

impl<G> Clone for Persister<G> {
  fn clone(&self) -> Self {
    Self { gateway: Arc::clone(&self.gateway), events: self.events.clone() }
  }
}

impl<G: PersistenceGateway> Persister<G> {
  pub fn new(gateway: Arc<G>, events: EventBus) -> Self { Self { gateway, events } }

  pub fn events(&self) -> &EventBus { &self.events }

  /// Decode the value under `key`. Absent, unreadable, or corrupt data all
  /// yield `None`; the caller starts from empty.
  pub fn load<T: DeserializeOwned>(&self, key: StoreKey) -> Option<T> {
    let bytes = match self.gateway.load(key) {
      Ok(Some(bytes)) => bytes,
      Ok(None) => {
        tracing::debug!(%key, "no stored data");
        return None;
      }
      Err(e) => {
        tracing::warn!(%key, error = %e, "failed to read from gateway; starting empty");
        return None;
      }
    };

    match codec::decode(&bytes) {
      Ok(value) => Some(value),
      Err(e) => {
        tracing::warn!(%key, error = %e, "stored data is corrupt; starting empty");
        None
      }
    }
  }

  /// Encode and save every entry as one unit. Failures are logged and
  /// published; nothing is returned because memory stays authoritative.
  pub fn commit<I>(&self, entries: I)
  where
    I: IntoIterator<Item = (StoreKey, crate::Result<Vec<u8>>)>,
  {
    let mut batch = Vec::new();
    for (key, encoded) in entries {
      match encoded {
        Ok(bytes) => batch.push((key, bytes)),
        Err(e) => {
          tracing::warn!(%key, error = %e, "failed to encode; nothing saved");
          self.events.persistence_failed(key, e.to_string());
          return;
        }
      }
    }

    if let Err(e) = self.gateway.save_all(&batch) {
      let keys: Vec<String> = batch.iter().map(|(k, _)| k.to_string()).collect();
      tracing::warn!(keys = ?keys, error = %e, "failed to persist");
      for (key, _) in &batch {
        self.events.persistence_failed(*key, e.to_string());
      }
    }
  }

  pub fn remove(&self, key: StoreKey) {
    if let Err(e) = self.gateway.remove(key) {
      tracing::warn!(%key, error = %e, "failed to remove");
      self.events.persistence_failed(key, e.to_string());
    }
  }
}
