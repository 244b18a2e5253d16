//! Change notification.
//!
//! Entities are plain data; observers learn about mutations by subscribing to
//! an [`EventBus`] rather than by watching the entities themselves.

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{badge::Badge, gateway::StoreKey};

/// Number of events a slow subscriber may lag behind before it starts
/// missing them.
const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ChangeEvent {
  DocumentAdded { document_id: Uuid },
  DocumentUpdated { document_id: Uuid },
  /// A document and the flashcards that referenced it were removed.
  DocumentDeleted { document_id: Uuid, flashcards_removed: usize },
  FlashcardCreated { flashcard_id: Uuid, document_id: Uuid },
  FlashcardUpdated { flashcard_id: Uuid },
  FlashcardDeleted { flashcard_id: Uuid, document_id: Uuid },
  UserSignedIn { user_id: Uuid },
  UserSignedOut,
  UserUpdated { user_id: Uuid },
  BadgeAwarded { user_id: Uuid, badge: Badge },
  /// A write to the gateway failed; the in-memory state is unaffected.
  PersistenceFailed { key: String, message: String },
}

/// Fan-out channel for [`ChangeEvent`]s. Cloning is cheap and every clone
/// publishes into the same channel.
#[derive(Debug, Clone)]
pub struct EventBus {
  tx: broadcast::Sender<ChangeEvent>,
}

impl EventBus {
  pub fn new() -> Self {
    let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
    Self { tx }
  }

  pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> { self.tx.subscribe() }

  /// Publish `event` to current subscribers. Having none is fine.
  pub fn publish(&self, event: ChangeEvent) {
    let _ = self.tx.send(event);
  }

  pub(crate) fn persistence_failed(&self, key: StoreKey, message: String) {
    self.publish(ChangeEvent::PersistenceFailed { key: key.to_string(), message });
  }
}

impl Default for EventBus {
  fn default() -> Self { Self::new() }
}
