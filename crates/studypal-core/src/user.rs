//! The signed-in user's profile and progress counters.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::badge::Badge;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub user_id:          Uuid,
  pub name:             String,
  pub email:            String,
  pub total_documents:  u32,
  pub total_questions:  u32,
  pub total_flashcards: u32,
  /// Consecutive calendar days with at least one qualifying activity.
  pub learning_streak:  u32,
  pub last_active:      DateTime<Utc>,
  pub joined_at:        DateTime<Utc>,
  /// Only ever grows.
  pub badges:           BTreeSet<Badge>,
}

impl User {
  /// A brand-new profile with zeroed counters and no badges.
  pub fn new(
    name: impl Into<String>,
    email: impl Into<String>,
    now: DateTime<Utc>,
  ) -> Self {
    Self {
      user_id:          Uuid::new_v4(),
      name:             name.into(),
      email:            email.into(),
      total_documents:  0,
      total_questions:  0,
      total_flashcards: 0,
      learning_streak:  0,
      last_active:      now,
      joined_at:        now,
      badges:           BTreeSet::new(),
    }
  }

  pub fn has_badge(&self, badge: Badge) -> bool { self.badges.contains(&badge) }
}
