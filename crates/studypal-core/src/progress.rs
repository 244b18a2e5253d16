//! [`ProgressTracker`] — the signed-in user's counters, day streak, and
//! badges.
//!
//! Streaks are computed on calendar days in a fixed UTC offset, so only the
//! day of each activity matters, never the time of day. Badges are awarded
//! after every counter or streak change and are never taken away.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use crate::{
  auth::Identity,
  badge::{Badge, award_badges},
  codec::encode,
  config::Counter,
  event::{ChangeEvent, EventBus},
  gateway::{PersistenceGateway, StoreKey},
  persist::Persister,
  user::User,
};

// ─── Pure streak logic ───────────────────────────────────────────────────────

fn calendar_day(instant: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
  instant.with_timezone(&offset).date_naive()
}

/// Apply one qualifying activity at `now` to `user`'s streak.
///
/// - same day as the last activity, or earlier: unchanged
/// - the next day: +1
/// - a later day: reset to 1
///
/// A streak of 0 always becomes 1. `last_active` is re-stamped to `now` in
/// every case, including same-day repeats.
pub fn advance_streak(user: &mut User, now: DateTime<Utc>, offset: FixedOffset) {
  let today = calendar_day(now, offset);
  let last = calendar_day(user.last_active, offset);
  let first_activity = user.learning_streak == 0;

  match (today - last).num_days() {
    1 => user.learning_streak += 1,
    gap if gap > 1 => user.learning_streak = 1,
    _ => {}
  }

  if first_activity {
    user.learning_streak = 1;
  }
  user.last_active = now;
}

fn bump(user: &mut User, counter: Counter) {
  let total = match counter {
    Counter::Documents => &mut user.total_documents,
    Counter::Questions => &mut user.total_questions,
    Counter::Flashcards => &mut user.total_flashcards,
  };
  *total = total.saturating_add(1);
}

// ─── Tracker ─────────────────────────────────────────────────────────────────

pub struct ProgressTracker<G> {
  user:      Option<User>,
  offset:    FixedOffset,
  persister: Persister<G>,
}

impl<G: PersistenceGateway> ProgressTracker<G> {
  /// Load the stored user, if any. Streak days roll over at `offset`.
  pub fn open(gateway: Arc<G>, events: EventBus, offset: FixedOffset) -> Self {
    Self::load(Persister::new(gateway, events), offset)
  }

  pub(crate) fn load(persister: Persister<G>, offset: FixedOffset) -> Self {
    let user: Option<User> = persister.load(StoreKey::CurrentUser);
    if let Some(user) = &user {
      tracing::debug!(user_id = %user.user_id, "resumed stored user");
    }
    Self { user, offset, persister }
  }

  pub fn user(&self) -> Option<&User> { self.user.as_ref() }

  fn save(&self) {
    if let Some(user) = &self.user {
      self.persister.commit([(StoreKey::CurrentUser, encode(user))]);
    }
  }

  // ── Session ───────────────────────────────────────────────────────────────

  /// Make `identity` the current user.
  ///
  /// A stored profile with the same email is resumed; otherwise a new profile
  /// is created holding the Early Adopter badge.
  pub fn sign_in(&mut self, identity: Identity, now: DateTime<Utc>) -> &User {
    let resumed = self
      .user
      .take()
      .filter(|u| u.email.eq_ignore_ascii_case(&identity.email));

    let user = match resumed {
      Some(user) => user,
      None => {
        let mut user = User::new(identity.name, identity.email, now);
        user.badges.insert(Badge::EarlyAdopter);
        tracing::info!(user_id = %user.user_id, "created user profile");
        user
      }
    };
    let user_id = user.user_id;
    let user = self.user.insert(user);
    self.persister.commit([(StoreKey::CurrentUser, encode(&*user))]);
    self.persister.events().publish(ChangeEvent::UserSignedIn { user_id });
    user
  }

  pub fn sign_out(&mut self) {
    if self.user.take().is_some() {
      self.persister.remove(StoreKey::CurrentUser);
      self.persister.events().publish(ChangeEvent::UserSignedOut);
    }
  }

  // ── Activity ──────────────────────────────────────────────────────────────

  /// Bump `counter` (if any) and advance the streak (if `streak`), then
  /// persist once.
  ///
  /// Returns the badges newly awarded. Without a signed-in user this does
  /// nothing.
  pub fn apply(
    &mut self,
    counter: Option<Counter>,
    streak: bool,
    now: DateTime<Utc>,
  ) -> Vec<Badge> {
    let offset = self.offset;
    let Some(user) = self.user.as_mut() else {
      tracing::debug!(?counter, streak, "no signed-in user; progress not recorded");
      return Vec::new();
    };
    if counter.is_none() && !streak {
      return Vec::new();
    }

    let mut awarded = Vec::new();
    if let Some(counter) = counter {
      bump(user, counter);
      awarded.extend(award_badges(user));
    }
    if streak {
      advance_streak(user, now, offset);
      awarded.extend(award_badges(user));
    }

    let user_id = user.user_id;
    for badge in &awarded {
      tracing::info!(%user_id, %badge, "badge awarded");
    }

    self.save();
    let events = self.persister.events();
    events.publish(ChangeEvent::UserUpdated { user_id });
    for badge in &awarded {
      events.publish(ChangeEvent::BadgeAwarded { user_id, badge: *badge });
    }
    awarded
  }

  pub fn increment_document_count(&mut self, now: DateTime<Utc>) -> Vec<Badge> {
    self.apply(Some(Counter::Documents), false, now)
  }

  pub fn increment_question_count(&mut self, now: DateTime<Utc>) -> Vec<Badge> {
    self.apply(Some(Counter::Questions), false, now)
  }

  pub fn increment_flashcard_count(&mut self, now: DateTime<Utc>) -> Vec<Badge> {
    self.apply(Some(Counter::Flashcards), false, now)
  }

  pub fn update_streak(&mut self, now: DateTime<Utc>) -> Vec<Badge> {
    self.apply(None, true, now)
  }
}
