//! Engine configuration, including the activity trigger table.

use chrono::{FixedOffset, Offset as _, Utc};
use serde::{Deserialize, Serialize};

/// User actions the progress tracker can react to.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
  DocumentCreated,
  QuestionAsked,
  FlashcardCreated,
}

/// The user counter each activity feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
  Documents,
  Questions,
  Flashcards,
}

impl Activity {
  pub fn counter(self) -> Counter {
    match self {
      Self::DocumentCreated => Counter::Documents,
      Self::QuestionAsked => Counter::Questions,
      Self::FlashcardCreated => Counter::Flashcards,
    }
  }
}

/// What an activity does to the user's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Trigger {
  /// Increment the activity's counter.
  #[serde(default)]
  pub count:  bool,
  /// Run the streak update.
  #[serde(default)]
  pub streak: bool,
}

/// The trigger table: one [`Trigger`] per [`Activity`].
///
/// Product policy: creating a document and asking a question extend the
/// streak, creating a flashcard only counts. Rows left out of a config file
/// keep these defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerPolicy {
  pub document_created:  Trigger,
  pub question_asked:    Trigger,
  pub flashcard_created: Trigger,
}

impl TriggerPolicy {
  pub fn rule(&self, activity: Activity) -> Trigger { *self.slot(activity) }

  pub fn set(&mut self, activity: Activity, trigger: Trigger) {
    *self.slot_mut(activity) = trigger;
  }

  fn slot(&self, activity: Activity) -> &Trigger {
    match activity {
      Activity::DocumentCreated => &self.document_created,
      Activity::QuestionAsked => &self.question_asked,
      Activity::FlashcardCreated => &self.flashcard_created,
    }
  }

  fn slot_mut(&mut self, activity: Activity) -> &mut Trigger {
    match activity {
      Activity::DocumentCreated => &mut self.document_created,
      Activity::QuestionAsked => &mut self.question_asked,
      Activity::FlashcardCreated => &mut self.flashcard_created,
    }
  }
}

impl Default for TriggerPolicy {
  fn default() -> Self {
    Self {
      document_created:  Trigger { count: true, streak: true },
      question_asked:    Trigger { count: true, streak: true },
      flashcard_created: Trigger { count: true, streak: false },
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
  /// Offset from UTC, in minutes, at which calendar days roll over for the
  /// streak.
  #[serde(default)]
  pub utc_offset_minutes: i32,
  /// Insert a sample document with flashcards when the store has none.
  #[serde(default)]
  pub seed_sample_data:   bool,
  #[serde(default)]
  pub triggers:           TriggerPolicy,
}

impl EngineConfig {
  /// The day-boundary offset; out-of-range values fall back to UTC.
  pub fn day_offset(&self) -> FixedOffset {
    self
      .utc_offset_minutes
      .checked_mul(60)
      .and_then(FixedOffset::east_opt)
      .unwrap_or_else(|| Utc.fix())
  }
}
