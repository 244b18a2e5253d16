//! Documents — the source texts questions are asked against.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// How a document's text was captured.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SourceKind {
  #[default]
  Manual,
  Camera,
  Ocr,
  Gallery,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
  pub document_id:     Uuid,
  pub title:           String,
  pub body:            String,
  pub source:          SourceKind,
  pub is_favorite:     bool,
  pub question_count:  u32,
  /// Always equal to the number of flashcards referencing this document.
  /// Maintained by the repository; never set by callers.
  pub flashcard_count: u32,
  pub created_at:      DateTime<Utc>,
  pub user_id:         Option<Uuid>,
}

/// Input to [`crate::repository::FlashcardRepository::add_document`].
/// Identity, timestamps, counters and ownership are assigned by the
/// repository.
#[derive(Debug, Clone)]
pub struct NewDocument {
  pub title:  String,
  pub body:   String,
  pub source: SourceKind,
}

impl NewDocument {
  pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
    Self { title: title.into(), body: body.into(), source: SourceKind::Manual }
  }

  pub fn with_source(mut self, source: SourceKind) -> Self {
    self.source = source;
    self
  }
}
