//! Flashcards — normalized question/answer pairs tied to a document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
  pub flashcard_id:  Uuid,
  /// The owning document; must name a live document.
  pub document_id:   Uuid,
  pub question:      String,
  pub answer:        String,
  pub is_known:      bool,
  pub review_count:  u32,
  pub last_reviewed: Option<DateTime<Utc>>,
  pub created_at:    DateTime<Utc>,
}

impl Flashcard {
  /// A fresh, unreviewed card. Text is stored as given.
  pub fn new(
    document_id: Uuid,
    question: impl Into<String>,
    answer: impl Into<String>,
    created_at: DateTime<Utc>,
  ) -> Self {
    Self {
      flashcard_id: Uuid::new_v4(),
      document_id,
      question: question.into(),
      answer: answer.into(),
      is_known: false,
      review_count: 0,
      last_reviewed: None,
      created_at,
    }
  }
}
