//! Flashcard sets — the per-document grouping shown to the user, derived
//! from the repository on every call and never stored.

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::{document::Document, flashcard::Flashcard};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlashcardSet {
  pub document_id:          Uuid,
  pub document_title:       String,
  /// In insertion order.
  pub flashcards:           Vec<Flashcard>,
  pub mastered_count:       usize,
  pub needs_revision_count: usize,
}

impl FlashcardSet {
  fn new(document: &Document, flashcards: Vec<Flashcard>) -> Self {
    let mastered_count = flashcards.iter().filter(|f| f.is_known).count();
    Self {
      document_id: document.document_id,
      document_title: document.title.clone(),
      needs_revision_count: flashcards.len() - mastered_count,
      mastered_count,
      flashcards,
    }
  }

  pub fn len(&self) -> usize { self.flashcards.len() }

  pub fn is_empty(&self) -> bool { self.flashcards.is_empty() }
}

/// Totals across a list of sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SetSummary {
  pub sets:           usize,
  pub flashcards:     usize,
  pub mastered:       usize,
  pub needs_revision: usize,
}

/// Group `flashcards` by document.
///
/// Sets appear in the order their document first occurs among the
/// flashcards. Groups whose document no longer exists are skipped.
pub fn flashcard_sets(documents: &[Document], flashcards: &[Flashcard]) -> Vec<FlashcardSet> {
  let mut order: Vec<Uuid> = Vec::new();
  let mut groups: HashMap<Uuid, Vec<Flashcard>> = HashMap::new();
  for card in flashcards {
    groups
      .entry(card.document_id)
      .or_insert_with(|| {
        order.push(card.document_id);
        Vec::new()
      })
      .push(card.clone());
  }

  let by_id: HashMap<Uuid, &Document> =
    documents.iter().map(|d| (d.document_id, d)).collect();

  order
    .into_iter()
    .filter_map(|document_id| {
      let cards = groups.remove(&document_id)?;
      match by_id.get(&document_id) {
        Some(doc) => Some(FlashcardSet::new(doc, cards)),
        None => {
          tracing::debug!(%document_id, orphans = cards.len(), "skipping flashcards without a document");
          None
        }
      }
    })
    .collect()
}

/// The set for a single document, if it exists and has any flashcards.
pub fn flashcard_set(
  documents: &[Document],
  flashcards: &[Flashcard],
  document_id: Uuid,
) -> Option<FlashcardSet> {
  let document = documents.iter().find(|d| d.document_id == document_id)?;
  let cards: Vec<Flashcard> = flashcards
    .iter()
    .filter(|f| f.document_id == document_id)
    .cloned()
    .collect();
  (!cards.is_empty()).then(|| FlashcardSet::new(document, cards))
}

pub fn summarize(sets: &[FlashcardSet]) -> SetSummary {
  sets.iter().fold(SetSummary { sets: sets.len(), ..Default::default() }, |mut acc, set| {
    acc.flashcards += set.len();
    acc.mastered += set.mastered_count;
    acc.needs_revision += set.needs_revision_count;
    acc
  })
}
