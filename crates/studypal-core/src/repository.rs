//! [`FlashcardRepository`] — owns the document and flashcard collections and
//! keeps each document's flashcard count in step with them.
//!
//! Every mutation is applied to memory first and then persisted. Mutations
//! that touch both collections are saved with a single
//! [`PersistenceGateway::save_all`] call so the gateway can commit them
//! together.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  Error, Result,
  answer::normalize_answer,
  codec::encode,
  concept::extract_concept,
  document::{Document, NewDocument},
  event::{ChangeEvent, EventBus},
  flashcard::Flashcard,
  gateway::{PersistenceGateway, StoreKey},
  persist::Persister,
};

const SAMPLE_TITLE: &str = "Fox & Dog";
const SAMPLE_BODY: &str = "The quick brown fox jumps over the lethargic dog.";
const SAMPLE_CARDS: [(&str, &str); 3] = [
  ("What color is the fox?", "Brown"),
  ("What does the fox do?", "Jumps over the dog"),
  ("What animal does the fox jump over?", "The dog"),
];

pub struct FlashcardRepository<G> {
  /// Most recently added first.
  documents:  Vec<Document>,
  /// Insertion order; never reordered.
  flashcards: Vec<Flashcard>,
  persister:  Persister<G>,
}

impl<G: PersistenceGateway> FlashcardRepository<G> {
  /// Load both collections from `gateway`, starting empty for anything that
  /// is missing or corrupt.
  pub fn open(gateway: Arc<G>, events: EventBus) -> Self {
    Self::load(Persister::new(gateway, events))
  }

  pub(crate) fn load(persister: Persister<G>) -> Self {
    let documents: Vec<Document> =
      persister.load(StoreKey::Documents).unwrap_or_default();
    let flashcards: Vec<Flashcard> =
      persister.load(StoreKey::Flashcards).unwrap_or_default();

    tracing::debug!(
      documents = documents.len(),
      flashcards = flashcards.len(),
      "loaded repository"
    );

    let mut repo = Self { documents, flashcards, persister };
    repo.reconcile_counts();
    repo
  }

  /// Recompute every document's flashcard count from the flashcards actually
  /// present. Only stored data written outside the engine can disagree.
  fn reconcile_counts(&mut self) {
    let mut counts: HashMap<Uuid, u32> = HashMap::new();
    for card in &self.flashcards {
      *counts.entry(card.document_id).or_default() += 1;
    }
    for doc in &mut self.documents {
      let actual = counts.get(&doc.document_id).copied().unwrap_or(0);
      if doc.flashcard_count != actual {
        tracing::warn!(
          document_id = %doc.document_id,
          stored = doc.flashcard_count,
          actual,
          "flashcard count out of step; corrected"
        );
        doc.flashcard_count = actual;
      }
    }
  }

  // ── Persistence ───────────────────────────────────────────────────────────

  fn save_documents(&self) {
    self.persister.commit([(StoreKey::Documents, encode(&self.documents))]);
  }

  fn save_flashcards(&self) {
    self.persister.commit([(StoreKey::Flashcards, encode(&self.flashcards))]);
  }

  fn save_both(&self) {
    self.persister.commit([
      (StoreKey::Documents, encode(&self.documents)),
      (StoreKey::Flashcards, encode(&self.flashcards)),
    ]);
  }

  fn publish(&self, event: ChangeEvent) { self.persister.events().publish(event); }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// All documents, most recently added first.
  pub fn documents(&self) -> &[Document] { &self.documents }

  /// All flashcards in insertion order.
  pub fn flashcards(&self) -> &[Flashcard] { &self.flashcards }

  pub fn document(&self, id: Uuid) -> Option<&Document> {
    self.documents.iter().find(|d| d.document_id == id)
  }

  pub fn flashcard(&self, id: Uuid) -> Option<&Flashcard> {
    self.flashcards.iter().find(|f| f.flashcard_id == id)
  }

  /// The flashcards of one document, in insertion order.
  pub fn query(&self, document_id: Uuid) -> Vec<&Flashcard> {
    self
      .flashcards
      .iter()
      .filter(|f| f.document_id == document_id)
      .collect()
  }

  fn document_index(&self, id: Uuid) -> Result<usize> {
    self
      .documents
      .iter()
      .position(|d| d.document_id == id)
      .ok_or(Error::DocumentNotFound(id))
  }

  fn flashcard_index(&self, id: Uuid) -> Result<usize> {
    self
      .flashcards
      .iter()
      .position(|f| f.flashcard_id == id)
      .ok_or(Error::FlashcardNotFound(id))
  }

  // ── Documents ─────────────────────────────────────────────────────────────

  /// Add a document at the front of the list, owned by `owner`.
  pub fn add_document(
    &mut self,
    input: NewDocument,
    owner: Option<Uuid>,
    now: DateTime<Utc>,
  ) -> &Document {
    let document = Document {
      document_id:     Uuid::new_v4(),
      title:           input.title,
      body:            input.body,
      source:          input.source,
      is_favorite:     false,
      question_count:  0,
      flashcard_count: 0,
      created_at:      now,
      user_id:         owner,
    };
    tracing::info!(document_id = %document.document_id, title = %document.title, "document added");

    let document_id = document.document_id;
    self.documents.insert(0, document);
    self.save_documents();
    self.publish(ChangeEvent::DocumentAdded { document_id });
    &self.documents[0]
  }

  /// Replace a document's editable fields. The flashcard count is owned by
  /// the repository and is kept from the stored copy.
  pub fn update_document(&mut self, document: Document) -> Result<()> {
    let index = self.document_index(document.document_id)?;
    let flashcard_count = self.documents[index].flashcard_count;
    self.documents[index] = Document { flashcard_count, ..document };
    self.save_documents();
    self.publish(ChangeEvent::DocumentUpdated {
      document_id: self.documents[index].document_id,
    });
    Ok(())
  }

  /// Flip the favorite flag and return its new value.
  pub fn toggle_favorite(&mut self, document_id: Uuid) -> Result<bool> {
    let index = self.document_index(document_id)?;
    let doc = &mut self.documents[index];
    doc.is_favorite = !doc.is_favorite;
    let favorite = doc.is_favorite;
    self.save_documents();
    self.publish(ChangeEvent::DocumentUpdated { document_id });
    Ok(favorite)
  }

  /// Count a question asked against a document.
  pub fn record_question(&mut self, document_id: Uuid) -> Result<u32> {
    let index = self.document_index(document_id)?;
    let doc = &mut self.documents[index];
    doc.question_count += 1;
    let count = doc.question_count;
    self.save_documents();
    self.publish(ChangeEvent::DocumentUpdated { document_id });
    Ok(count)
  }

  /// Remove a document together with every flashcard that references it.
  /// Returns the number of flashcards removed.
  pub fn delete_document(&mut self, document_id: Uuid) -> Result<usize> {
    let index = self.document_index(document_id)?;
    self.documents.remove(index);

    let before = self.flashcards.len();
    self.flashcards.retain(|f| f.document_id != document_id);
    let flashcards_removed = before - self.flashcards.len();

    tracing::info!(%document_id, flashcards_removed, "document deleted");
    self.save_both();
    self.publish(ChangeEvent::DocumentDeleted { document_id, flashcards_removed });
    Ok(flashcards_removed)
  }

  // ── Flashcards ────────────────────────────────────────────────────────────

  /// Normalize a question/answer pair into a flashcard for `document_id`.
  ///
  /// The card and the document's incremented count are saved together.
  pub fn create_flashcard(
    &mut self,
    document_id: Uuid,
    raw_question: &str,
    raw_answer: &str,
    now: DateTime<Utc>,
  ) -> Result<&Flashcard> {
    let index = self.document_index(document_id)?;

    let question = extract_concept(raw_question);
    let answer = normalize_answer(raw_answer);
    let card = Flashcard::new(document_id, question, answer, now);
    let flashcard_id = card.flashcard_id;
    tracing::info!(%flashcard_id, %document_id, question = %card.question, "flashcard created");

    self.flashcards.push(card);
    self.documents[index].flashcard_count += 1;
    self.save_both();
    self.publish(ChangeEvent::FlashcardCreated { flashcard_id, document_id });

    Ok(&self.flashcards[self.flashcards.len() - 1])
  }

  /// Replace a flashcard by identity. The owning document cannot change.
  pub fn update_flashcard(&mut self, flashcard: Flashcard) -> Result<()> {
    let index = self.flashcard_index(flashcard.flashcard_id)?;
    let document_id = self.flashcards[index].document_id;
    if flashcard.document_id != document_id {
      tracing::warn!(
        flashcard_id = %flashcard.flashcard_id,
        "ignoring attempt to move a flashcard to another document"
      );
    }
    self.flashcards[index] = Flashcard { document_id, ..flashcard };
    self.save_flashcards();
    self.publish(ChangeEvent::FlashcardUpdated {
      flashcard_id: self.flashcards[index].flashcard_id,
    });
    Ok(())
  }

  /// Record the outcome of reviewing a card.
  pub fn review(
    &mut self,
    flashcard_id: Uuid,
    known: bool,
    now: DateTime<Utc>,
  ) -> Result<&Flashcard> {
    let index = self.flashcard_index(flashcard_id)?;
    let card = &mut self.flashcards[index];
    card.is_known = known;
    card.review_count += 1;
    card.last_reviewed = Some(now);
    self.save_flashcards();
    self.publish(ChangeEvent::FlashcardUpdated { flashcard_id });
    Ok(&self.flashcards[index])
  }

  /// Remove a flashcard and decrement its document's count (floored at 0).
  pub fn delete_flashcard(&mut self, flashcard_id: Uuid) -> Result<Flashcard> {
    let index = self.flashcard_index(flashcard_id)?;
    let card = self.flashcards.remove(index);

    if let Some(doc) = self
      .documents
      .iter_mut()
      .find(|d| d.document_id == card.document_id)
    {
      doc.flashcard_count = doc.flashcard_count.saturating_sub(1);
    }

    self.save_both();
    self.publish(ChangeEvent::FlashcardDeleted {
      flashcard_id,
      document_id: card.document_id,
    });
    Ok(card)
  }

  // ── Sample data ───────────────────────────────────────────────────────────

  /// Insert the sample document and its flashcards if there are no documents
  /// yet. Returns whether anything was added.
  pub fn seed_sample_data(&mut self, owner: Option<Uuid>, now: DateTime<Utc>) -> bool {
    if !self.documents.is_empty() {
      return false;
    }

    let mut doc = Document {
      document_id:     Uuid::new_v4(),
      title:           SAMPLE_TITLE.to_owned(),
      body:            SAMPLE_BODY.to_owned(),
      source:          Default::default(),
      is_favorite:     false,
      question_count:  0,
      flashcard_count: 0,
      created_at:      now,
      user_id:         owner,
    };
    for (question, answer) in SAMPLE_CARDS {
      self.flashcards.push(Flashcard::new(doc.document_id, question, answer, now));
      doc.flashcard_count += 1;
    }
    let document_id = doc.document_id;
    self.documents.push(doc);

    tracing::info!(%document_id, "seeded sample document");
    self.save_both();
    self.publish(ChangeEvent::DocumentAdded { document_id });
    true
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::{codec::decode, gateway::MemoryGateway};

  fn repo() -> (FlashcardRepository<MemoryGateway>, Arc<MemoryGateway>) {
    let gateway = Arc::new(MemoryGateway::new());
    (FlashcardRepository::open(gateway.clone(), EventBus::new()), gateway)
  }

  fn count_matches(repo: &FlashcardRepository<MemoryGateway>) {
    for doc in repo.documents() {
      assert_eq!(
        doc.flashcard_count as usize,
        repo.query(doc.document_id).len(),
        "count mismatch for {}",
        doc.title
      );
    }
  }

  #[test]
  fn documents_are_listed_most_recent_first() {
    let (mut r, _) = repo();
    let now = Utc::now();
    r.add_document(NewDocument::new("first", ""), None, now);
    r.add_document(NewDocument::new("second", ""), None, now);
    let titles: Vec<_> = r.documents().iter().map(|d| d.title.as_str()).collect();
    assert_eq!(titles, ["second", "first"]);
  }

  #[test]
  fn create_normalizes_and_counts() {
    let (mut r, gateway) = repo();
    let now = Utc::now();
    let doc = r.add_document(NewDocument::new("Water", "..."), None, now).document_id;

    let card = r
      .create_flashcard(doc, "What is the boiling point of water", "  100 degrees  ", now)
      .unwrap()
      .clone();
    assert_eq!(card.question, "What is the boiling point water?");
    assert_eq!(card.answer, "100 degrees");
    assert!(!card.is_known);
    assert_eq!(card.review_count, 0);
    assert_eq!(r.document(doc).unwrap().flashcard_count, 1);

    let stored_docs: Vec<Document> = decode(&gateway.get(StoreKey::Documents).unwrap()).unwrap();
    let stored_cards: Vec<Flashcard> =
      decode(&gateway.get(StoreKey::Flashcards).unwrap()).unwrap();
    assert_eq!(stored_docs[0].flashcard_count, 1);
    assert_eq!(stored_cards, [card]);
  }

  #[test]
  fn create_for_missing_document_changes_nothing() {
    let (mut r, gateway) = repo();
    let missing = Uuid::new_v4();
    let err = r.create_flashcard(missing, "q", "a", Utc::now()).unwrap_err();
    assert!(matches!(err, Error::DocumentNotFound(id) if id == missing));
    assert!(r.flashcards().is_empty());
    assert_eq!(gateway.get(StoreKey::Flashcards), None);
  }

  #[test]
  fn count_tracks_any_create_delete_sequence() {
    let (mut r, _) = repo();
    let now = Utc::now();
    let a = r.add_document(NewDocument::new("a", ""), None, now).document_id;
    let b = r.add_document(NewDocument::new("b", ""), None, now).document_id;

    let mut created = Vec::new();
    for i in 0..6 {
      let doc = if i % 3 == 0 { b } else { a };
      let id = r.create_flashcard(doc, "some question here", "x", now).unwrap().flashcard_id;
      created.push(id);
      count_matches(&r);
    }
    for id in created.iter().step_by(2) {
      r.delete_flashcard(*id).unwrap();
      count_matches(&r);
    }
    assert_eq!(r.document(a).unwrap().flashcard_count, 2);
    assert_eq!(r.document(b).unwrap().flashcard_count, 1);
  }

  #[test]
  fn count_never_goes_negative() {
    let (mut r, _) = repo();
    let now = Utc::now();
    let doc = r.add_document(NewDocument::new("a", ""), None, now).document_id;
    let card = r.create_flashcard(doc, "q", "a", now).unwrap().flashcard_id;

    let mut stale = r.document(doc).unwrap().clone();
    stale.flashcard_count = 0;
    r.documents[0] = stale;

    r.delete_flashcard(card).unwrap();
    assert_eq!(r.document(doc).unwrap().flashcard_count, 0);
  }

  #[test]
  fn update_and_delete_report_missing_ids() {
    let (mut r, _) = repo();
    let ghost = Flashcard::new(Uuid::new_v4(), "q", "a", Utc::now());
    assert!(matches!(
      r.update_flashcard(ghost.clone()),
      Err(Error::FlashcardNotFound(_))
    ));
    assert!(matches!(
      r.delete_flashcard(ghost.flashcard_id),
      Err(Error::FlashcardNotFound(_))
    ));
    assert!(matches!(
      r.delete_document(Uuid::new_v4()),
      Err(Error::DocumentNotFound(_))
    ));
  }

  #[test]
  fn update_replaces_but_keeps_owner() {
    let (mut r, _) = repo();
    let now = Utc::now();
    let doc = r.add_document(NewDocument::new("a", ""), None, now).document_id;
    let mut card = r.create_flashcard(doc, "q", "a", now).unwrap().clone();

    card.answer = "edited".into();
    card.document_id = Uuid::new_v4();
    r.update_flashcard(card.clone()).unwrap();

    let stored = r.flashcard(card.flashcard_id).unwrap();
    assert_eq!(stored.answer, "edited");
    assert_eq!(stored.document_id, doc);
  }

  #[test]
  fn delete_document_cascades() {
    let (mut r, gateway) = repo();
    let now = Utc::now();
    let keep = r.add_document(NewDocument::new("keep", ""), None, now).document_id;
    let gone = r.add_document(NewDocument::new("gone", ""), None, now).document_id;
    r.create_flashcard(keep, "q1", "a", now).unwrap();
    r.create_flashcard(gone, "q2", "a", now).unwrap();
    r.create_flashcard(gone, "q3", "a", now).unwrap();

    assert_eq!(r.delete_document(gone).unwrap(), 2);
    assert!(r.document(gone).is_none());
    assert!(r.query(gone).is_empty());
    assert_eq!(r.flashcards().len(), 1);

    let stored: Vec<Flashcard> = decode(&gateway.get(StoreKey::Flashcards).unwrap()).unwrap();
    assert!(stored.iter().all(|f| f.document_id == keep));
  }

  #[test]
  fn query_preserves_insertion_order() {
    let (mut r, _) = repo();
    let now = Utc::now();
    let doc = r.add_document(NewDocument::new("a", ""), None, now).document_id;
    let other = r.add_document(NewDocument::new("b", ""), None, now).document_id;
    r.create_flashcard(doc, "one", "1", now).unwrap();
    r.create_flashcard(other, "two", "2", now).unwrap();
    r.create_flashcard(doc, "three", "3", now).unwrap();

    let answers: Vec<_> = r.query(doc).iter().map(|f| f.answer.as_str()).collect();
    assert_eq!(answers, ["1", "3"]);
  }

  #[test]
  fn review_marks_outcome() {
    let (mut r, _) = repo();
    let now = Utc::now();
    let doc = r.add_document(NewDocument::new("a", ""), None, now).document_id;
    let id = r.create_flashcard(doc, "q", "a", now).unwrap().flashcard_id;

    r.review(id, true, now).unwrap();
    let card = r.review(id, false, now).unwrap();
    assert!(!card.is_known);
    assert_eq!(card.review_count, 2);
    assert_eq!(card.last_reviewed, Some(now));
  }

  #[test]
  fn favorites_questions_and_updates() {
    let (mut r, _) = repo();
    let now = Utc::now();
    let doc = r.add_document(NewDocument::new("a", "body"), None, now).document_id;
    r.create_flashcard(doc, "q", "a", now).unwrap();

    assert!(r.toggle_favorite(doc).unwrap());
    assert!(!r.toggle_favorite(doc).unwrap());
    assert_eq!(r.record_question(doc).unwrap(), 1);
    assert_eq!(r.record_question(doc).unwrap(), 2);

    let mut edited = r.document(doc).unwrap().clone();
    edited.title = "renamed".into();
    edited.flashcard_count = 99;
    r.update_document(edited).unwrap();
    let stored = r.document(doc).unwrap();
    assert_eq!(stored.title, "renamed");
    assert_eq!(stored.flashcard_count, 1);
  }

  #[test]
  fn reopen_restores_state_and_fixes_bad_counts() {
    let (mut r, gateway) = repo();
    let now = Utc::now();
    let doc = r.add_document(NewDocument::new("a", ""), None, now).document_id;
    r.create_flashcard(doc, "q", "a", now).unwrap();
    r.create_flashcard(doc, "q", "a", now).unwrap();

    let mut docs: Vec<Document> = decode(&gateway.get(StoreKey::Documents).unwrap()).unwrap();
    docs[0].flashcard_count = 7;
    gateway.put(StoreKey::Documents, encode(&docs).unwrap());

    let reopened = FlashcardRepository::open(gateway, EventBus::new());
    assert_eq!(reopened.flashcards(), r.flashcards());
    assert_eq!(reopened.document(doc).unwrap().flashcard_count, 2);
  }

  #[test]
  fn corrupt_store_starts_empty() {
    let gateway = Arc::new(MemoryGateway::new());
    gateway.put(StoreKey::Documents, "not json");
    gateway.put(StoreKey::Flashcards, vec![0xff, 0x00]);
    let r = FlashcardRepository::open(gateway, EventBus::new());
    assert!(r.documents().is_empty());
    assert!(r.flashcards().is_empty());
  }

  #[test]
  fn failed_saves_keep_memory_and_are_reported() {
    let (mut r, gateway) = repo();
    let events = r.persister.events().clone();
    let mut rx = events.subscribe();
    gateway.set_read_only(true);

    let doc = r.add_document(NewDocument::new("a", ""), None, Utc::now()).document_id;
    assert!(r.document(doc).is_some());
    assert_eq!(gateway.get(StoreKey::Documents), None);

    assert!(matches!(
      rx.try_recv().unwrap(),
      ChangeEvent::PersistenceFailed { ref key, .. } if key == "studypal_documents"
    ));
    assert_eq!(rx.try_recv().unwrap(), ChangeEvent::DocumentAdded { document_id: doc });
  }

  #[test]
  fn sample_data_is_consistent_and_only_seeded_once() {
    let (mut r, _) = repo();
    assert!(r.seed_sample_data(None, Utc::now()));
    assert!(!r.seed_sample_data(None, Utc::now()));
    assert_eq!(r.documents().len(), 1);
    assert_eq!(r.documents()[0].title, "Fox & Dog");
    assert_eq!(r.documents()[0].flashcard_count, 3);
    count_matches(&r);
  }
}
