//! [`StudyEngine`] — the composition of repository and progress tracker.
//!
//! Built once at the composition root. Every user action goes through here:
//! the repository mutation happens first, then the action's trigger from the
//! configured [`TriggerPolicy`](crate::config::TriggerPolicy) is applied to
//! the tracker. All mutators take `&mut self`, so one engine has exactly one
//! writer at a time.

use std::sync::Arc;

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
  Result,
  auth::Identity,
  badge::Badge,
  clock::{Clock, SystemClock},
  config::{Activity, EngineConfig},
  document::{Document, NewDocument},
  event::{ChangeEvent, EventBus},
  flashcard::Flashcard,
  gateway::PersistenceGateway,
  persist::Persister,
  progress::ProgressTracker,
  repository::FlashcardRepository,
  sets::{self, FlashcardSet, SetSummary},
  user::User,
};

pub struct StudyEngine<G, C = SystemClock> {
  repository: FlashcardRepository<G>,
  progress:   ProgressTracker<G>,
  clock:      C,
  config:     EngineConfig,
  events:     EventBus,
}

impl<G: PersistenceGateway> StudyEngine<G> {
  /// Open an engine on the wall clock.
  pub fn open(gateway: Arc<G>, config: EngineConfig) -> Self {
    Self::with_clock(gateway, SystemClock, config)
  }
}

impl<G: PersistenceGateway, C: Clock> StudyEngine<G, C> {
  /// Load all state from `gateway` and, if configured, seed the sample
  /// document into an empty store.
  pub fn with_clock(gateway: Arc<G>, clock: C, config: EngineConfig) -> Self {
    let events = EventBus::new();
    let persister = Persister::new(gateway, events.clone());
    let repository = FlashcardRepository::load(persister.clone());
    let progress = ProgressTracker::load(persister, config.day_offset());

    let mut engine = Self { repository, progress, clock, config, events };
    if engine.config.seed_sample_data {
      let owner = engine.progress.user().map(|u| u.user_id);
      let now = engine.clock.now();
      engine.repository.seed_sample_data(owner, now);
    }
    engine
  }

  pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> { self.events.subscribe() }

  pub fn config(&self) -> &EngineConfig { &self.config }

  pub fn repository(&self) -> &FlashcardRepository<G> { &self.repository }

  pub fn progress(&self) -> &ProgressTracker<G> { &self.progress }

  pub fn current_user(&self) -> Option<&User> { self.progress.user() }

  /// Feed `activity` to the tracker as the trigger table dictates.
  fn record(&mut self, activity: Activity) -> Vec<Badge> {
    let trigger = self.config.triggers.rule(activity);
    let now = self.clock.now();
    let counter = trigger.count.then(|| activity.counter());
    self.progress.apply(counter, trigger.streak, now)
  }

  // ── Session ───────────────────────────────────────────────────────────────

  pub fn sign_in(&mut self, identity: Identity) -> &User {
    let now = self.clock.now();
    self.progress.sign_in(identity, now)
  }

  pub fn sign_out(&mut self) { self.progress.sign_out() }

  // ── Documents ─────────────────────────────────────────────────────────────

  /// Add a document owned by the current user.
  pub fn add_document(&mut self, input: NewDocument) -> Document {
    let owner = self.progress.user().map(|u| u.user_id);
    let now = self.clock.now();
    let document = self.repository.add_document(input, owner, now).clone();
    self.record(Activity::DocumentCreated);
    document
  }

  pub fn update_document(&mut self, document: Document) -> Result<()> {
    self.repository.update_document(document)
  }

  pub fn toggle_favorite(&mut self, document_id: Uuid) -> Result<bool> {
    self.repository.toggle_favorite(document_id)
  }

  /// Delete a document and its flashcards. Returns how many flashcards went
  /// with it.
  pub fn delete_document(&mut self, document_id: Uuid) -> Result<usize> {
    self.repository.delete_document(document_id)
  }

  /// Record that a question was asked against a document.
  pub fn ask_question(&mut self, document_id: Uuid) -> Result<Vec<Badge>> {
    self.repository.record_question(document_id)?;
    Ok(self.record(Activity::QuestionAsked))
  }

  // ── Flashcards ────────────────────────────────────────────────────────────

  /// Turn a question/answer pair into a flashcard on `document_id`.
  pub fn create_flashcard(
    &mut self,
    document_id: Uuid,
    raw_question: &str,
    raw_answer: &str,
  ) -> Result<Flashcard> {
    let now = self.clock.now();
    let card = self
      .repository
      .create_flashcard(document_id, raw_question, raw_answer, now)?
      .clone();
    self.record(Activity::FlashcardCreated);
    Ok(card)
  }

  pub fn update_flashcard(&mut self, flashcard: Flashcard) -> Result<()> {
    self.repository.update_flashcard(flashcard)
  }

  pub fn review_flashcard(&mut self, flashcard_id: Uuid, known: bool) -> Result<Flashcard> {
    let now = self.clock.now();
    Ok(self.repository.review(flashcard_id, known, now)?.clone())
  }

  pub fn delete_flashcard(&mut self, flashcard_id: Uuid) -> Result<Flashcard> {
    self.repository.delete_flashcard(flashcard_id)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  pub fn documents(&self) -> &[Document] { self.repository.documents() }

  pub fn flashcards_for(&self, document_id: Uuid) -> Vec<&Flashcard> {
    self.repository.query(document_id)
  }

  pub fn flashcard_sets(&self) -> Vec<FlashcardSet> {
    sets::flashcard_sets(self.repository.documents(), self.repository.flashcards())
  }

  pub fn flashcard_set(&self, document_id: Uuid) -> Option<FlashcardSet> {
    sets::flashcard_set(
      self.repository.documents(),
      self.repository.flashcards(),
      document_id,
    )
  }

  pub fn summary(&self) -> SetSummary { sets::summarize(&self.flashcard_sets()) }
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone, Utc};

  use super::*;
  use crate::{
    clock::ManualClock,
    config::Trigger,
    gateway::{MemoryGateway, StoreKey},
  };

  struct Fixture {
    engine:  StudyEngine<MemoryGateway, ManualClock>,
    clock:   ManualClock,
    gateway: Arc<MemoryGateway>,
  }

  fn fixture_with(config: EngineConfig) -> Fixture {
    let gateway = Arc::new(MemoryGateway::new());
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 9, 2, 8, 0, 0).unwrap());
    let mut engine = StudyEngine::with_clock(gateway.clone(), clock.clone(), config);
    engine.sign_in(Identity { name: "Ada".into(), email: "ada@example.com".into() });
    Fixture { engine, clock, gateway }
  }

  fn fixture() -> Fixture { fixture_with(EngineConfig::default()) }

  #[test]
  fn document_creation_counts_and_extends_streak() {
    let mut f = fixture();
    let doc = f.engine.add_document(NewDocument::new("Cells", "..."));

    let user = f.engine.current_user().unwrap();
    assert_eq!(doc.user_id, Some(user.user_id));
    assert_eq!(user.total_documents, 1);
    assert_eq!(user.learning_streak, 1);
  }

  #[test]
  fn flashcard_creation_does_not_touch_the_streak() {
    let mut f = fixture();
    let doc = f.engine.add_document(NewDocument::new("Cells", "...")).document_id;
    let before = f.engine.current_user().unwrap().clone();

    f.clock.advance(Duration::days(1));
    f.engine.create_flashcard(doc, "What is ATP?", "energy").unwrap();

    let after = f.engine.current_user().unwrap();
    assert_eq!(after.total_flashcards, 1);
    assert_eq!(after.learning_streak, before.learning_streak);
    assert_eq!(after.last_active, before.last_active);

    // Asking a question the same day does extend it.
    f.engine.ask_question(doc).unwrap();
    let asked = f.engine.current_user().unwrap();
    assert_eq!(asked.learning_streak, before.learning_streak + 1);
    assert_eq!(asked.total_questions, 1);
  }

  #[test]
  fn trigger_table_is_configurable() {
    let mut config = EngineConfig::default();
    config
      .triggers
      .set(Activity::FlashcardCreated, Trigger { count: true, streak: true });
    config.triggers.set(Activity::DocumentCreated, Trigger::default());
    let mut f = fixture_with(config);

    let doc = f.engine.add_document(NewDocument::new("a", "")).document_id;
    assert_eq!(f.engine.current_user().unwrap().total_documents, 0);
    assert_eq!(f.engine.current_user().unwrap().learning_streak, 0);

    f.engine.create_flashcard(doc, "q", "a").unwrap();
    assert_eq!(f.engine.current_user().unwrap().learning_streak, 1);
  }

  #[test]
  fn ask_question_updates_document_and_user() {
    let mut f = fixture();
    let doc = f.engine.add_document(NewDocument::new("a", "")).document_id;
    f.engine.ask_question(doc).unwrap();
    f.engine.ask_question(doc).unwrap();
    assert_eq!(f.engine.repository().document(doc).unwrap().question_count, 2);
    assert_eq!(f.engine.current_user().unwrap().total_questions, 2);

    assert!(f.engine.ask_question(Uuid::new_v4()).is_err());
    assert_eq!(f.engine.current_user().unwrap().total_questions, 2);
  }

  #[test]
  fn deleting_a_document_removes_its_set() {
    let mut f = fixture();
    let a = f.engine.add_document(NewDocument::new("a", "")).document_id;
    let b = f.engine.add_document(NewDocument::new("b", "")).document_id;
    f.engine.create_flashcard(a, "first question here", "x").unwrap();
    f.engine.create_flashcard(b, "second question here", "y").unwrap();
    assert_eq!(f.engine.flashcard_sets().len(), 2);

    f.engine.delete_document(a).unwrap();
    let sets = f.engine.flashcard_sets();
    assert_eq!(sets.len(), 1);
    assert!(sets.iter().all(|s| s.document_id != a));
    assert!(f.engine.flashcard_set(a).is_none());
    assert!(f.engine.flashcards_for(a).is_empty());
  }

  #[test]
  fn knowledge_master_survives_deletions() {
    let mut f = fixture();
    let doc = f.engine.add_document(NewDocument::new("a", "")).document_id;
    let ids: Vec<Uuid> = (0..50)
      .map(|_| f.engine.create_flashcard(doc, "q", "a").unwrap().flashcard_id)
      .collect();
    assert!(f.engine.current_user().unwrap().has_badge(Badge::KnowledgeMaster));

    for id in ids {
      f.engine.delete_flashcard(id).unwrap();
    }
    f.engine.delete_document(doc).unwrap();
    assert!(f.engine.current_user().unwrap().has_badge(Badge::KnowledgeMaster));
  }

  #[test]
  fn review_feeds_mastery() {
    let mut f = fixture();
    let doc = f.engine.add_document(NewDocument::new("a", "")).document_id;
    let one = f.engine.create_flashcard(doc, "q1", "a").unwrap().flashcard_id;
    f.engine.create_flashcard(doc, "q2", "a").unwrap();

    let reviewed = f.engine.review_flashcard(one, true).unwrap();
    assert_eq!(reviewed.last_reviewed, Some(f.clock.now()));

    let set = f.engine.flashcard_set(doc).unwrap();
    assert_eq!((set.mastered_count, set.needs_revision_count), (1, 1));
    assert_eq!(
      f.engine.summary(),
      SetSummary { sets: 1, flashcards: 2, mastered: 1, needs_revision: 1 }
    );
  }

  #[test]
  fn state_survives_reopen() {
    let mut f = fixture();
    let doc = f.engine.add_document(NewDocument::new("a", "")).document_id;
    f.engine.create_flashcard(doc, "What is the boiling point of water", "100C").unwrap();

    let reopened = StudyEngine::with_clock(f.gateway.clone(), f.clock.clone(), EngineConfig::default());
    assert_eq!(reopened.documents(), f.engine.documents());
    assert_eq!(reopened.flashcard_sets(), f.engine.flashcard_sets());
    assert_eq!(reopened.current_user(), f.engine.current_user());
  }

  #[test]
  fn seeding_only_fills_an_empty_store() {
    let config = EngineConfig { seed_sample_data: true, ..Default::default() };
    let f = fixture_with(config.clone());
    assert_eq!(f.engine.documents().len(), 1);
    assert_eq!(f.engine.flashcard_sets()[0].len(), 3);

    let again = StudyEngine::with_clock(f.gateway.clone(), f.clock.clone(), config);
    assert_eq!(again.documents().len(), 1);
  }

  #[test]
  fn events_follow_mutations() {
    let mut f = fixture();
    let mut rx = f.engine.subscribe();
    let doc = f.engine.add_document(NewDocument::new("a", "")).document_id;

    assert_eq!(rx.try_recv().unwrap(), ChangeEvent::DocumentAdded { document_id: doc });
    assert!(matches!(rx.try_recv().unwrap(), ChangeEvent::UserUpdated { .. }));
  }

  #[test]
  fn persistence_failure_leaves_memory_authoritative() {
    let mut f = fixture();
    f.gateway.set_read_only(true);
    let doc = f.engine.add_document(NewDocument::new("a", "")).document_id;
    f.engine.create_flashcard(doc, "q", "a").unwrap();

    assert_eq!(f.engine.repository().document(doc).unwrap().flashcard_count, 1);
    assert_eq!(f.gateway.get(StoreKey::Documents), None);
  }
}
