//! Plain-text rendering of engine state for the terminal.

use studypal_core::{
  badge::Badge,
  document::Document,
  flashcard::Flashcard,
  sets::{FlashcardSet, SetSummary},
  user::User,
};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn document(doc: &Document) -> String {
  let star = if doc.is_favorite { "*" } else { " " };
  format!(
    "{star} {id}  {title}  [{source}]  {questions} questions, {cards} flashcards  ({created})",
    id = doc.document_id,
    title = doc.title,
    source = doc.source,
    questions = doc.question_count,
    cards = doc.flashcard_count,
    created = doc.created_at.format(DATE_FORMAT),
  )
}

pub fn flashcard(index: usize, card: &Flashcard) -> String {
  let mark = if card.is_known { "known" } else { "review" };
  let mut out = format!(
    "#{index} {id} [{mark}]\n   Q: {q}\n   A: {a}",
    id = card.flashcard_id,
    q = card.question,
    a = card.answer,
  );
  if card.review_count > 0 {
    out.push_str(&format!("\n   {} reviews", card.review_count));
    if let Some(at) = card.last_reviewed {
      out.push_str(&format!(", last {}", at.format(DATE_FORMAT)));
    }
  }
  out
}

pub fn set(set: &FlashcardSet) -> String {
  format!(
    "{title} ({id}): {total} cards, {mastered} mastered, {review} to review",
    title = set.document_title,
    id = set.document_id,
    total = set.len(),
    mastered = set.mastered_count,
    review = set.needs_revision_count,
  )
}

pub fn summary(summary: &SetSummary) -> String {
  format!(
    "{} sets, {} cards: {} mastered, {} to review",
    summary.sets, summary.flashcards, summary.mastered, summary.needs_revision
  )
}

pub fn profile(user: &User) -> String {
  let mut out = format!(
    "{name} <{email}>\n  documents:  {docs}\n  questions:  {qs}\n  flashcards: {cards}\n  streak:     {streak} day(s), last active {last}\n  badges:",
    name = user.name,
    email = user.email,
    docs = user.total_documents,
    qs = user.total_questions,
    cards = user.total_flashcards,
    streak = user.learning_streak,
    last = user.last_active.format(DATE_FORMAT),
  );
  if user.badges.is_empty() {
    out.push_str(" none");
  }
  for badge in &user.badges {
    out.push_str(&format!("\n    {}", badge_line(*badge)));
  }
  out
}

pub fn badge_line(badge: Badge) -> String {
  let info = badge.info();
  format!("{}: {}", info.name, info.description)
}
