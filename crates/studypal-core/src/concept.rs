//! Concept extraction. Rewrites a raw question into a short, canonical,
//! concept-focused question.
//!
//! The rewrite is purely lexical: interrogatives, auxiliaries and short
//! tokens are dropped, the first few surviving words form the concept
//! phrase, and the phrase is re-prefixed with the question's interrogative.

use crate::text::capitalize_first;

/// Interrogative and auxiliary words removed before building the phrase.
const STOP_WORDS: &[&str] = &[
  "what", "who", "where", "when", "why", "how", "is", "are", "was", "were",
  "does", "do", "did", "can", "could", "would", "should",
];

/// Tokens of this many characters or fewer are dropped.
const MAX_DROPPED_LEN: usize = 2;

/// Below this many surviving tokens the question is returned unchanged.
const MIN_CONCEPT_WORDS: usize = 2;

/// Number of surviving tokens that make up the concept phrase.
const MAX_CONCEPT_WORDS: usize = 4;

/// Prefix checks in priority order, with the lead word they produce.
const LEADS: &[(&str, &str)] = &[
  ("what is", "What is"),
  ("what are", "What is"),
  ("who", "Who"),
  ("where", "Where"),
  ("when", "When"),
  ("why", "Why"),
  ("how", "How"),
];

/// The stop-word filtered tokens of `question`, lower-cased and with every
/// `?` removed.
pub fn concept_words(question: &str) -> Vec<String> {
  question
    .to_lowercase()
    .replace('?', "")
    .split_whitespace()
    .filter(|w| !STOP_WORDS.contains(w) && w.chars().count() > MAX_DROPPED_LEN)
    .map(str::to_owned)
    .collect()
}

/// Rewrite `question` into its canonical form.
///
/// Returns `question` verbatim when fewer than two concept words survive
/// filtering; otherwise the result always ends in a single `?`.
pub fn extract_concept(question: &str) -> String {
  let words = concept_words(question);
  if words.len() < MIN_CONCEPT_WORDS {
    return question.to_owned();
  }

  let phrase = words
    .iter()
    .take(MAX_CONCEPT_WORDS)
    .map(String::as_str)
    .collect::<Vec<_>>()
    .join(" ");

  let lowered = question.to_lowercase();
  if let Some((_, lead)) = LEADS.iter().find(|(prefix, _)| lowered.starts_with(prefix)) {
    return format!("{lead} {phrase}?");
  }

  let mut formatted = capitalize_first(&phrase);
  if !formatted.ends_with('?') {
    formatted.push('?');
  }
  formatted
}
