//! Answer normalization. Trims a raw answer and condenses long answers to
//! their leading sentence or two.

use crate::text::capitalize_first;

/// Answers longer than this many characters are condensed.
const LONG_ANSWER_CHARS: usize = 100;

/// A leading sentence shorter than this is joined with the next one.
const SHORT_SENTENCE_CHARS: usize = 50;

const SENTENCE_DELIMITERS: [char; 3] = ['.', '!', '?'];

/// Clean `answer` for display on a flashcard.
///
/// Never fails; empty (or all-whitespace) input yields an empty string.
pub fn normalize_answer(answer: &str) -> String {
  let mut clean = answer.trim().to_owned();

  if clean.chars().count() > LONG_ANSWER_CHARS
    && let Some(condensed) = condense(&clean)
  {
    clean = condensed;
  }

  capitalize_first(&clean)
}

/// Keep the first sentence, plus the second when the first is short, and
/// make sure the result ends in terminal punctuation.
fn condense(text: &str) -> Option<String> {
  let sentences: Vec<&str> = text
    .split(SENTENCE_DELIMITERS)
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .collect();

  let mut condensed = (*sentences.first()?).to_owned();
  if condensed.chars().count() < SHORT_SENTENCE_CHARS
    && let Some(second) = sentences.get(1)
  {
    condensed.push_str(". ");
    condensed.push_str(second);
  }
  if !condensed.ends_with('.') && !condensed.ends_with('!') {
    condensed.push('.');
  }
  Some(condensed)
}
