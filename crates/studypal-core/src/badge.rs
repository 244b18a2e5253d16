//! The badge catalog.
//!
//! Badges are addressed by a stable name, never by their position in the
//! catalog. The serialised form of a [`Badge`] is its display name, which is
//! what ends up in a persisted user profile.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator as _, IntoStaticStr};

use crate::user::User;

/// Descriptive metadata shown alongside a badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BadgeInfo {
  pub name:        &'static str,
  pub description: &'static str,
  /// SF Symbols-style icon identifier.
  pub icon:        &'static str,
}

/// Every badge a user can hold.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
pub enum Badge {
  #[serde(rename = "Curious Learner")]
  #[strum(serialize = "Curious Learner")]
  CuriousLearner,
  #[serde(rename = "Research Pro")]
  #[strum(serialize = "Research Pro")]
  ResearchPro,
  #[serde(rename = "Study Streak")]
  #[strum(serialize = "Study Streak")]
  StudyStreak,
  #[serde(rename = "Knowledge Master")]
  #[strum(serialize = "Knowledge Master")]
  KnowledgeMaster,
  #[serde(rename = "Early Adopter")]
  #[strum(serialize = "Early Adopter")]
  EarlyAdopter,
}

impl Badge {
  /// Stable display name; also the persisted key.
  pub fn name(self) -> &'static str { self.into() }

  pub fn info(self) -> BadgeInfo {
    let (description, icon) = match self {
      Self::CuriousLearner => ("Asked 10 questions", "questionmark.circle.fill"),
      Self::ResearchPro => ("Added 10 documents", "doc.text.magnifyingglass"),
      Self::StudyStreak => ("Studied 7 days in a row", "flame.fill"),
      Self::KnowledgeMaster => ("Created 50 flashcards", "brain.head.profile"),
      Self::EarlyAdopter => ("Joined StudyPal early", "star.fill"),
    };
    BadgeInfo { name: self.name(), description, icon }
  }

  /// Whether `user`'s counters satisfy this badge's threshold.
  ///
  /// Early Adopter has no threshold; it is granted when a profile is created.
  pub fn is_earned_by(self, user: &User) -> bool {
    match self {
      Self::CuriousLearner => user.total_questions >= 10,
      Self::ResearchPro => user.total_documents >= 10,
      Self::StudyStreak => user.learning_streak >= 7,
      Self::KnowledgeMaster => user.total_flashcards >= 50,
      Self::EarlyAdopter => false,
    }
  }
}

/// The full catalog with metadata, in declaration order.
pub fn catalog() -> Vec<BadgeInfo> { Badge::iter().map(Badge::info).collect() }

/// Award every threshold badge `user` now qualifies for and does not hold yet.
///
/// Never removes a badge. Returns the badges added by this call.
pub fn award_badges(user: &mut User) -> Vec<Badge> {
  let earned: Vec<Badge> = Badge::iter()
    .filter(|badge| badge.is_earned_by(user) && !user.badges.contains(badge))
    .collect();
  user.badges.extend(earned.iter().copied());
  earned
}

#[cfg(test)]
mod tests {
  use std::str::FromStr as _;

  use chrono::Utc;

  use super::*;

  fn user() -> User { User::new("Ada", "ada@example.com", Utc::now()) }

  #[test]
  fn names_round_trip_through_strum_and_serde() {
    for badge in Badge::iter() {
      assert_eq!(Badge::from_str(badge.name()).unwrap(), badge);
      let json = serde_json::to_string(&badge).unwrap();
      assert_eq!(json, format!("\"{}\"", badge.name()));
    }
  }

  #[test]
  fn lookup_is_by_name_not_position() {
    assert_eq!(Badge::from_str("Knowledge Master").unwrap().info().icon, "brain.head.profile");
    assert_eq!(catalog().len(), 5);
  }

  #[test]
  fn thresholds_award_once() {
    let mut u = user();
    u.total_questions = 9;
    assert!(award_badges(&mut u).is_empty());

    u.total_questions = 10;
    assert_eq!(award_badges(&mut u), [Badge::CuriousLearner]);
    assert!(award_badges(&mut u).is_empty());
    assert_eq!(u.badges.len(), 1);
  }

  #[test]
  fn all_thresholds_are_independent() {
    let mut u = user();
    u.total_documents = 10;
    u.learning_streak = 7;
    u.total_flashcards = 50;
    let awarded = award_badges(&mut u);
    assert_eq!(
      awarded,
      [Badge::ResearchPro, Badge::StudyStreak, Badge::KnowledgeMaster]
    );
  }

  #[test]
  fn lowered_counters_never_revoke() {
    let mut u = user();
    u.total_flashcards = 50;
    award_badges(&mut u);
    u.total_flashcards = 3;
    u.learning_streak = 0;
    award_badges(&mut u);
    assert!(u.badges.contains(&Badge::KnowledgeMaster));
  }
}
