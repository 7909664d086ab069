//! Per-user card progress and the self-graded review step that advances it.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    bucket::{ReviewBucket, categorize},
    error::ParseError,
};

/// Anything carrying a cumulative grade and attempt count.
pub trait Reviewable {
    /// Sum of the grade increments of every review.
    fn grade(&self) -> f64;

    /// Number of reviews.
    fn attempts(&self) -> i32;

    /// Bucket derived from [`Self::grade`] and [`Self::attempts`].
    fn bucket(&self) -> ReviewBucket {
        categorize(self.grade(), self.attempts())
    }
}

impl<T: Reviewable + ?Sized> Reviewable for &T {
    fn grade(&self) -> f64 {
        (**self).grade()
    }

    fn attempts(&self) -> i32 {
        (**self).attempts()
    }
}

/// How well the user recalled a card, as chosen after flipping it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Not recalled. Adds nothing to the grade.
    Again,
    /// Recalled with effort.
    Hard,
    /// Recalled after a short hesitation.
    Good,
    /// Recalled at once. Adds a full point.
    Easy,
}

impl Difficulty {
    /// Amount added to the card's grade. Never more than 1.0.
    pub const fn grade_increment(self) -> f64 {
        match self {
            Self::Again => 0.0,
            Self::Hard => 0.7,
            Self::Good => 0.85,
            Self::Easy => 1.0,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Again => "again",
            Self::Hard => "hard",
            Self::Good => "good",
            Self::Easy => "easy",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "again" => Ok(Self::Again),
            "hard" => Ok(Self::Hard),
            "good" => Ok(Self::Good),
            "easy" => Ok(Self::Easy),
            _ => Err(ParseError::Difficulty(s.to_string())),
        }
    }
}

/// A user's cumulative progress on one card.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CardProgress {
    /// Sum of the grade increments of every review.
    pub grade: f64,
    /// Number of reviews.
    pub attempts: i32,
}

impl CardProgress {
    /// Progress as stored.
    pub const fn new(grade: f64, attempts: i32) -> Self {
        Self { grade, attempts }
    }

    /// Progress after one more review graded with `difficulty`.
    ///
    /// `attempts` grows by one and `grade` by at most 1.0, so the grade can
    /// never outrun the attempts.
    #[must_use]
    pub fn record(self, difficulty: Difficulty) -> Self {
        Self {
            grade: self.grade + difficulty.grade_increment(),
            attempts: self.attempts + 1,
        }
    }

    /// Fresh progress, as if the card was never reviewed.
    #[must_use]
    pub const fn reset() -> Self {
        Self::new(0.0, 0)
    }
}

impl Reviewable for CardProgress {
    fn grade(&self) -> f64 {
        self.grade
    }

    fn attempts(&self) -> i32 {
        self.attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_increments() {
        assert_eq!(Difficulty::Again.grade_increment(), 0.0);
        assert_eq!(Difficulty::Hard.grade_increment(), 0.7);
        assert_eq!(Difficulty::Good.grade_increment(), 0.85);
        assert_eq!(Difficulty::Easy.grade_increment(), 1.0);
    }

    #[test]
    fn test_record_advances_progress() {
        let progress = CardProgress::default()
            .record(Difficulty::Easy)
            .record(Difficulty::Again)
            .record(Difficulty::Good);

        assert_eq!(progress.attempts, 3);
        assert!((progress.grade - 1.85).abs() < 1e-9);
        assert!(progress.grade <= f64::from(progress.attempts));
    }

    #[test]
    fn test_record_moves_card_through_buckets() {
        let fresh = CardProgress::default();
        assert_eq!(fresh.bucket(), ReviewBucket::New);

        let missed = fresh.record(Difficulty::Again);
        assert_eq!(missed.bucket(), ReviewBucket::Now);

        let good = fresh.record(Difficulty::Good);
        assert_eq!(good.bucket(), ReviewBucket::Tomorrow);

        let easy = fresh.record(Difficulty::Easy);
        assert_eq!(easy.bucket(), ReviewBucket::NextWeek);
    }

    #[test]
    fn test_reset() {
        assert_eq!(CardProgress::reset(), CardProgress::new(0.0, 0));
        assert_eq!(CardProgress::reset().bucket(), ReviewBucket::New);
    }

    #[test]
    fn test_difficulty_parsing() {
        assert_eq!("Hard".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert_eq!(" easy ".parse::<Difficulty>(), Ok(Difficulty::Easy));
        assert!("medium".parse::<Difficulty>().is_err());

        let parsed: Difficulty = serde_json::from_str("\"good\"").unwrap();
        assert_eq!(parsed, Difficulty::Good);
    }
}
