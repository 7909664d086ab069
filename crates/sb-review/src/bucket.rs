//! Review buckets: the categorization of cards by past performance.
//!
//! A card's bucket is never stored. It is derived from the cumulative
//! `grade` and `attempts` of the reviewing user every time it is needed.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{error::ParseError, progress::Reviewable};

/// Upper bound (inclusive) of the grade percentage for the `Now` bucket.
pub const NOW_THRESHOLD: f64 = 50.0;

/// Upper bound (inclusive) of the grade percentage for the `Tomorrow` bucket.
pub const TOMORROW_THRESHOLD: f64 = 90.0;

/// When a card should be reviewed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewBucket {
    /// Never reviewed.
    New,
    /// Grade percentage at or below 50%.
    Now,
    /// Grade percentage above 50% and at or below 90%.
    Tomorrow,
    /// Grade percentage above 90%.
    NextWeek,
}

impl ReviewBucket {
    /// All buckets in display order.
    pub const ALL: [Self; 4] = [Self::New, Self::Now, Self::Tomorrow, Self::NextWeek];

    /// Human readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Now => "Now",
            Self::Tomorrow => "Tomorrow",
            Self::NextWeek => "Next Week",
        }
    }

    /// Stable key, identical to the serialized form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Now => "now",
            Self::Tomorrow => "tomorrow",
            Self::NextWeek => "next_week",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::New => 0,
            Self::Now => 1,
            Self::Tomorrow => 2,
            Self::NextWeek => 3,
        }
    }
}

impl fmt::Display for ReviewBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Grade as a percentage of attempts, `0.0` for a card that was never attempted.
pub fn grade_percentage(grade: f64, attempts: i32) -> f64 {
    if attempts <= 0 {
        return 0.0;
    }
    (grade / f64::from(attempts)) * 100.0
}

/// Map a card's performance to its review bucket.
///
/// # Algorithm
///
/// * `attempts == 0`: `New` (checked before dividing)
/// * percentage ≤ 50: `Now`
/// * percentage ≤ 90: `Tomorrow`
/// * otherwise: `NextWeek`
///
/// Both thresholds belong to the lower bucket. The percentage is not clamped.
pub fn categorize(grade: f64, attempts: i32) -> ReviewBucket {
    if attempts <= 0 {
        return ReviewBucket::New;
    }

    let percentage = grade_percentage(grade, attempts);

    if percentage <= NOW_THRESHOLD {
        ReviewBucket::Now
    } else if percentage <= TOMORROW_THRESHOLD {
        ReviewBucket::Tomorrow
    } else {
        ReviewBucket::NextWeek
    }
}

/// Which cards a review session draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BucketFilter {
    /// Every card regardless of bucket.
    #[default]
    All,
    /// Only the cards of one bucket.
    Only(ReviewBucket),
}

impl FromStr for BucketFilter {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "new" => Ok(Self::Only(ReviewBucket::New)),
            "now" => Ok(Self::Only(ReviewBucket::Now)),
            "tomorrow" => Ok(Self::Only(ReviewBucket::Tomorrow)),
            "next_week" | "next-week" | "nextweek" | "next week" => {
                Ok(Self::Only(ReviewBucket::NextWeek))
            }
            _ => Err(ParseError::Bucket(s.to_string())),
        }
    }
}

impl TryFrom<String> for BucketFilter {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BucketFilter> for String {
    fn from(filter: BucketFilter) -> Self {
        match filter {
            BucketFilter::All => "all".to_string(),
            BucketFilter::Only(bucket) => bucket.as_str().to_string(),
        }
    }
}

impl From<ReviewBucket> for BucketFilter {
    fn from(bucket: ReviewBucket) -> Self {
        Self::Only(bucket)
    }
}

/// Number of cards in each bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BucketCounts {
    /// Cards never reviewed.
    pub new: usize,
    /// Cards at or below 50%.
    pub now: usize,
    /// Cards above 50% and at most 90%.
    pub tomorrow: usize,
    /// Cards above 90%.
    pub next_week: usize,
}

impl BucketCounts {
    /// Sum over all buckets.
    pub const fn total(&self) -> usize {
        self.new + self.now + self.tomorrow + self.next_week
    }
}

/// Cards partitioned by bucket. Every bucket is present, possibly empty.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketGroups<T> {
    groups: [Vec<T>; 4],
}

impl<T> Default for BucketGroups<T> {
    fn default() -> Self {
        Self {
            groups: [Vec::new(), Vec::new(), Vec::new(), Vec::new()],
        }
    }
}

impl<T> BucketGroups<T> {
    /// Cards of one bucket, in their original relative order.
    pub fn get(&self, bucket: ReviewBucket) -> &[T] {
        &self.groups[bucket.index()]
    }

    /// Take the cards of one bucket, dropping the others.
    pub fn into_bucket(self, bucket: ReviewBucket) -> Vec<T> {
        let [new, now, tomorrow, next_week] = self.groups;
        match bucket {
            ReviewBucket::New => new,
            ReviewBucket::Now => now,
            ReviewBucket::Tomorrow => tomorrow,
            ReviewBucket::NextWeek => next_week,
        }
    }

    /// Buckets with their cards, in display order.
    pub fn iter(&self) -> impl Iterator<Item = (ReviewBucket, &[T])> {
        ReviewBucket::ALL
            .into_iter()
            .map(move |bucket| (bucket, self.get(bucket)))
    }

    /// Number of cards per bucket.
    pub fn counts(&self) -> BucketCounts {
        BucketCounts {
            new: self.get(ReviewBucket::New).len(),
            now: self.get(ReviewBucket::Now).len(),
            tomorrow: self.get(ReviewBucket::Tomorrow).len(),
            next_week: self.get(ReviewBucket::NextWeek).len(),
        }
    }

    /// Total number of cards over all buckets.
    pub fn len(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    /// No card in any bucket.
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(Vec::is_empty)
    }
}

/// Partition cards into buckets in a single stable pass.
pub fn group_by_bucket<T, I>(cards: I) -> BucketGroups<T>
where
    T: Reviewable,
    I: IntoIterator<Item = T>,
{
    let mut groups = BucketGroups::default();
    for card in cards {
        let bucket = card.bucket();
        groups.groups[bucket.index()].push(card);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::CardProgress;

    #[derive(Debug, Clone, PartialEq)]
    struct Card {
        name: &'static str,
        grade: f64,
        attempts: i32,
    }

    impl Reviewable for Card {
        fn grade(&self) -> f64 {
            self.grade
        }

        fn attempts(&self) -> i32 {
            self.attempts
        }
    }

    fn card(name: &'static str, grade: f64, attempts: i32) -> Card {
        Card {
            name,
            grade,
            attempts,
        }
    }

    #[test]
    fn test_categorize_never_attempted() {
        assert_eq!(categorize(0.0, 0), ReviewBucket::New);
        // Grade is ignored when there are no attempts
        assert_eq!(categorize(3.0, 0), ReviewBucket::New);
    }

    #[test]
    fn test_categorize_boundaries() {
        assert_eq!(categorize(5.0, 10), ReviewBucket::Now); // exactly 50%
        assert_eq!(categorize(5.001, 10), ReviewBucket::Tomorrow); // 50.01%
        assert_eq!(categorize(9.0, 10), ReviewBucket::Tomorrow); // exactly 90%
        assert_eq!(categorize(9.001, 10), ReviewBucket::NextWeek); // 90.01%
        assert_eq!(categorize(9.5, 10), ReviewBucket::NextWeek); // 95%
    }

    #[test]
    fn test_categorize_low_and_high() {
        assert_eq!(categorize(0.0, 4), ReviewBucket::Now);
        assert_eq!(categorize(1.0, 1), ReviewBucket::NextWeek);
        assert_eq!(categorize(0.85, 1), ReviewBucket::Tomorrow);
        assert_eq!(categorize(0.7, 2), ReviewBucket::Now);
    }

    #[test]
    fn test_grade_percentage() {
        assert_eq!(grade_percentage(0.0, 0), 0.0);
        assert_eq!(grade_percentage(5.0, 10), 50.0);
        assert_eq!(grade_percentage(2.0, 2), 100.0);
    }

    #[test]
    fn test_bucket_filter_parsing() {
        assert_eq!("all".parse::<BucketFilter>(), Ok(BucketFilter::All));
        assert_eq!(
            "New".parse::<BucketFilter>(),
            Ok(BucketFilter::Only(ReviewBucket::New))
        );
        assert_eq!(
            "next_week".parse::<BucketFilter>(),
            Ok(BucketFilter::Only(ReviewBucket::NextWeek))
        );
        assert_eq!(
            "Next Week".parse::<BucketFilter>(),
            Ok(BucketFilter::Only(ReviewBucket::NextWeek))
        );
        assert!(matches!(
            "someday".parse::<BucketFilter>(),
            Err(ParseError::Bucket(_))
        ));
    }

    #[test]
    fn test_bucket_filter_serde() {
        let filter: BucketFilter = serde_json::from_str("\"tomorrow\"").unwrap();
        assert_eq!(filter, BucketFilter::Only(ReviewBucket::Tomorrow));
        assert_eq!(serde_json::to_string(&BucketFilter::All).unwrap(), "\"all\"");
        assert!(serde_json::from_str::<BucketFilter>("\"later\"").is_err());
    }

    #[test]
    fn test_group_by_bucket_keeps_every_bucket() {
        let groups = group_by_bucket(Vec::<Card>::new());
        assert!(groups.is_empty());
        let buckets: Vec<_> = groups.iter().map(|(bucket, _)| bucket).collect();
        assert_eq!(buckets, ReviewBucket::ALL.to_vec());
    }

    #[test]
    fn test_group_by_bucket_is_stable_and_total() {
        let cards = vec![
            card("a", 0.0, 0),
            card("b", 1.0, 1),
            card("c", 0.0, 3),
            card("d", 0.0, 0),
            card("e", 0.85, 1),
            card("f", 2.0, 2),
            card("g", 1.0, 2),
        ];

        let groups = group_by_bucket(cards.clone());

        let names = |bucket| {
            groups
                .get(bucket)
                .iter()
                .map(|c: &Card| c.name)
                .collect::<Vec<_>>()
        };
        assert_eq!(names(ReviewBucket::New), ["a", "d"]);
        assert_eq!(names(ReviewBucket::Now), ["c", "g"]);
        assert_eq!(names(ReviewBucket::Tomorrow), ["e"]);
        assert_eq!(names(ReviewBucket::NextWeek), ["b", "f"]);

        assert_eq!(groups.len(), cards.len());
        assert_eq!(groups.counts().total(), cards.len());
        for (bucket, members) in groups.iter() {
            assert!(members.iter().all(|c| c.bucket() == bucket));
        }
    }

    #[test]
    fn test_into_bucket() {
        let groups = group_by_bucket(vec![
            CardProgress::new(0.0, 0),
            CardProgress::new(1.0, 1),
        ]);
        assert_eq!(
            groups.into_bucket(ReviewBucket::NextWeek),
            vec![CardProgress::new(1.0, 1)]
        );
    }
}
