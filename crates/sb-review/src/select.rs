//! Picking the cards of a review session.

use crate::{
    bucket::{BucketFilter, group_by_bucket},
    progress::Reviewable,
    shuffle::{RandomSource, sample},
};

/// Draw up to `count` cards for a review session.
///
/// The source is either every card or the cards of one bucket. It is shuffled
/// with Fisher–Yates before the first `count` are taken, so asking for more
/// than available returns the whole source in random order and never pads.
pub fn select_for_review<T, R>(
    cards: &[T],
    filter: BucketFilter,
    count: usize,
    rng: &mut R,
) -> Vec<T>
where
    T: Reviewable + Clone,
    R: RandomSource + ?Sized,
{
    let source = match filter {
        BucketFilter::All => cards.to_vec(),
        BucketFilter::Only(bucket) => group_by_bucket(cards.iter().cloned()).into_bucket(bucket),
    };

    sample(source, count, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bucket::ReviewBucket,
        shuffle::{RngSource, ScriptedSource},
    };

    #[derive(Debug, Clone, PartialEq)]
    struct Card {
        id: char,
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

    fn new_card(id: char) -> Card {
        Card {
            id,
            grade: 0.0,
            attempts: 0,
        }
    }

    fn ids(cards: &[Card]) -> String {
        cards.iter().map(|c| c.id).collect()
    }

    fn deck() -> Vec<Card> {
        vec![
            new_card('A'),
            Card {
                id: 'B',
                grade: 0.0,
                attempts: 2,
            },
            new_card('C'),
            Card {
                id: 'D',
                grade: 1.0,
                attempts: 1,
            },
            new_card('E'),
        ]
    }

    #[test]
    fn test_select_all_exact_permutation() {
        let cards: Vec<Card> = "ABCDE".chars().map(new_card).collect();
        let mut rng = ScriptedSource::new(vec![0.5, 0.0, 0.9, 0.3]);

        let picked = select_for_review(&cards, BucketFilter::All, 5, &mut rng);
        assert_eq!(ids(&picked), "BDEAC");
    }

    #[test]
    fn test_select_truncates_after_shuffle() {
        let cards: Vec<Card> = "ABCDE".chars().map(new_card).collect();
        let mut rng = ScriptedSource::new(vec![0.5, 0.0, 0.9, 0.3]);

        let picked = select_for_review(&cards, BucketFilter::All, 2, &mut rng);
        assert_eq!(ids(&picked), "BD");
    }

    #[test]
    fn test_select_from_bucket() {
        let mut rng = ScriptedSource::new(vec![0.0]);

        let picked = select_for_review(
            &deck(),
            BucketFilter::Only(ReviewBucket::New),
            10,
            &mut rng,
        );
        // New bucket is [A, C, E]; all-zero source rotates it
        assert_eq!(ids(&picked), "CEA");

        let picked = select_for_review(
            &deck(),
            BucketFilter::Only(ReviewBucket::Tomorrow),
            10,
            &mut rng,
        );
        assert!(picked.is_empty());
    }

    #[test]
    fn test_select_bounds() {
        let mut rng = RngSource::seeded(99);
        let cards = deck();

        for count in 0..8 {
            let picked = select_for_review(&cards, BucketFilter::All, count, &mut rng);
            assert_eq!(picked.len(), count.min(cards.len()));
        }

        let picked = select_for_review(&cards, BucketFilter::All, 100, &mut rng);
        let mut sorted = ids(&picked).chars().collect::<Vec<_>>();
        sorted.sort_unstable();
        assert_eq!(sorted, vec!['A', 'B', 'C', 'D', 'E']);
    }

    #[test]
    fn test_select_only_returns_requested_bucket() {
        let mut rng = RngSource::seeded(5);
        let picked = select_for_review(
            &deck(),
            BucketFilter::Only(ReviewBucket::Now),
            3,
            &mut rng,
        );
        assert_eq!(ids(&picked), "B");
    }
}
