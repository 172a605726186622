//! Card drawing: one target word plus distractors from a user's pool.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::trainer::words::Word;

/// A multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    /// English word the user has to pick.
    pub target_word: String,
    /// Russian prompt shown to the user.
    pub target_translation: String,
    /// English choices in on-screen order, target included exactly once.
    pub options: Vec<String>,
}

/// Draw a card from `pool`, or `None` if the pool is empty.
///
/// The target and up to `distractors` other words are picked by a partial
/// Fisher-Yates shuffle, so every subset is equally likely. A pool smaller
/// than `distractors + 1` yields a card with fewer options.
pub fn draw_card<R: Rng + ?Sized>(mut pool: Vec<Word>, distractors: usize, rng: &mut R) -> Option<Card> {
    if pool.is_empty() {
        return None;
    }

    let take = (distractors + 1).min(pool.len());
    let (picked, _) = pool.partial_shuffle(rng, take);

    // picked[0] is uniform over the pool; the rest are uniform over what remains.
    let target = picked[0].clone();
    let mut options: Vec<String> = picked.iter().map(|w| w.english.clone()).collect();
    options.shuffle(rng);

    Some(Card {
        target_word: target.english,
        target_translation: target.russian,
        options,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::{HashMap, HashSet};

    fn pool(n: usize) -> Vec<Word> {
        (0..n)
            .map(|i| Word {
                id: i as i64,
                english: format!("en{i}"),
                russian: format!("ru{i}"),
                owner: None,
            })
            .collect()
    }

    #[test]
    fn test_empty_pool_gives_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(draw_card(Vec::new(), 3, &mut rng).is_none());
    }

    #[test]
    fn test_full_card_has_four_distinct_options() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let card = draw_card(pool(10), 3, &mut rng).unwrap();
            assert_eq!(card.options.len(), 4);
            let unique: HashSet<_> = card.options.iter().collect();
            assert_eq!(unique.len(), 4);
            assert_eq!(card.options.iter().filter(|o| **o == card.target_word).count(), 1);
        }
    }

    #[test]
    fn test_translation_matches_target() {
        let mut rng = StdRng::seed_from_u64(3);
        let card = draw_card(pool(6), 3, &mut rng).unwrap();
        assert_eq!(card.target_translation, card.target_word.replace("en", "ru"));
    }

    #[test]
    fn test_small_pool_degrades() {
        let mut rng = StdRng::seed_from_u64(11);
        let card = draw_card(pool(2), 3, &mut rng).unwrap();
        assert_eq!(card.options.len(), 2);

        let card = draw_card(pool(1), 3, &mut rng).unwrap();
        assert_eq!(card.options, vec![card.target_word.clone()]);
    }

    #[test]
    fn test_distractor_count_is_configurable() {
        let mut rng = StdRng::seed_from_u64(5);
        let card = draw_card(pool(10), 5, &mut rng).unwrap();
        assert_eq!(card.options.len(), 6);
    }

    #[test]
    fn test_same_seed_same_card() {
        let a = draw_card(pool(20), 3, &mut StdRng::seed_from_u64(42));
        let b = draw_card(pool(20), 3, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_target_and_position_spread() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut targets: HashMap<String, usize> = HashMap::new();
        let mut positions = [0usize; 4];

        for _ in 0..4000 {
            let card = draw_card(pool(4), 3, &mut rng).unwrap();
            *targets.entry(card.target_word.clone()).or_default() += 1;
            let pos = card.options.iter().position(|o| *o == card.target_word).unwrap();
            positions[pos] += 1;
        }

        // Expect ~1000 each; loose bounds keep this deterministic under the seed.
        assert_eq!(targets.len(), 4);
        for count in targets.values() {
            assert!((700..1300).contains(count), "target skew: {targets:?}");
        }
        for count in positions {
            assert!((700..1300).contains(&count), "position skew: {positions:?}");
        }
    }
}
