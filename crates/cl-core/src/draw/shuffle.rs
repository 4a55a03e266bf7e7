//! Shuffling and winner selection

use rand::rngs::OsRng;
use rand::{CryptoRng, Rng};

/// Fisher-Yates passes for a list of `len` items: `max(3, ceil(log2 len) + 2)`,
/// or 0 when there is nothing to reorder
pub fn shuffle_rounds(len: usize) -> usize {
    if len <= 1 {
        return 0;
    }
    // bit length of len - 1 is ceil(log2 len) for len >= 2
    let ceil_log2 = (usize::BITS - (len - 1).leading_zeros()) as usize;
    (ceil_log2 + 2).max(3)
}

/// Shuffle in place with `rng`
pub fn shuffle_with_rng<T, R>(items: &mut [T], rng: &mut R)
where
    R: Rng + CryptoRng,
{
    for _ in 0..shuffle_rounds(items.len()) {
        for i in (1..items.len()).rev() {
            let j = rng.gen_range(0..=i);
            items.swap(i, j);
        }
    }
}

/// Shuffled copy of `items`, using the OS random source
pub fn shuffle_candidates<T>(mut items: Vec<T>) -> Vec<T> {
    shuffle_with_rng(&mut items, &mut OsRng);
    items
}

/// Winners to draw from `available` candidates: at least one, at most all
pub fn clamp_winner_count(requested: usize, available: usize) -> usize {
    if available == 0 {
        0
    } else {
        requested.clamp(1, available)
    }
}

/// Draw winners using `rng`
pub fn draw_with_rng<T, R>(mut candidates: Vec<T>, winner_count: usize, rng: &mut R) -> Vec<T>
where
    R: Rng + CryptoRng,
{
    let count = clamp_winner_count(winner_count, candidates.len());
    shuffle_with_rng(&mut candidates, rng);
    candidates.truncate(count);
    candidates
}

/// Draw `winner_count` distinct winners, clamped to `[1, candidates.len()]`
pub fn draw<T>(candidates: Vec<T>, winner_count: usize) -> Vec<T> {
    draw_with_rng(candidates, winner_count, &mut OsRng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::{HashMap, HashSet};

    fn sorted<T: Ord + Clone>(items: &[T]) -> Vec<T> {
        let mut items = items.to_vec();
        items.sort();
        items
    }

    #[test]
    fn test_shuffle_rounds() {
        assert_eq!(shuffle_rounds(0), 0);
        assert_eq!(shuffle_rounds(1), 0);
        assert_eq!(shuffle_rounds(2), 3);
        assert_eq!(shuffle_rounds(4), 4);
        assert_eq!(shuffle_rounds(5), 5);
        assert_eq!(shuffle_rounds(8), 5);
        assert_eq!(shuffle_rounds(9), 6);
        assert_eq!(shuffle_rounds(1000), 12);
        assert_eq!(shuffle_rounds(1024), 12);
        assert_eq!(shuffle_rounds(1025), 13);
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        for len in [0usize, 1, 2, 3, 50, 257] {
            let input: Vec<usize> = (0..len).collect();
            let mut shuffled = input.clone();
            shuffle_with_rng(&mut shuffled, &mut rng);
            assert_eq!(sorted(&shuffled), input);
        }
    }

    #[test]
    fn test_small_inputs_unchanged() {
        assert_eq!(shuffle_candidates(Vec::<u8>::new()), Vec::<u8>::new());
        assert_eq!(shuffle_candidates(vec!["only"]), vec!["only"]);
    }

    #[test]
    fn test_shuffle_is_roughly_uniform() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts: HashMap<Vec<u8>, usize> = HashMap::new();
        for _ in 0..6000 {
            let mut items = vec![1u8, 2, 3];
            shuffle_with_rng(&mut items, &mut rng);
            *counts.entry(items).or_default() += 1;
        }
        assert_eq!(counts.len(), 6);
        for (permutation, count) in counts {
            assert!(
                (800..1200).contains(&count),
                "{:?} drawn {} times",
                permutation,
                count
            );
        }
    }

    #[test]
    fn test_seeded_shuffle_is_reproducible() {
        let input: Vec<u32> = (0..20).collect();
        let mut a = input.clone();
        let mut b = input.clone();
        shuffle_with_rng(&mut a, &mut StdRng::seed_from_u64(3));
        shuffle_with_rng(&mut b, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_clamp_winner_count() {
        assert_eq!(clamp_winner_count(0, 5), 1);
        assert_eq!(clamp_winner_count(3, 5), 3);
        assert_eq!(clamp_winner_count(10, 5), 5);
        assert_eq!(clamp_winner_count(3, 0), 0);
    }

    #[test]
    fn test_draw_more_than_available() {
        let winners = draw(vec!["a", "b", "c", "d", "e"], 10);
        assert_eq!(winners.len(), 5);
        let distinct: HashSet<_> = winners.iter().collect();
        assert_eq!(distinct.len(), 5);
    }

    #[test]
    fn test_draw_zero_requested_gives_one() {
        let mut rng = StdRng::seed_from_u64(1);
        let winners = draw_with_rng(vec![1, 2, 3], 0, &mut rng);
        assert_eq!(winners.len(), 1);
        assert!([1, 2, 3].contains(&winners[0]));
    }

    #[test]
    fn test_draw_from_empty() {
        assert!(draw(Vec::<u8>::new(), 3).is_empty());
    }
}
