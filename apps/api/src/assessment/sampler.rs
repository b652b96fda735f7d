use std::ops::RangeInclusive;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::assessment::models::{DifficultyTier, Question};
use crate::assessment::question_bank::QuestionBank;

/// Inclusive bounds of the randomly drawn sample size.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SampleRange {
    pub min: usize,
    pub max: usize,
}

impl Default for SampleRange {
    fn default() -> Self {
        Self { min: 10, max: 20 }
    }
}

impl SampleRange {
    pub fn new(min: usize, max: usize) -> Option<Self> {
        (min >= 1 && min <= max).then_some(Self { min, max })
    }

    pub fn as_range(&self) -> RangeInclusive<usize> {
        self.min..=self.max
    }
}

/// Draws `min(target, pool)` distinct questions of `tier`, where `target` is
/// uniform over `range`. Each pick removes a uniformly random index from what
/// is left of the pool, so the output order is random too.
///
/// An empty pool yields an empty Vec.
pub fn sample_questions<R: Rng>(
    bank: &QuestionBank,
    tier: DifficultyTier,
    range: SampleRange,
    rng: &mut R,
) -> Vec<Question> {
    let mut pool = bank.pool(tier);
    if pool.is_empty() {
        return Vec::new();
    }

    let target = rng.gen_range(range.as_range());
    let count = target.min(pool.len());

    let mut picked = Vec::with_capacity(count);
    while picked.len() < count {
        let idx = rng.gen_range(0..pool.len());
        picked.push(pool.remove(idx).clone());
    }
    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::scoring::tests::question;
    use rand::{rngs::SmallRng, SeedableRng};
    use std::collections::HashSet;

    fn bank_with(beginner: usize, advanced: usize) -> QuestionBank {
        let mut questions = Vec::new();
        for i in 0..beginner {
            questions.push(question(&format!("b{i}"), "web", DifficultyTier::Beginner));
        }
        for i in 0..advanced {
            questions.push(question(&format!("a{i}"), "data", DifficultyTier::Advanced));
        }
        QuestionBank::new(questions).unwrap()
    }

    #[test]
    fn test_sample_size_within_range_for_large_pool() {
        let bank = bank_with(40, 0);
        for seed in 0..50 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let sample = sample_questions(&bank, DifficultyTier::Beginner, SampleRange::default(), &mut rng);
            assert!((10..=20).contains(&sample.len()), "len {}", sample.len());
        }
    }

    #[test]
    fn test_small_pool_is_exhausted() {
        let bank = bank_with(6, 30);
        for seed in 0..20 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let sample = sample_questions(&bank, DifficultyTier::Beginner, SampleRange::default(), &mut rng);
            assert_eq!(sample.len(), 6);
        }
    }

    #[test]
    fn test_no_repeats_and_tier_respected() {
        let bank = bank_with(25, 25);
        for seed in 0..50 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let sample = sample_questions(&bank, DifficultyTier::Advanced, SampleRange::default(), &mut rng);
            let ids: HashSet<&str> = sample.iter().map(|q| q.id.as_str()).collect();
            assert_eq!(ids.len(), sample.len());
            assert!(sample.iter().all(|q| q.tier == DifficultyTier::Advanced));
        }
    }

    #[test]
    fn test_empty_pool_yields_empty_sample() {
        let bank = bank_with(12, 0);
        let mut rng = SmallRng::seed_from_u64(7);
        let sample = sample_questions(&bank, DifficultyTier::Intermediate, SampleRange::default(), &mut rng);
        assert!(sample.is_empty());
    }

    #[test]
    fn test_same_seed_same_sample() {
        let bank = bank_with(30, 0);
        let draw = |seed| {
            let mut rng = SmallRng::seed_from_u64(seed);
            sample_questions(&bank, DifficultyTier::Beginner, SampleRange::default(), &mut rng)
                .into_iter()
                .map(|q| q.id)
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(42), draw(42));
    }

    #[test]
    fn test_fixed_range() {
        let bank = bank_with(30, 0);
        let mut rng = SmallRng::seed_from_u64(1);
        let range = SampleRange::new(5, 5).unwrap();
        assert_eq!(sample_questions(&bank, DifficultyTier::Beginner, range, &mut rng).len(), 5);
    }

    #[test]
    fn test_range_validation() {
        assert!(SampleRange::new(0, 5).is_none());
        assert!(SampleRange::new(6, 5).is_none());
        assert_eq!(SampleRange::new(10, 20), Some(SampleRange::default()));
    }
}
