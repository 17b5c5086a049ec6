//! Uniform random selection.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;

/// The single source of randomness for team, class, archetype, node, item and level picks.
#[derive(Debug, Clone)]
pub struct Sampler {
    rng: StdRng,
}

impl Sampler {
    /// Deterministic sampler.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Random index below `len`, `None` when empty.
    pub fn index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.rng.random_range(0..len))
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        self.index(items.len()).and_then(|i| items.get(i))
    }

    /// Random element of any sized iterator (ordered collections, key views).
    pub fn pick_iter<I>(&mut self, items: I) -> Option<I::Item>
    where
        I: IntoIterator,
        I::IntoIter: ExactSizeIterator,
    {
        let mut iter = items.into_iter();
        let i = self.index(iter.len())?;
        iter.nth(i)
    }

    pub fn range(&mut self, range: RangeInclusive<u8>) -> u8 {
        if range.is_empty() {
            return *range.start();
        }
        self.rng.random_range(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_same_seed_same_picks() {
        let items: Vec<u32> = (0..100).collect();
        let mut a = Sampler::seeded(7);
        let mut b = Sampler::seeded(7);
        for _ in 0..20 {
            assert_eq!(a.pick(&items), b.pick(&items));
        }
    }

    #[test]
    fn test_empty_picks_nothing() {
        let mut sampler = Sampler::seeded(1);
        assert_eq!(sampler.pick::<u32>(&[]), None);
        assert_eq!(sampler.pick_iter(BTreeSet::<u32>::new().iter()), None);
    }

    #[test]
    fn test_range_stays_inside() {
        let mut sampler = Sampler::seeded(3);
        for _ in 0..50 {
            let v = sampler.range(10..=12);
            assert!((10..=12).contains(&v));
        }
        assert_eq!(sampler.range(5..=5), 5);
    }
}
