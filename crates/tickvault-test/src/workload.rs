//! Seeded generators of batches and operations for randomized checks.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tickvault_common::{DuplicateTimeTicks, Scalar};

/// Default seed so failures reproduce.
pub const DEFAULT_SEED: u64 = 42;

/// One step of a randomized workload.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Add a strictly ascending batch.
    Add {
        /// The batch.
        batch: Vec<Scalar>,
        /// Duplicate policy.
        policy: DuplicateTimeTicks,
    },
    /// Delete every record with ticks in `[from, to]`.
    DeleteTicks {
        /// Lower bound.
        from: i64,
        /// Upper bound.
        to: i64,
    },
    /// Delete the index range `[first, first + len)`, clamped by the caller.
    DeleteIndices {
        /// First index, relative to the current count.
        first: u64,
        /// Number of records.
        len: u64,
    },
}

/// Generates operations over a bounded tick domain so that batches collide
/// with stored records often.
pub struct Workload {
    rng: StdRng,
    max_ticks: i64,
    max_batch: usize,
}

impl Workload {
    /// Creates a workload with ticks in `[1, max_ticks]`.
    pub fn new(seed: u64, max_ticks: i64, max_batch: usize) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            max_ticks: max_ticks.max(1),
            max_batch: max_batch.max(1),
        }
    }

    /// A strictly ascending batch of distinct ticks.
    pub fn batch(&mut self) -> Vec<Scalar> {
        let len = self.rng.gen_range(1..=self.max_batch);
        let mut ticks: Vec<i64> = (0..len)
            .map(|_| self.rng.gen_range(1..=self.max_ticks))
            .collect();
        ticks.sort_unstable();
        ticks.dedup();
        ticks
            .into_iter()
            .map(|t| Scalar::new(t, self.rng.gen_range(-1000.0..1000.0)))
            .collect()
    }

    /// A random duplicate policy.
    pub fn policy(&mut self) -> DuplicateTimeTicks {
        match self.rng.gen_range(0..3) {
            0 => DuplicateTimeTicks::Fail,
            1 => DuplicateTimeTicks::Skip,
            _ => DuplicateTimeTicks::Update,
        }
    }

    /// The next operation; adds are three times as likely as deletes.
    pub fn next_operation(&mut self, count: u64) -> Operation {
        match self.rng.gen_range(0..8) {
            0..=5 => Operation::Add {
                batch: self.batch(),
                policy: self.policy(),
            },
            6 => {
                let from = self.rng.gen_range(1..=self.max_ticks);
                let width = self.rng.gen_range(0..=self.max_ticks / 8);
                Operation::DeleteTicks {
                    from,
                    to: from + width,
                }
            }
            _ => Operation::DeleteIndices {
                first: self.rng.gen_range(0..=count),
                len: self.rng.gen_range(1..=4),
            },
        }
    }
}

impl Default for Workload {
    fn default() -> Self {
        Self::new(DEFAULT_SEED, 200, 16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batches_are_strictly_ascending() {
        let mut workload = Workload::default();
        for _ in 0..100 {
            let batch = workload.batch();
            assert!(!batch.is_empty());
            assert!(batch.windows(2).all(|p| p[0].ticks < p[1].ticks));
            assert!(batch.iter().all(|r| (1..=200).contains(&r.ticks)));
        }
    }

    #[test]
    fn test_seed_reproduces() {
        let a: Vec<_> = (0..10).map(|_| Workload::new(7, 50, 4).batch()).collect();
        let b: Vec<_> = (0..10).map(|_| Workload::new(7, 50, 4).batch()).collect();
        assert_eq!(a, b);
    }
}
