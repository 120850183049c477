//! Weighted cost-effective / premium selection.
//!
//! Candidates arrive ranked by ascending latency. The first
//! `max(1, floor(ratio * n))` form the cost-effective tier and the rest the
//! premium tier. One draw decides the tier; a second picks uniformly
//! within it. When the premium tier is empty the premium pick wraps to the
//! whole list.

use crate::config::SelectionConfig;
use crate::load_balancer::random::{RandomSource, SecureRandom};

/// Which slice of the ranking a pick came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Only one candidate; no draw was made.
    Sole,
    CostEffective,
    Premium,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Sole => "sole",
            Tier::CostEffective => "cost_effective",
            Tier::Premium => "premium",
        }
    }
}

/// Picks one candidate from a latency-ranked list.
#[derive(Debug)]
pub struct WeightedSelector<R = SecureRandom> {
    cost_effective_ratio: f64,
    cost_effective_share: f64,
    rng: R,
}

impl WeightedSelector<SecureRandom> {
    pub fn new(config: &SelectionConfig) -> Self {
        Self::with_random_source(config, SecureRandom)
    }
}

impl<R: RandomSource> WeightedSelector<R> {
    pub fn with_random_source(config: &SelectionConfig, rng: R) -> Self {
        Self {
            cost_effective_ratio: config.cost_effective_ratio,
            cost_effective_share: config.cost_effective_share,
            rng,
        }
    }

    /// Size of the cost-effective tier for `n` candidates.
    pub fn cost_effective_count(&self, n: usize) -> usize {
        ((n as f64 * self.cost_effective_ratio).floor() as usize).max(1)
    }

    /// Pick from `ranked` (fastest first). Returns `None` only when empty.
    pub fn select<'a, T>(&self, ranked: &'a [T]) -> Option<(&'a T, Tier)> {
        match ranked.len() {
            0 => None,
            1 => Some((&ranked[0], Tier::Sole)),
            n => {
                let k = self.cost_effective_count(n);
                if self.rng.next_f64() < self.cost_effective_share {
                    Some((&ranked[self.rng.next_index(k)], Tier::CostEffective))
                } else {
                    let start = if k >= n { 0 } else { k };
                    Some((&ranked[start + self.rng.next_index(n - start)], Tier::Premium))
                }
            }
        }
    }
}
