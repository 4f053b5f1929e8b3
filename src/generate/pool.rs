//! Candidate pool generation by rejection sampling.
//!
//! Each draw is a uniformly random E-bit vector; it is kept only when its
//! active count lies within the configured bounds. Draws are grouped into
//! shards of `shard_size` draws, each with its own RNG seeded from a base
//! seed plus the shard index. Shards of one round run in parallel when the
//! `parallel` feature is enabled and are merged in shard order, so a given
//! seed yields the same pool with or without the feature.
//!
//! The attempt budget is checked between rounds and no round plans more
//! draws than the budget has left.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::params::ValidatedParams;
use crate::pattern::ActivePattern;
use crate::utils::acceptance_probability;

/// Upper bound on the number of shards planned in one round.
const MAX_ROUND_SHARDS: u64 = 256;

/// A pool of candidate tasks, each satisfying the active-element bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePool {
    patterns: Vec<ActivePattern>,
    attempts: u64,
}

impl CandidatePool {
    /// Wrap an existing list of candidates.
    #[must_use]
    pub fn new(patterns: Vec<ActivePattern>, attempts: u64) -> Self {
        Self { patterns, attempts }
    }

    /// Number of candidates in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the pool is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// The candidates, in merge order.
    #[must_use]
    pub fn patterns(&self) -> &[ActivePattern] {
        &self.patterns
    }

    /// Random draws spent building the pool. Zero for directly constructed
    /// degenerate pools.
    #[must_use]
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Fraction of draws that were accepted, or `None` if no draws were made.
    #[must_use]
    pub fn acceptance_rate(&self) -> Option<f64> {
        if self.attempts == 0 {
            None
        } else {
            Some(self.patterns.len() as f64 / self.attempts as f64)
        }
    }

    /// Consume the pool and return its candidates.
    #[must_use]
    pub fn into_patterns(self) -> Vec<ActivePattern> {
        self.patterns
    }
}

/// Inclusive bounds on the active count of an E-element pattern.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Bounds {
    pub(crate) num_elements: usize,
    pub(crate) min_active: usize,
    pub(crate) max_active: usize,
}

/// A batch of draws with its own derived seed.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Shard {
    pub(crate) seed: u64,
    pub(crate) draws: u64,
}

impl Shard {
    /// Perform the shard's draws and keep the accepted patterns.
    pub(crate) fn draw(&self, bounds: Bounds) -> Vec<ActivePattern> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut accepted = Vec::new();
        for _ in 0..self.draws {
            let pattern = ActivePattern::random(bounds.num_elements, &mut rng);
            let count = pattern.count_active();
            if count >= bounds.min_active && count <= bounds.max_active {
                accepted.push(pattern);
            }
        }
        accepted
    }
}

fn draw_round(plan: &[Shard], bounds: Bounds) -> Vec<Vec<ActivePattern>> {
    #[cfg(feature = "parallel")]
    {
        crate::parallel::par_draw_shards(plan, bounds)
    }
    #[cfg(not(feature = "parallel"))]
    {
        plan.iter().map(|shard| shard.draw(bounds)).collect()
    }
}

/// Build a pool of candidate tasks.
///
/// The pool grows until it holds `pool_target` candidates or the draw
/// budget `max_attempts` is spent. The degenerate bounds `0..=0` and `E..=E`
/// admit a single pattern and are constructed directly without sampling.
///
/// # Errors
///
/// Returns [`Error::PoolExhausted`] if the budget runs out before the pool
/// holds at least `total_tasks` candidates. A pool between `total_tasks` and
/// `pool_target` is returned with a warning.
///
/// # Example
///
/// ```
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
/// use iped::generate::generate_pool;
/// use iped::DesignParams;
///
/// let params = DesignParams::new(8, 4, 5, 2, 3).validate().unwrap();
/// let mut rng = StdRng::seed_from_u64(11);
/// let pool = generate_pool(&params, &mut rng).unwrap();
///
/// assert_eq!(pool.len(), params.pool_target());
/// assert!(pool.patterns().iter().all(|p| (2..=3).contains(&p.count_active())));
/// ```
pub fn generate_pool<R: Rng + ?Sized>(
    params: &ValidatedParams,
    rng: &mut R,
) -> Result<CandidatePool> {
    let e = params.num_elements();
    let (lo, hi) = (params.min_active(), params.max_active());
    let target = params.pool_target();

    if lo == hi && (lo == 0 || lo == e) {
        let pattern = if lo == 0 {
            ActivePattern::all_inactive(e)
        } else {
            ActivePattern::all_active(e)
        };
        debug!(
            active = lo,
            size = target,
            "degenerate bounds, building pool directly"
        );
        return Ok(CandidatePool::new(vec![pattern; target], 0));
    }

    let options = params.options();
    let bounds = Bounds {
        num_elements: e,
        min_active: lo,
        max_active: hi,
    };
    let p_accept = acceptance_probability(e, lo, hi);
    debug!(
        target,
        p_accept,
        expected_draws = target as f64 / p_accept,
        max_attempts = options.max_attempts,
        "starting rejection sampling"
    );

    let base_seed: u64 = rng.gen();
    let mut patterns: Vec<ActivePattern> = Vec::with_capacity(target.min(1 << 20));
    let mut attempts: u64 = 0;
    let mut next_shard: u64 = 0;
    let mut rounds = 0usize;

    while patterns.len() < target && attempts < options.max_attempts {
        let needed = (target - patterns.len()) as f64;
        let expected_draws = (needed / p_accept.max(f64::MIN_POSITIVE)).ceil();
        let wanted_shards = (expected_draws / options.shard_size as f64)
            .ceil()
            .clamp(1.0, MAX_ROUND_SHARDS as f64) as u64;

        let mut budget = options.max_attempts - attempts;
        let mut plan = Vec::with_capacity(wanted_shards as usize);
        for _ in 0..wanted_shards {
            if budget == 0 {
                break;
            }
            let draws = options.shard_size.min(budget);
            budget -= draws;
            plan.push(Shard {
                seed: base_seed.wrapping_add(next_shard),
                draws,
            });
            next_shard += 1;
        }

        for (shard, accepted) in plan.iter().zip(draw_round(&plan, bounds)) {
            attempts += shard.draws;
            patterns.extend(accepted);
        }
        rounds += 1;
    }
    patterns.truncate(target);

    debug!(
        accepted = patterns.len(),
        attempts,
        rounds,
        "rejection sampling finished"
    );

    if patterns.len() < params.total_tasks() {
        return Err(Error::PoolExhausted {
            required: params.total_tasks(),
            accepted: patterns.len(),
            attempts,
        });
    }
    if patterns.len() < target {
        warn!(
            accepted = patterns.len(),
            target,
            attempts,
            "attempt budget spent before reaching pool target; continuing with smaller pool"
        );
    }

    Ok(CandidatePool::new(patterns, attempts))
}
