//! Selection of design tasks from the candidate pool.

use std::collections::{HashSet, VecDeque};

use rand::seq::index;
use rand::Rng;
use tracing::debug;

use crate::error::{Error, Result};
use crate::pattern::ActivePattern;

use super::CandidatePool;

/// Draw exactly `total_tasks` pool slots uniformly at random without
/// replacement and return their patterns in draw order.
///
/// Selection is by slot, not by value: two selected tasks may carry the
/// same pattern when the pool holds duplicates.
///
/// # Errors
///
/// Returns [`Error::PoolExhausted`] if the pool holds fewer than
/// `total_tasks` candidates. The selector never under-fills.
///
/// # Example
///
/// ```
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
/// use iped::generate::{select_tasks, CandidatePool};
/// use iped::ActivePattern;
///
/// let pool = CandidatePool::new(
///     (0..10).map(|i| ActivePattern::from_indices(10, &[i])).collect(),
///     10,
/// );
/// let mut rng = StdRng::seed_from_u64(4);
/// let chosen = select_tasks(&pool, 6, &mut rng).unwrap();
/// assert_eq!(chosen.len(), 6);
///
/// assert!(select_tasks(&pool, 11, &mut rng).is_err());
/// ```
pub fn select_tasks<R: Rng + ?Sized>(
    pool: &CandidatePool,
    total_tasks: usize,
    rng: &mut R,
) -> Result<Vec<ActivePattern>> {
    if pool.len() < total_tasks {
        return Err(Error::PoolExhausted {
            required: total_tasks,
            accepted: pool.len(),
            attempts: pool.attempts(),
        });
    }

    let slots = index::sample(rng, pool.len(), total_tasks);
    debug!(pool = pool.len(), selected = total_tasks, "selected pool slots");

    let patterns = pool.patterns();
    Ok(slots.iter().map(|slot| patterns[slot].clone()).collect())
}

/// Select tasks so that no respondent is shown the same pattern twice.
///
/// Pool slots are visited in a uniformly random order and dealt to
/// respondents in turn, T at a time. A slot whose pattern the current
/// respondent already has is set aside and offered first to the next
/// respondent. The result is respondent-major, ready for
/// [`assign_sequences`](super::assign_sequences).
///
/// # Errors
///
/// Returns [`Error::PoolExhausted`] if the pool runs out of slots before
/// every respondent has T distinct patterns.
///
/// # Example
///
/// ```
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
/// use iped::generate::{select_unique_tasks, CandidatePool};
/// use iped::ActivePattern;
///
/// // Three distinct patterns, four copies each
/// let pool = CandidatePool::new(
///     (0..12).map(|i| ActivePattern::from_indices(3, &[i % 3])).collect(),
///     12,
/// );
/// let mut rng = StdRng::seed_from_u64(4);
/// let chosen = select_unique_tasks(&pool, 3, 4, &mut rng).unwrap();
///
/// for group in chosen.chunks(3) {
///     assert!(group[0] != group[1] && group[1] != group[2] && group[0] != group[2]);
/// }
/// ```
pub fn select_unique_tasks<R: Rng + ?Sized>(
    pool: &CandidatePool,
    tasks_per_respondent: usize,
    num_respondents: usize,
    rng: &mut R,
) -> Result<Vec<ActivePattern>> {
    let total_tasks = tasks_per_respondent.saturating_mul(num_respondents);
    let exhausted = |accepted| Error::PoolExhausted {
        required: total_tasks,
        accepted,
        attempts: pool.attempts(),
    };
    if pool.len() < total_tasks {
        return Err(exhausted(pool.len()));
    }

    let patterns = pool.patterns();
    let mut remaining: VecDeque<usize> = index::sample(rng, pool.len(), pool.len())
        .into_iter()
        .collect();
    let mut selected = Vec::with_capacity(total_tasks);
    let mut seen: HashSet<&ActivePattern> = HashSet::with_capacity(tasks_per_respondent);
    let mut deferred = Vec::new();
    let mut skipped = 0usize;

    for _ in 0..num_respondents {
        seen.clear();
        while seen.len() < tasks_per_respondent {
            let Some(slot) = remaining.pop_front() else {
                return Err(exhausted(selected.len()));
            };
            let pattern = &patterns[slot];
            if seen.insert(pattern) {
                selected.push(pattern.clone());
            } else {
                deferred.push(slot);
                skipped += 1;
            }
        }
        for slot in deferred.drain(..).rev() {
            remaining.push_front(slot);
        }
    }

    debug!(
        pool = pool.len(),
        selected = total_tasks,
        skipped,
        "selected pool slots without per-respondent repeats"
    );
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn indexed_pool(n: usize) -> CandidatePool {
        // Each slot carries a distinct single-element pattern so slots can
        // be recovered from the selected patterns.
        CandidatePool::new(
            (0..n).map(|i| ActivePattern::from_indices(n, &[i])).collect(),
            n as u64,
        )
    }

    #[test]
    fn test_select_without_replacement() {
        let pool = indexed_pool(50);
        let mut rng = StdRng::seed_from_u64(17);
        let chosen = select_tasks(&pool, 30, &mut rng).unwrap();

        let slots: HashSet<usize> = chosen
            .iter()
            .map(|p| p.active_indices().next().unwrap())
            .collect();
        assert_eq!(slots.len(), 30);
    }

    #[test]
    fn test_select_whole_pool() {
        let pool = indexed_pool(12);
        let mut rng = StdRng::seed_from_u64(2);
        let chosen = select_tasks(&pool, 12, &mut rng).unwrap();
        let slots: HashSet<usize> = chosen
            .iter()
            .map(|p| p.active_indices().next().unwrap())
            .collect();
        assert_eq!(slots, (0..12).collect());
    }

    #[test]
    fn test_select_duplicates_allowed() {
        let same = ActivePattern::from_indices(4, &[0, 1]);
        let pool = CandidatePool::new(vec![same.clone(); 8], 8);
        let mut rng = StdRng::seed_from_u64(0);
        let chosen = select_tasks(&pool, 8, &mut rng).unwrap();
        assert!(chosen.iter().all(|p| *p == same));
    }

    #[test]
    fn test_select_short_pool() {
        let pool = indexed_pool(5);
        let mut rng = StdRng::seed_from_u64(1);
        let err = select_tasks(&pool, 6, &mut rng).unwrap_err();
        assert_eq!(
            err,
            Error::PoolExhausted {
                required: 6,
                accepted: 5,
                attempts: 5,
            }
        );
    }

    #[test]
    fn test_select_unique_per_respondent() {
        // Five distinct patterns, ten copies each: every respondent must get
        // one of each.
        let pool = CandidatePool::new(
            (0..50).map(|i| ActivePattern::from_indices(5, &[i % 5])).collect(),
            50,
        );
        let mut rng = StdRng::seed_from_u64(6);
        let chosen = select_unique_tasks(&pool, 5, 10, &mut rng).unwrap();

        assert_eq!(chosen.len(), 50);
        for group in chosen.chunks(5) {
            let distinct: HashSet<&ActivePattern> = group.iter().collect();
            assert_eq!(distinct.len(), 5);
        }
    }

    #[test]
    fn test_select_unique_exhausted() {
        let same = ActivePattern::from_indices(4, &[0, 1]);
        let pool = CandidatePool::new(vec![same; 8], 8);
        let mut rng = StdRng::seed_from_u64(0);
        let err = select_unique_tasks(&pool, 2, 2, &mut rng).unwrap_err();
        assert_eq!(
            err,
            Error::PoolExhausted {
                required: 4,
                accepted: 1,
                attempts: 8,
            }
        );
    }

    #[test]
    fn test_select_unique_short_pool() {
        let pool = indexed_pool(5);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            select_unique_tasks(&pool, 3, 2, &mut rng),
            Err(Error::PoolExhausted { required: 6, accepted: 5, .. })
        ));
    }

    #[test]
    fn test_select_reproducible() {
        let pool = indexed_pool(40);
        let a = select_tasks(&pool, 20, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = select_tasks(&pool, 20, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }
}
