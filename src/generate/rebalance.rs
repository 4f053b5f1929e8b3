//! Optional exposure rebalancing.
//!
//! Random selection from an oversampled pool balances element exposure only
//! on average. [`rebalance`] tightens it after the fact with single-bit swaps:
//! within one task, an over-exposed element is switched off and an
//! under-exposed one switched on. The task's active count does not change, so
//! the active-element bounds still hold.
//!
//! A swap is only made when the donor's count exceeds the receiver's by at
//! least two, which strictly lowers the variance of the element counts.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::design::{DesignMatrix, RespondentSequence, SummaryStats, Task};
use crate::error::{Error, Result};
use crate::pattern::ActivePattern;

/// Settings for [`rebalance`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RebalanceConfig {
    /// Stop once the element-count coefficient of variation is at or below
    /// this value.
    pub exposure_tol_cv: f64,
    /// Maximum number of passes over the over-exposed elements.
    pub max_passes: usize,
    /// Skip swaps that would repeat a pattern already shown to the same
    /// respondent.
    pub unique_per_respondent: bool,
}

impl Default for RebalanceConfig {
    fn default() -> Self {
        Self {
            exposure_tol_cv: 0.01,
            max_passes: 8,
            unique_per_respondent: true,
        }
    }
}

fn element_totals(rows: &[Vec<ActivePattern>], e: usize) -> Vec<usize> {
    let mut totals = vec![0usize; e];
    for pattern in rows.iter().flatten() {
        for i in pattern.active_indices() {
            totals[i] += 1;
        }
    }
    totals
}

fn cv(totals: &[usize]) -> f64 {
    SummaryStats::from_counts(totals).coefficient_of_variation()
}

/// Return a copy of `design` with element exposure evened out.
///
/// Best effort: stops when the coefficient of variation of the element
/// counts reaches `exposure_tol_cv`, when a pass makes no swap, or after
/// `max_passes` passes. Task identifiers, sequence shapes and per-task
/// active counts are preserved. The input design is not modified.
///
/// # Errors
///
/// Returns [`Error::InvalidParameters`] if `exposure_tol_cv` is negative or
/// not finite.
///
/// # Example
///
/// ```
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
/// use iped::generate::{rebalance, RebalanceConfig};
/// use iped::DesignBuilder;
///
/// let design = DesignBuilder::new()
///     .elements(10)
///     .tasks_per_respondent(12)
///     .respondents(20)
///     .active_range(2, 4)
///     .seed(21)
///     .build()
///     .unwrap();
///
/// let mut rng = StdRng::seed_from_u64(0);
/// let balanced = rebalance(design.matrix(), &RebalanceConfig::default(), &mut rng).unwrap();
///
/// let before = design.matrix().balance_report().element_stats.std_dev;
/// let after = balanced.balance_report().element_stats.std_dev;
/// assert!(after <= before);
/// ```
pub fn rebalance<R: Rng + ?Sized>(
    design: &DesignMatrix,
    config: &RebalanceConfig,
    rng: &mut R,
) -> Result<DesignMatrix> {
    if !config.exposure_tol_cv.is_finite() || config.exposure_tol_cv < 0.0 {
        return Err(Error::invalid_params(
            "exposure_tol_cv",
            format!("must be finite and non-negative, got {}", config.exposure_tol_cv),
        ));
    }

    let e = design.num_elements();
    let mut rows: Vec<Vec<ActivePattern>> = design
        .sequences()
        .iter()
        .map(|s| s.tasks().iter().map(|t| t.pattern().clone()).collect())
        .collect();

    let mut seen: Vec<HashMap<ActivePattern, usize>> = rows
        .iter()
        .map(|seq| {
            let mut counts = HashMap::new();
            for p in seq {
                *counts.entry(p.clone()).or_insert(0) += 1;
            }
            counts
        })
        .collect();

    let mut totals = element_totals(&rows, e);
    let initial_cv = cv(&totals);
    let mut swaps = 0usize;
    let mut passes = 0usize;

    while passes < config.max_passes && cv(&totals) > config.exposure_tol_cv {
        passes += 1;
        let mean = totals.iter().sum::<usize>() as f64 / e as f64;

        let mut donors: Vec<usize> = (0..e).filter(|&i| totals[i] as f64 > mean).collect();
        donors.sort_by(|&a, &b| totals[b].cmp(&totals[a]).then(a.cmp(&b)));

        let mut moved = false;
        for donor in donors {
            let mut locations: Vec<(usize, usize)> = rows
                .iter()
                .enumerate()
                .flat_map(|(r, seq)| {
                    seq.iter()
                        .enumerate()
                        .filter(move |(_, p)| p.is_active(donor))
                        .map(move |(t, _)| (r, t))
                })
                .collect();
            locations.shuffle(rng);

            for (r, t) in locations {
                if totals[donor] as f64 <= mean {
                    break;
                }

                let mut receivers: Vec<usize> = (0..e)
                    .filter(|&i| totals[i] + 2 <= totals[donor] && !rows[r][t].is_active(i))
                    .collect();
                receivers.sort_by(|&a, &b| totals[a].cmp(&totals[b]).then(a.cmp(&b)));

                for receiver in receivers {
                    let mut candidate = rows[r][t].clone();
                    candidate.set(donor, false);
                    candidate.set(receiver, true);

                    if config.unique_per_respondent && seen[r].contains_key(&candidate) {
                        continue;
                    }

                    let old = std::mem::replace(&mut rows[r][t], candidate.clone());
                    if let Some(count) = seen[r].get_mut(&old) {
                        *count -= 1;
                        if *count == 0 {
                            seen[r].remove(&old);
                        }
                    }
                    *seen[r].entry(candidate).or_insert(0) += 1;
                    totals[donor] -= 1;
                    totals[receiver] += 1;
                    swaps += 1;
                    moved = true;
                    break;
                }
            }
        }

        debug!(pass = passes, swaps, cv = cv(&totals), "rebalance pass complete");
        if !moved {
            break;
        }
    }

    info!(
        swaps,
        passes,
        cv_before = initial_cv,
        cv_after = cv(&totals),
        "rebalanced element exposure"
    );

    let sequences = design
        .sequences()
        .iter()
        .zip(rows)
        .map(|(seq, patterns)| {
            let tasks = seq
                .tasks()
                .iter()
                .zip(patterns)
                .map(|(task, pattern)| Task::new(task.id(), pattern))
                .collect();
            RespondentSequence::new(seq.respondent_index(), tasks)
        })
        .collect();

    Ok(DesignMatrix::from_sequences(e, sequences))
}
