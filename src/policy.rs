//! Default parameter policy for grid studies.
//!
//! Study wizards ask for the number of elements and respondents; the number
//! of active elements per task and the number of tasks per respondent are
//! usually derived. The policy uses a constant active count chosen by
//! breakpoints on E and pushes T up to a hard cap, limited by how many
//! distinct patterns of that size exist.

use crate::error::{Error, Result};
use crate::params::{DesignParams, GenerationOptions};
use crate::utils::binomial;

/// Default hard cap on tasks per respondent.
pub const DEFAULT_MAX_TASKS: usize = 24;

/// A recommended configuration with the reasoning behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    /// The recommended configuration (`min_active == max_active`).
    pub params: DesignParams,
    /// Number of distinct patterns with the chosen active count, C(E, K).
    pub capacity: u64,
    /// Human-readable notes on how T was chosen.
    pub notes: Vec<String>,
}

impl Recommendation {
    /// Generation options to pair with [`params`](Self::params): defaults
    /// with `unique_per_respondent` enabled.
    #[must_use]
    pub fn options(&self) -> GenerationOptions {
        GenerationOptions {
            unique_per_respondent: true,
            ..Default::default()
        }
    }
}

/// Preferred constant active count for `num_elements` elements.
///
/// | E | K |
/// |---|---|
/// | ≤ 8 | 2 |
/// | 9–16 | 3 |
/// | ≥ 17 | 4 |
///
/// The result is clamped to `[2, min(4, E)]`.
///
/// # Examples
///
/// ```
/// use iped::policy::target_active_for;
///
/// assert_eq!(target_active_for(6), 2);
/// assert_eq!(target_active_for(16), 3);
/// assert_eq!(target_active_for(40), 4);
/// ```
#[must_use]
pub fn target_active_for(num_elements: usize) -> usize {
    let k = match num_elements {
        0..=8 => 2,
        9..=16 => 3,
        _ => 4,
    };
    k.min(4.min(num_elements)).max(2)
}

/// Recommend a configuration for `num_elements` elements and
/// `num_respondents` respondents.
///
/// `T = min(max_tasks, C(E, K))`, the largest T for which every respondent
/// can be shown distinct patterns. Generate with
/// [`Recommendation::options`], which enables `unique_per_respondent`, to
/// actually rule out repeats.
///
/// # Errors
///
/// Returns [`Error::InvalidParameters`] if `num_elements < 4`,
/// `num_respondents < 1` or `max_tasks < 1`.
///
/// # Example
///
/// ```
/// use iped::policy::recommend_parameters;
///
/// let rec = recommend_parameters(16, 200, 24).unwrap();
/// assert_eq!(rec.params.min_active_elements, 3);
/// assert_eq!(rec.params.tasks_per_respondent, 24);
/// assert_eq!(rec.capacity, 560);
///
/// // C(4, 2) = 6 caps T
/// let rec = recommend_parameters(4, 10, 24).unwrap();
/// assert_eq!(rec.params.tasks_per_respondent, 6);
/// assert!(rec.options().unique_per_respondent);
/// ```
pub fn recommend_parameters(
    num_elements: usize,
    num_respondents: usize,
    max_tasks: usize,
) -> Result<Recommendation> {
    if num_elements < 4 {
        return Err(Error::invalid_params(
            "num_elements",
            format!("policy needs at least 4 elements, got {num_elements}"),
        ));
    }
    if num_respondents < 1 {
        return Err(Error::invalid_params("num_respondents", "must be at least 1"));
    }
    if max_tasks < 1 {
        return Err(Error::invalid_params("max_tasks", "must be at least 1"));
    }

    let k = target_active_for(num_elements);
    let capacity = binomial(num_elements as u64, k as u64).unwrap_or(u64::MAX);
    let tasks = usize::try_from(capacity).map_or(max_tasks, |cap| cap.min(max_tasks));

    let note = if capacity < max_tasks as u64 {
        format!("Capacity C({num_elements},{k})={capacity} < {max_tasks}; T clipped to {tasks}.")
    } else {
        format!("T set to the cap {tasks}; C({num_elements},{k})={capacity} distinct patterns.")
    };

    Ok(Recommendation {
        params: DesignParams::new(num_elements, tasks, num_respondents, k, k),
        capacity,
        notes: vec![note],
    })
}
