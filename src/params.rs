//! Study configuration and its validation.
//!
//! [`DesignParams`] is the raw configuration record supplied by the study
//! management layer. [`DesignParams::validate`] checks it once and produces
//! a [`ValidatedParams`], which every later pipeline stage takes by
//! reference. A validated configuration is never modified; a parameter
//! change means building a new one.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::utils::binomial;

/// Default oversampling multiplier applied to the total task count.
pub const DEFAULT_OVERSAMPLING: usize = 20;

/// Default ceiling on rejection-sampling draws.
pub const DEFAULT_MAX_ATTEMPTS: u64 = 50_000_000;

/// Default number of draws per sampling shard.
pub const DEFAULT_SHARD_SIZE: u64 = 65_536;

/// The configuration record of one study design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DesignParams {
    /// Number of stimulus elements (E).
    pub num_elements: usize,
    /// Number of tasks each respondent completes (T).
    pub tasks_per_respondent: usize,
    /// Number of respondents (R).
    pub num_respondents: usize,
    /// Minimum number of active elements per task.
    pub min_active_elements: usize,
    /// Maximum number of active elements per task.
    pub max_active_elements: usize,
}

/// Tuning knobs for the candidate search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GenerationOptions {
    /// Pool size target as a multiple of the total task count.
    pub oversampling: usize,
    /// Maximum number of random draws before the search gives up.
    pub max_attempts: u64,
    /// Number of draws performed by one sampling shard.
    pub shard_size: u64,
    /// Seed for reproducible generation. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Never show a respondent the same pattern twice. Off by default, in
    /// which case selection is by pool slot and repeats are possible.
    #[cfg_attr(feature = "serde", serde(default))]
    pub unique_per_respondent: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            oversampling: DEFAULT_OVERSAMPLING,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            shard_size: DEFAULT_SHARD_SIZE,
            seed: None,
            unique_per_respondent: false,
        }
    }
}

impl DesignParams {
    /// Create a new configuration record. No validation is performed.
    #[must_use]
    pub fn new(
        num_elements: usize,
        tasks_per_respondent: usize,
        num_respondents: usize,
        min_active_elements: usize,
        max_active_elements: usize,
    ) -> Self {
        Self {
            num_elements,
            tasks_per_respondent,
            num_respondents,
            min_active_elements,
            max_active_elements,
        }
    }

    /// Validate with default generation options.
    ///
    /// # Errors
    ///
    /// See [`DesignParams::validate_with`].
    pub fn validate(&self) -> Result<ValidatedParams> {
        self.validate_with(GenerationOptions::default())
    }

    /// Validate the configuration together with the search options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameters`] naming the violated bound if:
    /// - `num_elements < 2`
    /// - `tasks_per_respondent < 1` or `num_respondents < 1`
    /// - `min_active_elements > max_active_elements`
    /// - `max_active_elements > num_elements`
    /// - any of the search options is zero
    /// - the total task count or pool target overflows
    ///
    /// # Example
    ///
    /// ```
    /// use iped::DesignParams;
    ///
    /// let params = DesignParams::new(16, 24, 200, 3, 4).validate().unwrap();
    /// assert_eq!(params.total_tasks(), 4800);
    /// assert_eq!(params.pool_target(), 96_000);
    ///
    /// let err = DesignParams::new(16, 24, 200, 5, 3).validate().unwrap_err();
    /// assert_eq!(err.parameter(), Some("min_active_elements"));
    /// ```
    pub fn validate_with(&self, options: GenerationOptions) -> Result<ValidatedParams> {
        if self.num_elements < 2 {
            return Err(Error::invalid_params(
                "num_elements",
                format!("must be at least 2, got {}", self.num_elements),
            ));
        }
        if self.tasks_per_respondent < 1 {
            return Err(Error::invalid_params(
                "tasks_per_respondent",
                "must be at least 1",
            ));
        }
        if self.num_respondents < 1 {
            return Err(Error::invalid_params("num_respondents", "must be at least 1"));
        }
        if self.min_active_elements > self.max_active_elements {
            return Err(Error::invalid_params(
                "min_active_elements",
                format!(
                    "{} exceeds max_active_elements {}",
                    self.min_active_elements, self.max_active_elements
                ),
            ));
        }
        if self.max_active_elements > self.num_elements {
            return Err(Error::invalid_params(
                "max_active_elements",
                format!(
                    "{} exceeds num_elements {}",
                    self.max_active_elements, self.num_elements
                ),
            ));
        }
        if options.oversampling < 1 {
            return Err(Error::invalid_params("oversampling", "must be at least 1"));
        }
        if options.max_attempts < 1 {
            return Err(Error::invalid_params("max_attempts", "must be at least 1"));
        }
        if options.shard_size < 1 {
            return Err(Error::invalid_params("shard_size", "must be at least 1"));
        }

        if options.unique_per_respondent {
            let distinct = self.distinct_patterns();
            if distinct < self.tasks_per_respondent as u64 {
                return Err(Error::invalid_params(
                    "tasks_per_respondent",
                    format!(
                        "{} unique tasks requested but only {} distinct patterns fit the bounds",
                        self.tasks_per_respondent, distinct
                    ),
                ));
            }
        }

        let total_tasks = self
            .tasks_per_respondent
            .checked_mul(self.num_respondents)
            .ok_or_else(|| {
                Error::invalid_params(
                    "num_respondents",
                    format!(
                        "{} x {} tasks overflows",
                        self.num_respondents, self.tasks_per_respondent
                    ),
                )
            })?;
        let pool_target = total_tasks.checked_mul(options.oversampling).ok_or_else(|| {
            Error::invalid_params(
                "oversampling",
                format!("{} x {} overflows", total_tasks, options.oversampling),
            )
        })?;

        Ok(ValidatedParams {
            params: *self,
            options,
            total_tasks,
            pool_target,
        })
    }
}

impl DesignParams {
    /// Number of distinct patterns whose active count lies within the
    /// bounds, `Σ C(E, k)` for `k` in `min..=max`. Saturates at `u64::MAX`.
    ///
    /// # Example
    ///
    /// ```
    /// use iped::DesignParams;
    ///
    /// // C(4, 1) + C(4, 2)
    /// assert_eq!(DesignParams::new(4, 2, 3, 1, 2).distinct_patterns(), 10);
    /// ```
    #[must_use]
    pub fn distinct_patterns(&self) -> u64 {
        let e = self.num_elements as u64;
        let hi = self.max_active_elements.min(self.num_elements) as u64;
        (self.min_active_elements as u64..=hi)
            .map(|k| binomial(e, k).unwrap_or(u64::MAX))
            .fold(0u64, u64::saturating_add)
    }
}

impl fmt::Display for DesignParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Design(E={}, T={}, R={}, active={}..={})",
            self.num_elements,
            self.tasks_per_respondent,
            self.num_respondents,
            self.min_active_elements,
            self.max_active_elements
        )
    }
}

/// A configuration that passed validation, with its derived quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ValidatedParams {
    params: DesignParams,
    options: GenerationOptions,
    total_tasks: usize,
    pool_target: usize,
}

impl ValidatedParams {
    /// The underlying configuration record.
    #[must_use]
    pub fn params(&self) -> &DesignParams {
        &self.params
    }

    /// The search options.
    #[must_use]
    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    /// Number of elements (E).
    #[must_use]
    pub fn num_elements(&self) -> usize {
        self.params.num_elements
    }

    /// Tasks per respondent (T).
    #[must_use]
    pub fn tasks_per_respondent(&self) -> usize {
        self.params.tasks_per_respondent
    }

    /// Number of respondents (R).
    #[must_use]
    pub fn num_respondents(&self) -> usize {
        self.params.num_respondents
    }

    /// Minimum active elements per task.
    #[must_use]
    pub fn min_active(&self) -> usize {
        self.params.min_active_elements
    }

    /// Maximum active elements per task.
    #[must_use]
    pub fn max_active(&self) -> usize {
        self.params.max_active_elements
    }

    /// Total number of tasks in the design (T·R).
    #[must_use]
    pub fn total_tasks(&self) -> usize {
        self.total_tasks
    }

    /// Target size of the candidate pool.
    #[must_use]
    pub fn pool_target(&self) -> usize {
        self.pool_target
    }

    /// Whether `count` active elements satisfy the bounds.
    #[must_use]
    pub fn accepts(&self, count: usize) -> bool {
        (self.min_active()..=self.max_active()).contains(&count)
    }
}
