//! Builder pattern for generating study designs.
//!
//! The builder runs the whole pipeline: validate the configuration, build a
//! candidate pool by rejection sampling, select the design's tasks, assign
//! them to respondents, optionally rebalance, and analyze the result.
//!
//! # Example
//!
//! ```
//! use iped::DesignBuilder;
//!
//! let design = DesignBuilder::new()
//!     .elements(16)
//!     .tasks_per_respondent(24)
//!     .respondents(20)
//!     .active_range(3, 4)
//!     .seed(42)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(design.matrix().num_tasks(), 480);
//! assert_eq!(design.matrix().num_respondents(), 20);
//! let (lo, hi) = design.report().active_count_range;
//! assert!(lo >= 3 && hi <= 4);
//! ```
//!
//! # Reproducibility
//!
//! With [`DesignBuilder::seed`] the same configuration always yields the
//! same design. Without a seed, the generator is seeded from OS entropy.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};

use crate::design::{analyze_balance, verify_design, BalanceReport, DesignMatrix};
use crate::error::{Error, Result};
use crate::generate::{
    assign_sequences, generate_pool, rebalance, select_tasks, select_unique_tasks, RebalanceConfig,
};
use crate::params::{DesignParams, GenerationOptions, ValidatedParams};

/// A generated design together with its diagnostics.
#[derive(Debug, Clone)]
pub struct Design {
    params: ValidatedParams,
    matrix: DesignMatrix,
    report: BalanceReport,
    pool_size: usize,
    pool_attempts: u64,
}

impl Design {
    /// The validated configuration the design was generated from.
    #[must_use]
    pub fn params(&self) -> &ValidatedParams {
        &self.params
    }

    /// The design matrix.
    #[must_use]
    pub fn matrix(&self) -> &DesignMatrix {
        &self.matrix
    }

    /// The balance report of the design matrix.
    #[must_use]
    pub fn report(&self) -> &BalanceReport {
        &self.report
    }

    /// Number of candidates in the pool the tasks were drawn from.
    #[must_use]
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Random draws spent building the pool.
    #[must_use]
    pub fn pool_attempts(&self) -> u64 {
        self.pool_attempts
    }

    /// Split into the design matrix and its report.
    #[must_use]
    pub fn into_parts(self) -> (DesignMatrix, BalanceReport) {
        (self.matrix, self.report)
    }
}

/// Builder for generating study designs.
///
/// Element count, tasks per respondent, respondent count and the active
/// range are required; everything else has defaults (see
/// [`GenerationOptions`]).
#[derive(Debug, Clone, Default)]
pub struct DesignBuilder {
    num_elements: Option<usize>,
    tasks_per_respondent: Option<usize>,
    num_respondents: Option<usize>,
    active_range: Option<(usize, usize)>,
    options: GenerationOptions,
    rebalance: Option<RebalanceConfig>,
}

impl DesignBuilder {
    /// Create a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration record.
    #[must_use]
    pub fn from_params(params: &DesignParams) -> Self {
        Self::new()
            .elements(params.num_elements)
            .tasks_per_respondent(params.tasks_per_respondent)
            .respondents(params.num_respondents)
            .active_range(params.min_active_elements, params.max_active_elements)
    }

    /// Set the number of stimulus elements.
    #[must_use]
    pub fn elements(mut self, num_elements: usize) -> Self {
        self.num_elements = Some(num_elements);
        self
    }

    /// Set the number of tasks each respondent completes.
    #[must_use]
    pub fn tasks_per_respondent(mut self, tasks: usize) -> Self {
        self.tasks_per_respondent = Some(tasks);
        self
    }

    /// Set the number of respondents.
    #[must_use]
    pub fn respondents(mut self, num_respondents: usize) -> Self {
        self.num_respondents = Some(num_respondents);
        self
    }

    /// Set the inclusive range of active elements per task.
    #[must_use]
    pub fn active_range(mut self, min_active: usize, max_active: usize) -> Self {
        self.active_range = Some((min_active, max_active));
        self
    }

    /// Set the pool oversampling multiplier. Default 20.
    #[must_use]
    pub fn oversampling(mut self, factor: usize) -> Self {
        self.options.oversampling = factor;
        self
    }

    /// Set the ceiling on rejection-sampling draws.
    #[must_use]
    pub fn max_attempts(mut self, attempts: u64) -> Self {
        self.options.max_attempts = attempts;
        self
    }

    /// Set the number of draws per sampling shard.
    #[must_use]
    pub fn shard_size(mut self, draws: u64) -> Self {
        self.options.shard_size = draws;
        self
    }

    /// Seed the generator for reproducible output.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.options.seed = Some(seed);
        self
    }

    /// Never show a respondent the same pattern twice.
    ///
    /// Requires T to be at most the number of distinct patterns within the
    /// active range.
    #[must_use]
    pub fn unique_per_respondent(mut self, unique: bool) -> Self {
        self.options.unique_per_respondent = unique;
        self
    }

    /// Replace all search options at once.
    #[must_use]
    pub fn options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    /// Enable the exposure rebalancing pass.
    #[must_use]
    pub fn rebalance(mut self, config: RebalanceConfig) -> Self {
        self.rebalance = Some(config);
        self
    }

    /// The configuration record described by this builder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameters`] if a required setting is missing.
    pub fn params(&self) -> Result<DesignParams> {
        let num_elements = self
            .num_elements
            .ok_or_else(|| Error::invalid_params("num_elements", "must be specified"))?;
        let tasks = self
            .tasks_per_respondent
            .ok_or_else(|| Error::invalid_params("tasks_per_respondent", "must be specified"))?;
        let respondents = self
            .num_respondents
            .ok_or_else(|| Error::invalid_params("num_respondents", "must be specified"))?;
        let (min_active, max_active) = self
            .active_range
            .ok_or_else(|| Error::invalid_params("active_range", "must be specified"))?;

        Ok(DesignParams::new(
            num_elements,
            tasks,
            respondents,
            min_active,
            max_active,
        ))
    }

    /// Generate the design.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameters`] for a missing or inconsistent
    /// configuration, and [`Error::PoolExhausted`] if rejection sampling
    /// cannot find enough valid tasks within the attempt ceiling. No design
    /// is produced in either case.
    pub fn build(self) -> Result<Design> {
        let params = self.params()?.validate_with(self.options)?;
        run_pipeline(params, self.rebalance.as_ref())
    }
}

fn run_pipeline(params: ValidatedParams, rebalance_with: Option<&RebalanceConfig>) -> Result<Design> {
    info!(
        params = %params.params(),
        total_tasks = params.total_tasks(),
        pool_target = params.pool_target(),
        "generating design"
    );

    let mut rng = match params.options().seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let pool = generate_pool(&params, &mut rng)?;
    let selected = if params.options().unique_per_respondent {
        select_unique_tasks(
            &pool,
            params.tasks_per_respondent(),
            params.num_respondents(),
            &mut rng,
        )?
    } else {
        select_tasks(&pool, params.total_tasks(), &mut rng)?
    };
    let mut matrix = assign_sequences(selected, &params)?;

    if let Some(config) = rebalance_with {
        matrix = rebalance(&matrix, config, &mut rng)?;
    }

    let verification = verify_design(&matrix, &params);
    for issue in &verification.issues {
        error!(?issue, "generated design violates an invariant");
    }

    let report = analyze_balance(&matrix);
    info!(
        tasks = matrix.num_tasks(),
        pool = pool.len(),
        attempts = pool.attempts(),
        element_cv = report.element_stats.coefficient_of_variation(),
        pair_cv = report.pair_stats.coefficient_of_variation(),
        "design generated"
    );

    Ok(Design {
        params,
        matrix,
        report,
        pool_size: pool.len(),
        pool_attempts: pool.attempts(),
    })
}

/// Generate a design from a configuration record and search options.
///
/// This is a shorthand for using the builder.
///
/// # Errors
///
/// See [`DesignBuilder::build`].
///
/// # Example
///
/// ```
/// use iped::{generate_design, DesignParams, GenerationOptions};
///
/// let params = DesignParams::new(4, 2, 3, 1, 2);
/// let options = GenerationOptions {
///     seed: Some(7),
///     ..Default::default()
/// };
/// let design = generate_design(&params, &options).unwrap();
/// assert_eq!(design.matrix().num_tasks(), 6);
/// ```
pub fn generate_design(params: &DesignParams, options: &GenerationOptions) -> Result<Design> {
    DesignBuilder::from_params(params).options(*options).build()
}
