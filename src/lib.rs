//! # IPED
//!
//! Balanced random task designs for IPED / conjoint grid studies.
//!
//! ## Overview
//!
//! In a grid study each respondent rates a sequence of vignettes (tasks).
//! A task shows a subset of E stimulus elements, encoded as an E-bit
//! [`ActivePattern`]. This library generates the full design: R respondents
//! with T tasks each, where every task has between `min_active` and
//! `max_active` elements switched on.
//!
//! Generation runs in stages:
//! 1. Validate the configuration ([`DesignParams::validate`])
//! 2. Build an oversampled candidate pool by rejection sampling
//! 3. Select `R × T` candidates without replacement
//! 4. Split them into contiguous respondent sequences
//! 5. Optionally rebalance element exposure
//! 6. Report element and pair co-occurrence balance
//!
//! ## Quick Start
//!
//! ```rust
//! use iped::DesignBuilder;
//!
//! let design = DesignBuilder::new()
//!     .elements(8)
//!     .tasks_per_respondent(6)
//!     .respondents(10)
//!     .active_range(2, 3)
//!     .seed(2024)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(design.matrix().num_tasks(), 60);
//! for task in design.matrix().tasks() {
//!     assert!((2..=3).contains(&task.active_count()));
//! }
//! println!("{}", design.report());
//! ```
//!
//! Or derive the configuration from the default policy:
//!
//! ```rust
//! use iped::policy::recommend_parameters;
//! use iped::generate_design;
//!
//! let rec = recommend_parameters(12, 50, 24).unwrap();
//! let design = generate_design(&rec.params, &rec.options()).unwrap();
//! assert_eq!(design.matrix().num_respondents(), 50);
//! ```
//!
//! ## Logging
//!
//! Pipeline progress is reported through [`tracing`]. Install a subscriber
//! (for example `tracing-subscriber` with `RUST_LOG=iped=debug`) to see it.
//!
//! ## Features
//!
//! - `parallel` (default): draw candidate shards on the rayon thread pool
//! - `serde`: Enable serialization of parameters, patterns and designs
//! - `python`: Enable Python bindings via PyO3

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod builder;
pub mod design;
pub mod error;
pub mod generate;
pub mod params;
pub mod pattern;
pub mod policy;
#[cfg(feature = "python")]
pub mod python;
pub mod utils;

#[cfg(feature = "parallel")]
pub(crate) mod parallel;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::builder::{generate_design, Design, DesignBuilder};
    pub use crate::design::{
        analyze_balance, verify_design, BalanceReport, DesignMatrix, PairCount,
        RespondentSequence, SummaryStats, Task, TaskId,
    };
    pub use crate::error::{Error, Result};
    pub use crate::generate::{
        assign_sequences, generate_pool, rebalance, select_tasks, select_unique_tasks,
        CandidatePool, RebalanceConfig,
    };
    pub use crate::params::{DesignParams, GenerationOptions, ValidatedParams};
    pub use crate::pattern::ActivePattern;
    pub use crate::policy::{recommend_parameters, Recommendation};
}

// Re-export commonly used items at crate root
pub use builder::{generate_design, Design, DesignBuilder};
pub use design::{
    analyze_balance, verify_design, BalanceReport, DesignMatrix, PairCount, RespondentSequence,
    SummaryStats, Task, TaskId,
};
pub use error::{Error, Result};
pub use generate::RebalanceConfig;
pub use params::{DesignParams, GenerationOptions, ValidatedParams};
pub use pattern::ActivePattern;
