//! The generation pipeline stages.
//!
//! | Stage | Function | Output |
//! |-------|----------|--------|
//! | Candidate pool | [`generate_pool`] | [`CandidatePool`] of valid patterns |
//! | Selection | [`select_tasks`] | `total_tasks` patterns, random order |
//! | Selection without repeats (opt-in) | [`select_unique_tasks`] | the same, with no pattern repeated within a respondent |
//! | Assignment | [`assign_sequences`] | [`DesignMatrix`](crate::DesignMatrix) |
//! | Rebalancing (optional) | [`rebalance`] | a new, better balanced matrix |
//!
//! [`DesignBuilder`](crate::DesignBuilder) runs these in order; they are
//! public so callers can reuse a pool or inspect intermediate results.
//!
//! ```
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use iped::generate::{assign_sequences, generate_pool, select_tasks};
//! use iped::DesignParams;
//!
//! let params = DesignParams::new(4, 2, 3, 1, 2).validate().unwrap();
//! let mut rng = StdRng::seed_from_u64(0);
//!
//! let pool = generate_pool(&params, &mut rng).unwrap();
//! let selected = select_tasks(&pool, params.total_tasks(), &mut rng).unwrap();
//! let design = assign_sequences(selected, &params).unwrap();
//!
//! assert_eq!(design.num_tasks(), 6);
//! ```

mod assign;
pub(crate) mod pool;
mod rebalance;
mod select;

pub use assign::assign_sequences;
pub use pool::{generate_pool, CandidatePool};
pub use rebalance::{rebalance, RebalanceConfig};
pub use select::{select_tasks, select_unique_tasks};
