//! Parallel candidate search using Rayon.
//!
//! Enable with the `parallel` feature flag (on by default). Rejection-sampling
//! draws are independent, so each shard of a sampling round runs on its own
//! worker with a private RNG and a private output buffer. Buffers are merged
//! in shard order once the round completes; there is no shared mutable state
//! between workers.
//!
//! # Performance
//!
//! Parallel search pays off when the acceptance probability is small, since
//! the number of draws grows as `pool_target / p_accept`. For loose bounds a
//! round typically consists of a single shard and runs on one worker anyway.

use rayon::prelude::*;

use crate::generate::pool::{Bounds, Shard};
use crate::pattern::ActivePattern;

/// Draw every shard of a round in parallel, returning accepted patterns per
/// shard in plan order.
pub(crate) fn par_draw_shards(plan: &[Shard], bounds: Bounds) -> Vec<Vec<ActivePattern>> {
    plan.par_iter().map(|shard| shard.draw(bounds)).collect()
}
