//! Partitioning of selected tasks into respondent sequences.

use crate::design::{DesignMatrix, RespondentSequence, Task, TaskId};
use crate::error::{Error, Result};
use crate::params::ValidatedParams;
use crate::pattern::ActivePattern;

/// Split the selected tasks into R contiguous groups of T, in selection
/// order, and give each task its `(respondent_index, task_index)` id.
///
/// No randomisation happens here: the same selection always yields the
/// same design.
///
/// # Errors
///
/// Returns [`Error::PoolExhausted`] if `selected` does not hold exactly
/// `total_tasks` patterns.
pub fn assign_sequences(
    selected: Vec<ActivePattern>,
    params: &ValidatedParams,
) -> Result<DesignMatrix> {
    if selected.len() != params.total_tasks() {
        return Err(Error::PoolExhausted {
            required: params.total_tasks(),
            accepted: selected.len(),
            attempts: 0,
        });
    }

    let t = params.tasks_per_respondent();
    let mut sequences = Vec::with_capacity(params.num_respondents());
    let mut iter = selected.into_iter();

    for respondent in 0..params.num_respondents() {
        let tasks = iter
            .by_ref()
            .take(t)
            .enumerate()
            .map(|(task_index, pattern)| Task::new(TaskId::new(respondent, task_index), pattern))
            .collect();
        sequences.push(RespondentSequence::new(respondent, tasks));
    }

    Ok(DesignMatrix::from_sequences(params.num_elements(), sequences))
}
