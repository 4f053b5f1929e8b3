//! Structural verification of design matrices.
//!
//! Checks a design against the configuration it was generated for: task
//! totals, sequence shape, identifier consistency, active-element bounds and,
//! when the configuration asks for it, per-respondent pattern uniqueness.
//! Generated designs always pass; the checks matter for matrices assembled
//! by hand or loaded from elsewhere.

use std::collections::HashMap;

use crate::params::ValidatedParams;

use super::DesignMatrix;

/// Result of verifying a design matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    /// Whether the design passes every check.
    pub is_valid: bool,
    /// Details about any issues found.
    pub issues: Vec<VerificationIssue>,
}

/// A specific issue found during verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationIssue {
    /// The design does not hold R·T tasks or R sequences.
    TotalTaskMismatch {
        expected_tasks: usize,
        actual_tasks: usize,
        expected_respondents: usize,
        actual_respondents: usize,
    },
    /// A respondent sequence does not hold exactly T tasks.
    SequenceLengthMismatch {
        respondent: usize,
        expected: usize,
        actual: usize,
    },
    /// A sequence is stored at a position other than its respondent index.
    RespondentIndexMismatch { position: usize, found: usize },
    /// A task's identifier disagrees with its position in the design.
    TaskIndexMismatch {
        respondent: usize,
        position: usize,
        found_respondent: usize,
        found_task: usize,
    },
    /// A task's pattern does not span E elements.
    PatternWidthMismatch {
        respondent: usize,
        task: usize,
        expected: usize,
        actual: usize,
    },
    /// A task has too few or too many active elements.
    ActiveCountOutOfBounds {
        respondent: usize,
        task: usize,
        count: usize,
        min: usize,
        max: usize,
    },
    /// A respondent is shown the same pattern twice although the
    /// configuration forbids repeats.
    RepeatedPattern {
        respondent: usize,
        first: usize,
        repeat: usize,
    },
}

/// Verify a design matrix against a validated configuration.
///
/// # Example
///
/// ```
/// use iped::{verify_design, DesignBuilder};
///
/// let design = DesignBuilder::new()
///     .elements(5)
///     .tasks_per_respondent(3)
///     .respondents(4)
///     .active_range(2, 3)
///     .seed(3)
///     .build()
///     .unwrap();
///
/// let result = verify_design(design.matrix(), design.params());
/// assert!(result.is_valid);
/// ```
#[must_use]
pub fn verify_design(design: &DesignMatrix, params: &ValidatedParams) -> VerificationResult {
    let mut issues = Vec::new();
    let e = params.num_elements();
    let t = params.tasks_per_respondent();

    if design.num_tasks() != params.total_tasks()
        || design.num_respondents() != params.num_respondents()
    {
        issues.push(VerificationIssue::TotalTaskMismatch {
            expected_tasks: params.total_tasks(),
            actual_tasks: design.num_tasks(),
            expected_respondents: params.num_respondents(),
            actual_respondents: design.num_respondents(),
        });
    }

    for (position, seq) in design.sequences().iter().enumerate() {
        if seq.respondent_index() != position {
            issues.push(VerificationIssue::RespondentIndexMismatch {
                position,
                found: seq.respondent_index(),
            });
        }
        if seq.len() != t {
            issues.push(VerificationIssue::SequenceLengthMismatch {
                respondent: position,
                expected: t,
                actual: seq.len(),
            });
        }

        let mut first_seen = HashMap::new();
        for (task_pos, task) in seq.tasks().iter().enumerate() {
            if params.options().unique_per_respondent {
                if let Some(&first) = first_seen.get(task.pattern()) {
                    issues.push(VerificationIssue::RepeatedPattern {
                        respondent: position,
                        first,
                        repeat: task_pos,
                    });
                } else {
                    first_seen.insert(task.pattern(), task_pos);
                }
            }
            let id = task.id();
            if id.respondent_index != position || id.task_index != task_pos {
                issues.push(VerificationIssue::TaskIndexMismatch {
                    respondent: position,
                    position: task_pos,
                    found_respondent: id.respondent_index,
                    found_task: id.task_index,
                });
            }
            if task.pattern().len() != e {
                issues.push(VerificationIssue::PatternWidthMismatch {
                    respondent: position,
                    task: task_pos,
                    expected: e,
                    actual: task.pattern().len(),
                });
            }
            let count = task.active_count();
            if !params.accepts(count) {
                issues.push(VerificationIssue::ActiveCountOutOfBounds {
                    respondent: position,
                    task: task_pos,
                    count,
                    min: params.min_active(),
                    max: params.max_active(),
                });
            }
        }
    }

    VerificationResult {
        is_valid: issues.is_empty(),
        issues,
    }
}
