//! Design matrix core types.
//!
//! ## Overview
//!
//! - [`TaskId`]: composite `(respondent_index, task_index)` identifier
//! - [`Task`]: one presentation, an identifier plus its [`ActivePattern`]
//! - [`RespondentSequence`]: the ordered tasks shown to one respondent
//! - [`DesignMatrix`]: every respondent sequence of one study
//!
//! A design matrix produced by the generator satisfies:
//! - it holds exactly R·T tasks
//! - every task has between `min_active` and `max_active` active elements
//! - each sequence carries task indices 0..T-1 in order, without gaps
//!
//! Design matrices are immutable. Operations that "change" a design, such as
//! rebalancing, return a new matrix.

mod stats;
mod verify;

pub use stats::{analyze_balance, BalanceReport, PairCount, SummaryStats};
pub use verify::{verify_design, VerificationIssue, VerificationResult};

use ndarray::Array2;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::pattern::ActivePattern;

/// Stable identifier of a task within a design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TaskId {
    /// Respondent the task is assigned to.
    pub respondent_index: usize,
    /// Presentation position within the respondent's sequence.
    pub task_index: usize,
}

impl TaskId {
    /// Create a new task identifier.
    #[must_use]
    pub fn new(respondent_index: usize, task_index: usize) -> Self {
        Self {
            respondent_index,
            task_index,
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.respondent_index, self.task_index)
    }
}

/// One presentation unit: a set of elements shown together for rating.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Task {
    id: TaskId,
    pattern: ActivePattern,
}

impl Task {
    /// Create a task from its identifier and active pattern.
    #[must_use]
    pub fn new(id: TaskId, pattern: ActivePattern) -> Self {
        Self { id, pattern }
    }

    /// The task's identifier.
    #[must_use]
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Position of the task in its respondent's sequence.
    #[must_use]
    pub fn task_index(&self) -> usize {
        self.id.task_index
    }

    /// The respondent the task belongs to.
    #[must_use]
    pub fn respondent_index(&self) -> usize {
        self.id.respondent_index
    }

    /// The active-element bit pattern.
    #[must_use]
    pub fn pattern(&self) -> &ActivePattern {
        &self.pattern
    }

    /// Number of active elements.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.pattern.count_active()
    }

    /// Indices of the active elements in ascending order.
    #[must_use]
    pub fn active_element_indices(&self) -> Vec<usize> {
        self.pattern.active_indices().collect()
    }
}

/// The ordered list of tasks assigned to one respondent.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RespondentSequence {
    respondent_index: usize,
    tasks: Vec<Task>,
}

impl RespondentSequence {
    /// Create a sequence. Task order is presentation order.
    #[must_use]
    pub fn new(respondent_index: usize, tasks: Vec<Task>) -> Self {
        Self {
            respondent_index,
            tasks,
        }
    }

    /// Index of the respondent.
    #[must_use]
    pub fn respondent_index(&self) -> usize {
        self.respondent_index
    }

    /// Label used in tabular exports (`C1`, `C2`, ...).
    #[must_use]
    pub fn label(&self) -> String {
        format!("C{}", self.respondent_index + 1)
    }

    /// Tasks in presentation order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Number of tasks in the sequence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the sequence has no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// The complete assignment of tasks to respondents for one study.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawDesign"))]
pub struct DesignMatrix {
    num_elements: usize,
    sequences: Vec<RespondentSequence>,
}

/// Unchecked wire form of a [`DesignMatrix`].
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawDesign {
    num_elements: usize,
    sequences: Vec<RespondentSequence>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawDesign> for DesignMatrix {
    type Error = crate::error::Error;

    fn try_from(raw: RawDesign) -> Result<Self, Self::Error> {
        if let Some(task) = raw
            .sequences
            .iter()
            .flat_map(|s| s.tasks.iter())
            .find(|t| t.pattern.len() != raw.num_elements)
        {
            return Err(crate::error::Error::invalid_params(
                "num_elements",
                format!(
                    "task {} spans {} elements, design has {}",
                    task.id,
                    task.pattern.len(),
                    raw.num_elements
                ),
            ));
        }
        Ok(Self::from_sequences(raw.num_elements, raw.sequences))
    }
}

impl DesignMatrix {
    /// Assemble a design matrix from respondent sequences.
    ///
    /// No invariants are checked here; use [`verify_design`] on matrices
    /// that did not come out of the generator.
    #[must_use]
    pub fn from_sequences(num_elements: usize, sequences: Vec<RespondentSequence>) -> Self {
        Self {
            num_elements,
            sequences,
        }
    }

    /// Number of elements (E).
    #[must_use]
    pub fn num_elements(&self) -> usize {
        self.num_elements
    }

    /// Number of respondents (R).
    #[must_use]
    pub fn num_respondents(&self) -> usize {
        self.sequences.len()
    }

    /// Total number of tasks across all respondents.
    #[must_use]
    pub fn num_tasks(&self) -> usize {
        self.sequences.iter().map(RespondentSequence::len).sum()
    }

    /// All respondent sequences, ordered by respondent index.
    #[must_use]
    pub fn sequences(&self) -> &[RespondentSequence] {
        &self.sequences
    }

    /// The sequence of one respondent.
    #[must_use]
    pub fn sequence(&self, respondent_index: usize) -> Option<&RespondentSequence> {
        self.sequences.get(respondent_index)
    }

    /// Iterate over every task, respondent-major.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.sequences.iter().flat_map(|s| s.tasks.iter())
    }

    /// Look up a task by identifier.
    #[must_use]
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.sequences
            .get(id.respondent_index)?
            .tasks
            .get(id.task_index)
    }

    /// Column labels for tabular exports (`E1`, `E2`, ...).
    #[must_use]
    pub fn element_labels(&self) -> Vec<String> {
        (1..=self.num_elements).map(|i| format!("E{i}")).collect()
    }

    /// Row labels for tabular exports: one respondent label per task.
    #[must_use]
    pub fn respondent_labels(&self) -> Vec<String> {
        self.sequences
            .iter()
            .flat_map(|s| std::iter::repeat(s.label()).take(s.len()))
            .collect()
    }

    /// The design as a task × element 1/0 matrix, one row per task in
    /// respondent-major order.
    ///
    /// # Example
    ///
    /// ```
    /// use iped::DesignBuilder;
    ///
    /// let design = DesignBuilder::new()
    ///     .elements(4)
    ///     .tasks_per_respondent(2)
    ///     .respondents(3)
    ///     .active_range(1, 2)
    ///     .seed(1)
    ///     .build()
    ///     .unwrap();
    ///
    /// let x = design.matrix().to_array();
    /// assert_eq!(x.dim(), (6, 4));
    /// for row in x.rows() {
    ///     let active = row.iter().filter(|&&v| v == 1).count();
    ///     assert!((1..=2).contains(&active));
    /// }
    /// ```
    #[must_use]
    pub fn to_array(&self) -> Array2<u8> {
        let mut data = Array2::zeros((self.num_tasks(), self.num_elements));
        for (row, task) in self.tasks().enumerate() {
            for col in task.pattern.active_indices() {
                data[[row, col]] = 1;
            }
        }
        data
    }

    /// Compute the balance report of this design.
    #[must_use]
    pub fn balance_report(&self) -> BalanceReport {
        analyze_balance(self)
    }
}

impl fmt::Debug for DesignMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DesignMatrix(E={}, R={}, tasks={})",
            self.num_elements,
            self.num_respondents(),
            self.num_tasks()
        )
    }
}

impl fmt::Display for DesignMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Respondent,Task,{}", self.element_labels().join(","))?;
        for seq in &self.sequences {
            let label = seq.label();
            for task in &seq.tasks {
                let bits: Vec<String> = task
                    .pattern
                    .to_bits()
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                writeln!(f, "{},{},{}", label, task.task_index(), bits.join(","))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_small() -> DesignMatrix {
        let s0 = RespondentSequence::new(
            0,
            vec![
                Task::new(TaskId::new(0, 0), ActivePattern::from_indices(3, &[0])),
                Task::new(TaskId::new(0, 1), ActivePattern::from_indices(3, &[1, 2])),
            ],
        );
        let s1 = RespondentSequence::new(
            1,
            vec![
                Task::new(TaskId::new(1, 0), ActivePattern::from_indices(3, &[0, 2])),
                Task::new(TaskId::new(1, 1), ActivePattern::from_indices(3, &[2])),
            ],
        );
        DesignMatrix::from_sequences(3, vec![s0, s1])
    }

    #[test]
    fn test_counts_and_lookup() {
        let m = make_small();
        assert_eq!(m.num_respondents(), 2);
        assert_eq!(m.num_tasks(), 4);
        assert_eq!(m.task(TaskId::new(1, 0)).unwrap().active_element_indices(), vec![0, 2]);
        assert!(m.task(TaskId::new(2, 0)).is_none());
        assert!(m.task(TaskId::new(0, 2)).is_none());
    }

    #[test]
    fn test_to_array() {
        let x = make_small().to_array();
        assert_eq!(x.dim(), (4, 3));
        assert_eq!(x.row(0).to_vec(), vec![1, 0, 0]);
        assert_eq!(x.row(1).to_vec(), vec![0, 1, 1]);
        assert_eq!(x.row(3).to_vec(), vec![0, 0, 1]);
    }

    #[test]
    fn test_labels() {
        let m = make_small();
        assert_eq!(m.element_labels(), vec!["E1", "E2", "E3"]);
        assert_eq!(m.respondent_labels(), vec!["C1", "C1", "C2", "C2"]);
    }

    #[test]
    fn test_display() {
        let text = make_small().to_string();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Respondent,Task,E1,E2,E3"));
        assert_eq!(lines.next(), Some("C1,0,1,0,0"));
        assert_eq!(text.lines().count(), 5);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_checks_pattern_width() {
        let m = make_small();
        let json = serde_json::to_string(&m).unwrap();
        let back: DesignMatrix = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);

        // Same tasks, declared with two elements instead of three
        let mut value = serde_json::to_value(&m).unwrap();
        value["num_elements"] = serde_json::json!(2);
        assert!(serde_json::from_value::<DesignMatrix>(value).is_err());
    }

    #[test]
    fn test_task_id_display() {
        assert_eq!(TaskId::new(3, 7).to_string(), "3_7");
    }
}
