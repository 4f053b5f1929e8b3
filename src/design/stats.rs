//! Balance diagnostics for design matrices.
//!
//! Main-effect balance asks whether every element is shown about equally
//! often; pairwise balance asks the same of every unordered pair of elements.
//! [`analyze_balance`] computes both, with summary statistics, and is a pure
//! function of the design.

use ndarray::Array2;
use std::fmt;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::utils::combinations;

use super::DesignMatrix;

/// Min / max / mean / standard deviation of a count distribution.
///
/// The standard deviation is the sample standard deviation (n − 1
/// denominator); it is zero for distributions with fewer than two values.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SummaryStats {
    /// Smallest count.
    pub min: usize,
    /// Largest count.
    pub max: usize,
    /// Mean count.
    pub mean: f64,
    /// Sample standard deviation of the counts.
    pub std_dev: f64,
}

impl SummaryStats {
    /// Summarise a list of counts. An empty list yields all zeros.
    #[must_use]
    pub fn from_counts(counts: &[usize]) -> Self {
        let n = counts.len();
        if n == 0 {
            return Self {
                min: 0,
                max: 0,
                mean: 0.0,
                std_dev: 0.0,
            };
        }

        let min = counts.iter().copied().min().unwrap_or(0);
        let max = counts.iter().copied().max().unwrap_or(0);
        let mean = counts.iter().sum::<usize>() as f64 / n as f64;
        let std_dev = if n > 1 {
            let ss: f64 = counts.iter().map(|&c| (c as f64 - mean).powi(2)).sum();
            (ss / (n - 1) as f64).sqrt()
        } else {
            0.0
        };

        Self {
            min,
            max,
            mean,
            std_dev,
        }
    }

    /// Standard deviation relative to the mean; zero when the mean is zero.
    #[must_use]
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.mean > 0.0 {
            self.std_dev / self.mean
        } else {
            0.0
        }
    }

    /// `max - min`.
    #[must_use]
    pub fn spread(&self) -> usize {
        self.max - self.min
    }
}

/// Co-occurrence count of one unordered element pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PairCount {
    /// Lower element index.
    pub first: usize,
    /// Higher element index.
    pub second: usize,
    /// Number of tasks in which both elements are active.
    pub count: usize,
}

/// A report on the main-effect and pairwise balance of a design.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct BalanceReport {
    /// Number of elements.
    pub num_elements: usize,
    /// Number of tasks analysed.
    pub num_tasks: usize,
    /// Smallest and largest number of active elements in any task.
    pub active_count_range: (usize, usize),
    /// Per-element appearance counts, indexed by element.
    pub element_counts: Vec<usize>,
    /// Summary of `element_counts`.
    pub element_stats: SummaryStats,
    /// Co-occurrence counts for every pair `first < second`, in
    /// lexicographic order.
    pub pair_counts: Vec<PairCount>,
    /// Summary of the pair counts.
    pub pair_stats: SummaryStats,
    /// Appearances per element if active slots were spread perfectly evenly.
    pub expected_element_count: f64,
}

impl BalanceReport {
    /// Co-occurrence count of elements `a` and `b` (order irrelevant).
    ///
    /// Returns `None` if `a == b` or either index is out of range.
    #[must_use]
    pub fn pair_count(&self, a: usize, b: usize) -> Option<usize> {
        let (i, j) = if a < b { (a, b) } else { (b, a) };
        let e = self.num_elements;
        if i == j || j >= e {
            return None;
        }
        let idx = i * (2 * e - i - 1) / 2 + (j - i - 1);
        self.pair_counts.get(idx).map(|p| p.count)
    }

    /// Whether every element count lies within `tolerance` (a fraction,
    /// e.g. `0.15`) of the expected count.
    #[must_use]
    pub fn elements_within(&self, tolerance: f64) -> bool {
        let expected = self.expected_element_count;
        self.element_counts
            .iter()
            .all(|&c| (c as f64 - expected).abs() <= tolerance * expected)
    }
}

/// Compute the balance report of a design.
///
/// Pair counts are the strict upper triangle of `XᵀX`, where `X` is the
/// task × element 1/0 matrix; element counts are its diagonal. `X` itself is
/// never materialised: the product is accumulated from each task's active
/// indices, so memory is `O(E²)` regardless of the number of tasks.
///
/// # Example
///
/// ```
/// use iped::DesignBuilder;
///
/// let design = DesignBuilder::new()
///     .elements(6)
///     .tasks_per_respondent(4)
///     .respondents(10)
///     .active_range(2, 3)
///     .seed(9)
///     .build()
///     .unwrap();
///
/// let report = design.matrix().balance_report();
/// assert_eq!(report.element_counts.len(), 6);
/// assert_eq!(report.pair_counts.len(), 15);
/// assert_eq!(report, design.matrix().balance_report());
/// ```
#[must_use]
pub fn analyze_balance(design: &DesignMatrix) -> BalanceReport {
    let e = design.num_elements();
    let n = design.num_tasks();

    // Upper triangle of XᵀX, accumulated task by task
    let mut gram = Array2::<usize>::zeros((e, e));
    let mut active = Vec::with_capacity(e);
    for task in design.tasks() {
        active.clear();
        active.extend(task.pattern().active_indices());
        for (k, &i) in active.iter().enumerate() {
            for &j in &active[k..] {
                gram[[i, j]] += 1;
            }
        }
    }

    let element_counts: Vec<usize> = (0..e).map(|i| gram[[i, i]]).collect();
    let pair_counts: Vec<PairCount> = combinations(e, 2)
        .map(|pair| PairCount {
            first: pair[0],
            second: pair[1],
            count: gram[[pair[0], pair[1]]],
        })
        .collect();

    let pair_values: Vec<usize> = pair_counts.iter().map(|p| p.count).collect();

    let active_count_range = design
        .tasks()
        .map(super::Task::active_count)
        .fold(None, |acc: Option<(usize, usize)>, c| match acc {
            None => Some((c, c)),
            Some((lo, hi)) => Some((lo.min(c), hi.max(c))),
        })
        .unwrap_or((0, 0));

    let total_active: usize = element_counts.iter().sum();
    let expected_element_count = if e > 0 {
        total_active as f64 / e as f64
    } else {
        0.0
    };

    BalanceReport {
        num_elements: e,
        num_tasks: n,
        active_count_range,
        element_stats: SummaryStats::from_counts(&element_counts),
        element_counts,
        pair_stats: SummaryStats::from_counts(&pair_values),
        pair_counts,
        expected_element_count,
    }
}

impl fmt::Display for BalanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Design Analysis Report ---")?;
        writeln!(f)?;
        writeln!(f, "## 1. Constraint Check: Active Elements per Task")?;
        writeln!(
            f,
            "  - The number of active elements per task ranges from {} to {}.",
            self.active_count_range.0, self.active_count_range.1
        )?;
        writeln!(f)?;
        writeln!(f, "## 2. Main Effect Balance: Appearance of Each Element")?;
        for (i, count) in self.element_counts.iter().enumerate() {
            writeln!(f, "    E{:<4} {}", i + 1, count)?;
        }
        writeln!(
            f,
            "  - Average appearances per element: {:.2}",
            self.element_stats.mean
        )?;
        writeln!(f, "  - Standard deviation: {:.2}", self.element_stats.std_dev)?;
        writeln!(f)?;
        writeln!(f, "## 3. Pairwise Balance: Co-occurrence of Elements")?;
        writeln!(
            f,
            "  - Pairwise counts range from {} to {}.",
            self.pair_stats.min, self.pair_stats.max
        )?;
        writeln!(f, "  - Average co-occurrence: {:.2}", self.pair_stats.mean)?;
        writeln!(f, "  - Standard deviation: {:.2}", self.pair_stats.std_dev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{RespondentSequence, Task, TaskId};
    use crate::pattern::ActivePattern;

    fn design_from(e: usize, rows: &[&[usize]]) -> DesignMatrix {
        let tasks = rows
            .iter()
            .enumerate()
            .map(|(i, active)| Task::new(TaskId::new(0, i), ActivePattern::from_indices(e, active)))
            .collect();
        DesignMatrix::from_sequences(e, vec![RespondentSequence::new(0, tasks)])
    }

    #[test]
    fn test_summary_stats() {
        let s = SummaryStats::from_counts(&[2, 4, 4, 4, 5, 5, 7, 9]);
        assert_eq!(s.min, 2);
        assert_eq!(s.max, 9);
        assert!((s.mean - 5.0).abs() < 1e-12);
        // Sample variance = 32 / 7
        assert!((s.std_dev - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!(s.spread(), 7);

        let single = SummaryStats::from_counts(&[3]);
        assert_eq!(single.std_dev, 0.0);

        let empty = SummaryStats::from_counts(&[]);
        assert_eq!(empty.coefficient_of_variation(), 0.0);
    }

    #[test]
    fn test_element_and_pair_counts() {
        let d = design_from(3, &[&[0, 1], &[1, 2], &[0, 1, 2], &[1]]);
        let r = analyze_balance(&d);

        assert_eq!(r.element_counts, vec![2, 4, 2]);
        assert_eq!(r.pair_count(0, 1), Some(2));
        assert_eq!(r.pair_count(1, 0), Some(2));
        assert_eq!(r.pair_count(0, 2), Some(1));
        assert_eq!(r.pair_count(1, 2), Some(2));
        assert_eq!(r.pair_count(1, 1), None);
        assert_eq!(r.pair_count(0, 3), None);
        assert_eq!(r.active_count_range, (1, 3));
        assert!((r.expected_element_count - 8.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_counts_match_dense_product() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let mut rng = StdRng::seed_from_u64(13);
        let tasks = (0..200)
            .map(|i| Task::new(TaskId::new(0, i), ActivePattern::random(70, &mut rng)))
            .collect();
        let d = DesignMatrix::from_sequences(70, vec![RespondentSequence::new(0, tasks)]);
        let r = analyze_balance(&d);

        let x: Array2<usize> = d.to_array().mapv(usize::from);
        let dense = x.t().dot(&x);
        for i in 0..70 {
            assert_eq!(r.element_counts[i], dense[[i, i]]);
            for j in (i + 1)..70 {
                assert_eq!(r.pair_count(i, j), Some(dense[[i, j]]));
            }
        }
    }

    #[test]
    fn test_pair_order() {
        let d = design_from(4, &[&[0, 1, 2, 3]]);
        let r = analyze_balance(&d);
        let pairs: Vec<(usize, usize)> = r.pair_counts.iter().map(|p| (p.first, p.second)).collect();
        assert_eq!(pairs, vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
        for i in 0..4 {
            for j in (i + 1)..4 {
                assert_eq!(r.pair_count(i, j), Some(1));
            }
        }
    }

    #[test]
    fn test_report_is_pure() {
        let d = design_from(5, &[&[0, 4], &[1, 2, 3], &[2]]);
        let before = d.clone();
        let r1 = analyze_balance(&d);
        let r2 = analyze_balance(&d);
        assert_eq!(r1, r2);
        assert_eq!(d, before);
    }

    #[test]
    fn test_elements_within() {
        let d = design_from(2, &[&[0], &[1], &[0, 1]]);
        let r = analyze_balance(&d);
        assert!(r.elements_within(0.0));

        let d = design_from(2, &[&[0], &[0], &[0, 1]]);
        let r = analyze_balance(&d);
        assert!(!r.elements_within(0.15));
    }

    #[test]
    fn test_display() {
        let d = design_from(3, &[&[0, 1], &[2]]);
        let text = analyze_balance(&d).to_string();
        assert!(text.contains("Design Analysis Report"));
        assert!(text.contains("ranges from 1 to 2"));
        assert!(text.contains("Pairwise counts range from 0 to 1"));
    }
}
