//! Combinatorial helpers.
//!
//! Binomial coefficients drive both the per-respondent capacity of a
//! constant-size design and the acceptance probability of rejection sampling.

/// Compute binomial coefficient C(n, k) = n! / (k! * (n-k)!)
///
/// Returns `None` if the result would overflow `u64`.
///
/// # Examples
///
/// ```
/// use iped::utils::binomial;
///
/// assert_eq!(binomial(5, 2), Some(10));
/// assert_eq!(binomial(10, 5), Some(252));
/// assert_eq!(binomial(5, 0), Some(1));
/// assert_eq!(binomial(5, 5), Some(1));
/// assert_eq!(binomial(3, 5), Some(0)); // k > n
/// ```
#[must_use]
pub fn binomial(n: u64, k: u64) -> Option<u64> {
    if k > n {
        return Some(0);
    }

    // Use symmetry: C(n, k) = C(n, n-k)
    let k = k.min(n - k);

    if k == 0 {
        return Some(1);
    }

    let mut result: u64 = 1;
    for i in 0..k {
        // Exact at every step: result * (n - i) is divisible by (i + 1)
        result = result.checked_mul(n - i)?;
        result /= i + 1;
    }

    Some(result)
}

/// Natural logarithm of C(n, k), finite for any `k <= n`.
fn ln_binomial(n: usize, k: usize) -> f64 {
    let k = k.min(n - k);
    (0..k)
        .map(|i| ((n - i) as f64 / (i + 1) as f64).ln())
        .sum()
}

/// Probability that a uniformly random `n`-bit vector has between
/// `min_active` and `max_active` bits set (inclusive).
///
/// This is the acceptance rate of one rejection-sampling draw.
///
/// # Examples
///
/// ```
/// use iped::utils::acceptance_probability;
///
/// // 4 bits, 1 or 2 set: (4 + 6) / 16
/// assert!((acceptance_probability(4, 1, 2) - 0.625).abs() < 1e-12);
/// assert!((acceptance_probability(10, 0, 10) - 1.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn acceptance_probability(n: usize, min_active: usize, max_active: usize) -> f64 {
    if min_active > max_active || min_active > n {
        return 0.0;
    }
    let hi = max_active.min(n);
    // C(n, k) / 2^n evaluated in log space to survive large n
    let log_total = n as f64 * std::f64::consts::LN_2;
    (min_active..=hi)
        .map(|k| (ln_binomial(n, k) - log_total).exp())
        .sum::<f64>()
        .min(1.0)
}

/// Generate all k-combinations of indices 0..n.
///
/// Returns an iterator over all ways to choose k items from n items,
/// in lexicographic order.
///
/// # Examples
///
/// ```
/// use iped::utils::combinations;
///
/// let combos: Vec<Vec<usize>> = combinations(4, 2).collect();
/// assert_eq!(combos.len(), 6); // C(4,2) = 6
/// assert_eq!(combos[0], vec![0, 1]);
/// assert_eq!(combos[5], vec![2, 3]);
/// ```
pub fn combinations(n: usize, k: usize) -> impl Iterator<Item = Vec<usize>> {
    CombinationIterator::new(n, k)
}

/// Iterator over k-combinations of 0..n.
struct CombinationIterator {
    n: usize,
    k: usize,
    indices: Vec<usize>,
    finished: bool,
}

impl CombinationIterator {
    fn new(n: usize, k: usize) -> Self {
        if k > n || k == 0 {
            return Self {
                n,
                k,
                indices: Vec::new(),
                finished: k > n,
            };
        }

        Self {
            n,
            k,
            indices: (0..k).collect(),
            finished: false,
        }
    }
}

impl Iterator for CombinationIterator {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        if self.k == 0 {
            self.finished = true;
            return Some(Vec::new());
        }

        let result = self.indices.clone();

        // Find rightmost index that can be incremented
        let mut i = self.k;
        while i > 0 {
            i -= 1;
            if self.indices[i] < self.n - self.k + i {
                self.indices[i] += 1;
                for j in (i + 1)..self.k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
                return Some(result);
            }
        }

        self.finished = true;
        Some(result)
    }
}
