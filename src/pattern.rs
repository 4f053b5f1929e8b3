//! Fixed-width active-element bitsets.
//!
//! An [`ActivePattern`] records which of the `E` elements are shown in one
//! task. Bits are packed into `u64` words; bits past `E` in the last word are
//! always zero so that equality and hashing compare only real elements.

use std::fmt;

use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "serde")]
use crate::error::Error;

const WORD_BITS: usize = 64;

/// A binary vector over the elements of a study.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawPattern"))]
pub struct ActivePattern {
    words: Vec<u64>,
    len: usize,
}

/// Unchecked wire form of an [`ActivePattern`].
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawPattern {
    words: Vec<u64>,
    len: usize,
}

#[cfg(feature = "serde")]
impl TryFrom<RawPattern> for ActivePattern {
    type Error = Error;

    fn try_from(raw: RawPattern) -> Result<Self, Self::Error> {
        if raw.words.len() != word_count(raw.len) {
            return Err(Error::invalid_params(
                "pattern",
                format!(
                    "{} words cannot hold a {}-element pattern",
                    raw.words.len(),
                    raw.len
                ),
            ));
        }
        if let Some(&last) = raw.words.last() {
            if last & !tail_mask(raw.len) != 0 {
                return Err(Error::invalid_params(
                    "pattern",
                    format!("bits set past element {}", raw.len),
                ));
            }
        }
        Ok(Self {
            words: raw.words,
            len: raw.len,
        })
    }
}

fn word_count(len: usize) -> usize {
    len.div_ceil(WORD_BITS)
}

/// Mask of the valid bits in the last word of a `len`-bit pattern.
fn tail_mask(len: usize) -> u64 {
    match len % WORD_BITS {
        0 => u64::MAX,
        r => (1u64 << r) - 1,
    }
}

impl ActivePattern {
    /// The pattern with no active elements.
    #[must_use]
    pub fn all_inactive(len: usize) -> Self {
        Self {
            words: vec![0; word_count(len)],
            len,
        }
    }

    /// The pattern with every element active.
    #[must_use]
    pub fn all_active(len: usize) -> Self {
        let mut words = vec![u64::MAX; word_count(len)];
        if let Some(last) = words.last_mut() {
            *last &= tail_mask(len);
        }
        Self { words, len }
    }

    /// Draw a uniformly random pattern: every element is active with
    /// probability one half, independently.
    pub fn random<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Self {
        let mut words: Vec<u64> = (0..word_count(len)).map(|_| rng.gen()).collect();
        if let Some(last) = words.last_mut() {
            *last &= tail_mask(len);
        }
        Self { words, len }
    }

    /// Build a pattern from the indices of its active elements.
    ///
    /// # Panics
    ///
    /// Panics if an index is `>= len`.
    #[must_use]
    pub fn from_indices(len: usize, active: &[usize]) -> Self {
        let mut pattern = Self::all_inactive(len);
        for &idx in active {
            pattern.set(idx, true);
        }
        pattern
    }

    /// Number of elements the pattern spans (E).
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the pattern spans zero elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of active elements.
    #[must_use]
    pub fn count_active(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Whether element `idx` is active.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= len`.
    #[must_use]
    pub fn is_active(&self, idx: usize) -> bool {
        assert!(idx < self.len, "element {} out of range {}", idx, self.len);
        (self.words[idx / WORD_BITS] >> (idx % WORD_BITS)) & 1 == 1
    }

    /// Set element `idx` active or inactive.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= len`.
    pub fn set(&mut self, idx: usize, active: bool) {
        assert!(idx < self.len, "element {} out of range {}", idx, self.len);
        let bit = 1u64 << (idx % WORD_BITS);
        if active {
            self.words[idx / WORD_BITS] |= bit;
        } else {
            self.words[idx / WORD_BITS] &= !bit;
        }
    }

    /// Indices of the active elements in ascending order.
    pub fn active_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.words
            .iter()
            .enumerate()
            .flat_map(|(w, &word)| BitIter(word).map(move |b| w * WORD_BITS + b))
    }

    /// The pattern as a 1/0 vector.
    #[must_use]
    pub fn to_bits(&self) -> Vec<u8> {
        (0..self.len).map(|i| u8::from(self.is_active(i))).collect()
    }
}

/// Iterates over the set bit positions of a word, lowest first.
struct BitIter(u64);

impl Iterator for BitIter {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.0 == 0 {
            return None;
        }
        let bit = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Some(bit)
    }
}

impl fmt::Debug for ActivePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActivePattern({self})")
    }
}

impl fmt::Display for ActivePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.len {
            f.write_str(if self.is_active(i) { "1" } else { "0" })?;
        }
        Ok(())
    }
}
