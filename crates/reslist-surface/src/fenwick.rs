#![forbid(unsafe_code)]

//! Fenwick tree over row heights, in pixels.
//!
//! Virtualization needs two queries on every layout pass: the y-offset of a
//! row (prefix sum of the heights above it) and the row containing a given
//! scroll offset (inverse prefix lookup). A Fenwick tree gives both in
//! O(log n) with a contiguous `Vec<u32>`, and a point write after a row
//! re-measures is O(log n) too - changing one height implicitly shifts every
//! downstream offset without any explicit invalidation pass.
//!
//! # Operations
//!
//! | Operation | Time |
//! |-----------|------|
//! | `from_heights(values)` | O(n) |
//! | `set(i, h)` / `get(i)` | O(log n) |
//! | `offset_of(i)` | O(log n) |
//! | `index_at(y)` | O(log n) |
//! | `total()` | O(log n) |
//!
//! # Invariants
//!
//! 1. `offset_of(0) == 0`; `offset_of(i)` is the sum of heights `0..i`.
//! 2. `index_at(offset_of(i)) == Some(i)` for any non-zero-height row `i`.
//! 3. `index_at(y)` is `None` iff `y >= total()`.

/// Prefix-sum index over per-row pixel heights.
#[derive(Debug, Clone)]
pub struct HeightIndex {
    /// 1-indexed tree storage; `tree[0]` unused.
    tree: Vec<u32>,
    /// Number of rows.
    len: usize,
}

impl HeightIndex {
    /// Build from per-row heights in O(n).
    #[must_use]
    pub fn from_heights(heights: &[u32]) -> Self {
        let len = heights.len();
        let mut tree = vec![0u32; len + 1];
        for (i, &h) in heights.iter().enumerate() {
            tree[i + 1] = h;
        }
        // Parent propagation builds the tree in a single pass.
        for i in 1..=len {
            let parent = i + lowbit(i);
            if parent <= len {
                tree[parent] += tree[i];
            }
        }
        Self { tree, len }
    }

    /// An index with `len` rows of equal `height`.
    #[must_use]
    pub fn uniform(len: usize, height: u32) -> Self {
        Self::from_heights(&vec![height; len])
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the index has no rows.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Height of row `i`.
    ///
    /// # Panics
    /// Panics if `i >= len`.
    #[must_use]
    pub fn get(&self, i: usize) -> u32 {
        assert!(i < self.len, "row {i} out of bounds (len={})", self.len);
        self.inclusive_sum(i + 1) - self.offset_of(i)
    }

    /// Set the height of row `i`.
    ///
    /// # Panics
    /// Panics if `i >= len`.
    pub fn set(&mut self, i: usize, height: u32) {
        assert!(i < self.len, "row {i} out of bounds (len={})", self.len);
        let delta = height as i64 - self.get(i) as i64;
        let mut idx = i + 1;
        while idx <= self.len {
            self.tree[idx] = (self.tree[idx] as i64 + delta) as u32;
            idx += lowbit(idx);
        }
    }

    /// Y-offset of the top of row `i`: the sum of heights `0..i`.
    ///
    /// `offset_of(len)` is allowed and equals [`total`](Self::total).
    ///
    /// # Panics
    /// Panics if `i > len`.
    #[must_use]
    pub fn offset_of(&self, i: usize) -> u32 {
        assert!(i <= self.len, "row {i} out of bounds (len={})", self.len);
        self.inclusive_sum(i)
    }

    /// Total pixel height of all rows.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.inclusive_sum(self.len)
    }

    /// Row whose vertical span contains pixel offset `y`.
    ///
    /// Zero-height rows never contain any offset. Returns `None` when the
    /// index is empty or `y` is at or past the total height.
    #[must_use]
    pub fn index_at(&self, y: u32) -> Option<usize> {
        if self.len == 0 || y >= self.total() {
            return None;
        }
        // Binary descent: find the largest row count whose cumulative
        // height is <= y; that many rows lie entirely above y.
        let mut pos = 0usize;
        let mut remaining = y;
        let mut bit = most_significant_bit(self.len);
        while bit > 0 {
            let next = pos + bit;
            if next <= self.len && self.tree[next] <= remaining {
                remaining -= self.tree[next];
                pos = next;
            }
            bit >>= 1;
        }
        Some(pos)
    }

    /// Sum of the first `count` heights (`count` may be 0 or `len`).
    fn inclusive_sum(&self, count: usize) -> u32 {
        let mut sum = 0u32;
        let mut idx = count;
        while idx > 0 {
            sum += self.tree[idx];
            idx -= lowbit(idx);
        }
        sum
    }
}

#[inline]
fn lowbit(i: usize) -> usize {
    i & i.wrapping_neg()
}

#[inline]
fn most_significant_bit(n: usize) -> usize {
    if n == 0 {
        0
    } else {
        1 << (usize::BITS - 1 - n.leading_zeros())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_exclusive_prefix_sums() {
        let idx = HeightIndex::from_heights(&[24, 32, 24, 48]);
        assert_eq!(idx.offset_of(0), 0);
        assert_eq!(idx.offset_of(1), 24);
        assert_eq!(idx.offset_of(2), 56);
        assert_eq!(idx.offset_of(3), 80);
        assert_eq!(idx.offset_of(4), 128);
        assert_eq!(idx.total(), 128);
    }

    #[test]
    fn get_recovers_heights() {
        let heights = [24, 32, 24, 48, 1];
        let idx = HeightIndex::from_heights(&heights);
        for (i, &h) in heights.iter().enumerate() {
            assert_eq!(idx.get(i), h, "height mismatch at {i}");
        }
    }

    #[test]
    fn set_shifts_downstream_offsets() {
        let mut idx = HeightIndex::uniform(10, 24);
        idx.set(3, 100);
        assert_eq!(idx.offset_of(3), 72);
        assert_eq!(idx.offset_of(4), 172);
        assert_eq!(idx.total(), 9 * 24 + 100);
        // Shrinking works too.
        idx.set(3, 10);
        assert_eq!(idx.offset_of(4), 82);
    }

    #[test]
    fn index_at_locates_rows() {
        let idx = HeightIndex::from_heights(&[24, 32, 24]);
        assert_eq!(idx.index_at(0), Some(0));
        assert_eq!(idx.index_at(23), Some(0));
        assert_eq!(idx.index_at(24), Some(1));
        assert_eq!(idx.index_at(55), Some(1));
        assert_eq!(idx.index_at(56), Some(2));
        assert_eq!(idx.index_at(79), Some(2));
        assert_eq!(idx.index_at(80), None);
    }

    #[test]
    fn index_at_skips_zero_height_rows() {
        let idx = HeightIndex::from_heights(&[24, 0, 0, 24]);
        assert_eq!(idx.index_at(23), Some(0));
        assert_eq!(idx.index_at(24), Some(3));
    }

    #[test]
    fn empty_index() {
        let idx = HeightIndex::from_heights(&[]);
        assert!(idx.is_empty());
        assert_eq!(idx.total(), 0);
        assert_eq!(idx.index_at(0), None);
        assert_eq!(idx.offset_of(0), 0);
    }

    #[test]
    fn round_trip_against_naive_prefix() {
        let heights: Vec<u32> = (0..257).map(|i| (i % 7) as u32 * 8 + 16).collect();
        let idx = HeightIndex::from_heights(&heights);

        let mut offset = 0u32;
        for (i, &h) in heights.iter().enumerate() {
            assert_eq!(idx.offset_of(i), offset);
            assert_eq!(idx.index_at(offset), Some(i));
            if h > 0 {
                assert_eq!(idx.index_at(offset + h - 1), Some(i));
            }
            offset += h;
        }
        assert_eq!(idx.total(), offset);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn set_out_of_bounds_panics() {
        let mut idx = HeightIndex::uniform(3, 24);
        idx.set(3, 10);
    }
}
