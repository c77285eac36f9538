#![forbid(unsafe_code)]

//! Viewport model: container size, scroll offset, and row heights.
//!
//! Pure computation, no I/O. Heights are either one fixed pixel value or
//! measured lazily per row; measurements are cached by entry id so they
//! survive result-array swaps, and a cached value is dropped whenever the
//! row's rendered content changes.

use std::collections::HashMap;

use crate::fenwick::HeightIndex;

/// Row height strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemHeight {
    /// All rows share one height, in pixels.
    Fixed(u32),
    /// Rows are measured after render; unmeasured rows use the estimate.
    Measured {
        /// Height assumed for rows not yet measured, in pixels.
        estimate: u32,
    },
}

impl ItemHeight {
    /// Height to assume before any measurement.
    #[must_use]
    pub const fn initial(&self) -> u32 {
        match self {
            Self::Fixed(h) => *h,
            Self::Measured { estimate } => *estimate,
        }
    }
}

/// Measured heights keyed by entry id.
#[derive(Debug, Clone, Default)]
pub struct HeightCache {
    by_id: HashMap<String, u32>,
}

impl HeightCache {
    /// Cached height for an entry, if measured.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<u32> {
        self.by_id.get(id).copied()
    }

    /// Record a measurement. Returns true if the stored value changed.
    pub fn set(&mut self, id: &str, height: u32) -> bool {
        match self.by_id.get(id) {
            Some(&h) if h == height => false,
            _ => {
                self.by_id.insert(id.to_string(), height);
                true
            }
        }
    }

    /// Drop a cached measurement; the row's content changed.
    pub fn invalidate(&mut self, id: &str) {
        self.by_id.remove(id);
    }

    /// Drop all cached measurements.
    pub fn clear(&mut self) {
        self.by_id.clear();
    }

    /// Number of cached measurements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Scroll state plus the height layout of the current result set.
#[derive(Debug, Clone)]
pub struct ViewportModel {
    strategy: ItemHeight,
    cache: HeightCache,
    index: HeightIndex,
    /// Entry id per row, for cache writes; `None` for placeholder rows.
    row_ids: Vec<Option<String>>,
    scroll_offset: f32,
    container_height: f32,
}

impl ViewportModel {
    /// Create an empty viewport with the given height strategy.
    #[must_use]
    pub fn new(strategy: ItemHeight) -> Self {
        Self {
            strategy,
            cache: HeightCache::default(),
            index: HeightIndex::from_heights(&[]),
            row_ids: Vec::new(),
            scroll_offset: 0.0,
            container_height: 0.0,
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Current scroll offset in pixels.
    #[must_use]
    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    /// Container height in pixels.
    #[must_use]
    pub fn container_height(&self) -> f32 {
        self.container_height
    }

    /// Total pixel height of all rows.
    #[must_use]
    pub fn total_height(&self) -> u32 {
        self.index.total()
    }

    /// Y-offset of the top of row `i`.
    #[must_use]
    pub fn offset_of(&self, i: usize) -> u32 {
        self.index.offset_of(i)
    }

    /// Height of row `i`.
    #[must_use]
    pub fn height_of(&self, i: usize) -> u32 {
        self.index.get(i)
    }

    /// Row containing pixel offset `y`, if any.
    #[must_use]
    pub fn index_at(&self, y: f32) -> Option<usize> {
        if y < 0.0 {
            return self.index.index_at(0);
        }
        self.index.index_at(y as u32)
    }

    /// Rebuild the layout for a fresh result array.
    ///
    /// `row_ids` carries one entry id per row (`None` for malformed rows).
    /// Measured rows whose ids are still cached keep their heights; new ids
    /// start at the estimate. Scroll is re-clamped against the new total.
    pub fn apply_results(&mut self, row_ids: Vec<Option<String>>) {
        let heights: Vec<u32> = row_ids
            .iter()
            .map(|id| match (&self.strategy, id) {
                (ItemHeight::Fixed(h), _) => *h,
                (ItemHeight::Measured { estimate }, Some(id)) => {
                    self.cache.get(id).unwrap_or(*estimate)
                }
                (ItemHeight::Measured { estimate }, None) => *estimate,
            })
            .collect();
        self.index = HeightIndex::from_heights(&heights);
        self.row_ids = row_ids;
        self.clamp_scroll();
    }

    /// Set the container height. Scroll is re-clamped.
    pub fn set_container_height(&mut self, height: f32) {
        self.container_height = height.max(0.0);
        self.clamp_scroll();
    }

    /// Set the absolute scroll offset, clamped to the last page.
    pub fn set_scroll_offset(&mut self, offset: f32) {
        self.scroll_offset = offset;
        self.clamp_scroll();
    }

    /// Scroll by a signed pixel delta, clamped to the content bounds.
    pub fn scroll_by(&mut self, delta: f32) {
        self.set_scroll_offset(self.scroll_offset + delta);
    }

    /// Adjust scroll so row `i` is fully visible.
    ///
    /// Rows taller than the container align to their top.
    pub fn scroll_to_reveal(&mut self, i: usize) {
        if i >= self.len() {
            return;
        }
        let top = self.index.offset_of(i) as f32;
        let bottom = self.index.offset_of(i + 1) as f32;
        if top < self.scroll_offset {
            self.set_scroll_offset(top);
        } else if bottom > self.scroll_offset + self.container_height {
            self.set_scroll_offset(bottom - self.container_height);
            // A row taller than the container anchors to its top edge.
            if self.scroll_offset > top {
                self.set_scroll_offset(top);
            }
        }
    }

    /// Record a measured row height. Returns true when layout changed.
    ///
    /// Fixed-height viewports ignore measurements.
    pub fn record_height(&mut self, i: usize, height: u32) -> bool {
        if !matches!(self.strategy, ItemHeight::Measured { .. }) || i >= self.len() {
            return false;
        }
        if let Some(id) = self.row_ids.get(i).and_then(|id| id.clone())
            && !self.cache.set(&id, height)
        {
            return false;
        }
        if self.index.get(i) == height {
            return false;
        }
        self.index.set(i, height);
        self.clamp_scroll();
        true
    }

    /// Drop the cached measurement for an entry whose content changed.
    ///
    /// The row falls back to the estimate on the next
    /// [`apply_results`](Self::apply_results).
    pub fn invalidate_measurement(&mut self, id: &str) {
        self.cache.invalidate(id);
    }

    fn clamp_scroll(&mut self) {
        let max = (self.index.total() as f32 - self.container_height).max(0.0);
        self.scroll_offset = self.scroll_offset.clamp(0.0, max);
    }
}
