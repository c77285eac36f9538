#![forbid(unsafe_code)]

//! Render window computation and diffing.
//!
//! The window is the half-open index range `[start, end)` of rows worth
//! mounting: the rows covering the visible span plus `overscan` extra rows
//! on each side. Consumers re-run [`compute_window`] after every scroll or
//! layout change and apply [`WindowDiff`] to mount and unmount rows instead
//! of re-rendering the whole list.

use std::ops::Range;

use crate::viewport::ViewportModel;

/// Half-open row-index range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderWindow {
    /// First row index in the window (inclusive).
    pub start: usize,
    /// One past the last row index in the window (exclusive).
    pub end: usize,
}

impl RenderWindow {
    /// The empty window.
    pub const EMPTY: Self = Self { start: 0, end: 0 };

    /// Number of rows in the window.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the window covers no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Whether row `i` falls inside the window.
    #[must_use]
    pub const fn contains(&self, i: usize) -> bool {
        self.start <= i && i < self.end
    }

    /// The window as a `Range` for iteration.
    #[must_use]
    pub const fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl Default for RenderWindow {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Compute the render window for the viewport's current scroll state.
///
/// The window covers every row intersecting the visible pixel span
/// `[scroll, scroll + container)`, including rows only partially on
/// screen at either edge; `overscan` rows are added on each side,
/// clamped to the row count. An empty result set or a zero-height
/// container yields [`RenderWindow::EMPTY`].
#[must_use]
pub fn compute_window(viewport: &ViewportModel, overscan: usize) -> RenderWindow {
    let n = viewport.len();
    let container = viewport.container_height();
    if n == 0 || container <= 0.0 {
        return RenderWindow::EMPTY;
    }

    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!(
        "compute_window",
        rows = n,
        scroll = viewport.scroll_offset()
    )
    .entered();

    let top = viewport.scroll_offset();
    let first = match viewport.index_at(top) {
        Some(i) => i,
        // Scroll is clamped, so this only happens past zero-height tails.
        None => n - 1,
    };
    // Anchor the span at the scroll offset, not at `first`'s top edge: a
    // row straddling the bottom edge still intersects the span.
    let bottom = ((top + container).ceil() as u32).max(1);
    let last = viewport
        .index_at((bottom - 1) as f32)
        .map_or(n, |i| i + 1);

    RenderWindow {
        start: first.saturating_sub(overscan),
        end: (last + overscan).min(n),
    }
}

/// Row ranges entering and leaving the window between two frames.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WindowDiff {
    /// Rows in `new` but not in `old`; mount these.
    pub entered: Vec<Range<usize>>,
    /// Rows in `old` but not in `new`; unmount these.
    pub exited: Vec<Range<usize>>,
}

impl WindowDiff {
    /// Diff two windows.
    #[must_use]
    pub fn between(old: RenderWindow, new: RenderWindow) -> Self {
        Self {
            entered: range_difference(new, old),
            exited: range_difference(old, new),
        }
    }

    /// Whether the two windows were identical.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entered.is_empty() && self.exited.is_empty()
    }
}

/// Rows in `a` that are not in `b`, as up to two non-empty ranges.
fn range_difference(a: RenderWindow, b: RenderWindow) -> Vec<Range<usize>> {
    if a.is_empty() {
        return Vec::new();
    }
    if b.is_empty() || b.end <= a.start || a.end <= b.start {
        return vec![a.as_range()];
    }
    let mut out = Vec::new();
    if a.start < b.start {
        out.push(a.start..b.start);
    }
    if b.end < a.end {
        out.push(b.end..a.end);
    }
    out
}
