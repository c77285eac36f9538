#![forbid(unsafe_code)]

//! Frame coalescing for high-frequency input events.
//!
//! Scroll wheels and touch screens can deliver hundreds of events per second.
//! Recomputing the render window on every raw event wastes work and causes
//! lag; the list only needs the net state once per paint frame.
//!
//! This module provides [`FrameCoalescer`] which:
//! - Accumulates scroll deltas into a single pending scroll
//! - Coalesces pointer moves latest-wins, *per pointer id*
//! - Passes through all other events immediately
//!
//! Moves are kept per pointer rather than globally because pinch detection
//! needs the latest position of both active fingers, not just whichever
//! moved last.
//!
//! Non-coalescable events (key presses, pointer down/up/cancel) pass through
//! immediately. The caller is responsible for flushing pending events before
//! processing them and once per frame tick.
//!
//! # Usage
//!
//! ```
//! use reslist_core::coalescer::FrameCoalescer;
//! use reslist_core::event::{Event, PointerEvent};
//!
//! let mut coalescer = FrameCoalescer::new();
//!
//! // Scroll deltas accumulate - nothing is emitted yet
//! assert!(coalescer.push(Event::Scroll { delta: 12.0 }).is_none());
//! assert!(coalescer.push(Event::Scroll { delta: 8.0 }).is_none());
//! assert_eq!(coalescer.pending_scroll_delta(), 20.0);
//!
//! // Pointer down passes through immediately
//! let down = Event::Pointer(PointerEvent::down(1, 5.0, 5.0));
//! assert!(coalescer.push(down).is_some());
//!
//! // Flush once per frame to get the net pending input
//! let pending = coalescer.flush();
//! assert_eq!(pending, vec![Event::Scroll { delta: 20.0 }]);
//! ```

use crate::event::{Event, PointerEvent, PointerId, PointerPhase};

/// Coalesces high-frequency input events to one layout pass per frame.
///
/// Not thread-safe; lives on the single UI thread with the surface that
/// owns it. All operations are O(1) in the number of events (moves are
/// keyed by pointer id, and concurrent pointers are at most a handful).
#[derive(Debug, Clone, Default)]
pub struct FrameCoalescer {
    /// Net scroll delta accumulated since the last flush, in pixels.
    pending_scroll: f32,

    /// Latest pending move per pointer id, insertion-ordered.
    pending_moves: Vec<PointerEvent>,
}

impl FrameCoalescer {
    /// Create a new, empty coalescer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an event into the coalescer.
    ///
    /// Returns `Some(event)` if the event should be processed immediately,
    /// or `None` if it was coalesced and is pending.
    ///
    /// # Coalescing Rules
    ///
    /// - **Scroll**: delta is added to the pending total. Returns `None`.
    /// - **Pointer move**: replaces any pending move for the same pointer
    ///   id. Returns `None`.
    /// - **Everything else**: returned immediately. The caller should call
    ///   [`flush`](Self::flush) first so pending input lands in order.
    pub fn push(&mut self, event: Event) -> Option<Event> {
        match event {
            Event::Scroll { delta } => {
                self.pending_scroll += delta;
                None
            }
            Event::Pointer(pointer) if pointer.phase == PointerPhase::Move => {
                match self.pending_moves.iter_mut().find(|m| m.id == pointer.id) {
                    Some(slot) => *slot = pointer,
                    None => self.pending_moves.push(pointer),
                }
                None
            }
            other => Some(other),
        }
    }

    /// Flush all pending coalesced events.
    ///
    /// Returns the pending scroll (if any) followed by the pending moves in
    /// pointer arrival order. After this call the coalescer is empty.
    #[must_use]
    pub fn flush(&mut self) -> Vec<Event> {
        #[cfg(feature = "tracing")]
        tracing::trace!(
            scroll = self.pending_scroll,
            moves = self.pending_moves.len(),
            "flush coalesced input"
        );
        let mut events = Vec::with_capacity(1 + self.pending_moves.len());
        if self.pending_scroll != 0.0 {
            events.push(Event::Scroll {
                delta: std::mem::take(&mut self.pending_scroll),
            });
        }
        for pointer in self.pending_moves.drain(..) {
            events.push(Event::Pointer(pointer));
        }
        events
    }

    /// Flush pending events, calling a closure for each.
    pub fn flush_each<F>(&mut self, mut f: F)
    where
        F: FnMut(Event),
    {
        if self.pending_scroll != 0.0 {
            f(Event::Scroll {
                delta: std::mem::take(&mut self.pending_scroll),
            });
        }
        for pointer in self.pending_moves.drain(..) {
            f(Event::Pointer(pointer));
        }
    }

    /// Check if there are any pending coalesced events.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending_scroll != 0.0 || !self.pending_moves.is_empty()
    }

    /// Net scroll delta currently pending, in pixels.
    #[must_use]
    pub fn pending_scroll_delta(&self) -> f32 {
        self.pending_scroll
    }

    /// Latest pending move for a pointer, if any.
    #[must_use]
    pub fn pending_move(&self, id: PointerId) -> Option<&PointerEvent> {
        self.pending_moves.iter().find(|m| m.id == id)
    }

    /// Clear all pending events without processing them.
    ///
    /// Use on teardown or focus loss to discard stale input.
    pub fn clear(&mut self) {
        self.pending_scroll = 0.0;
        self.pending_moves.clear();
    }
}
