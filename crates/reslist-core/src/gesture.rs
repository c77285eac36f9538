#![forbid(unsafe_code)]

//! Gesture recognition for raw pointer sequences.
//!
//! Turns per-pointer Down/Move/Up/Cancel streams into semantic gestures:
//! tap, horizontal swipe, long-press, and two-finger pinch. The recognizer
//! is target-aware: the caller hit-tests each Down and passes the row it
//! landed on, which lets swipe debouncing collapse repeat ratings on the
//! same row.
//!
//! # Design
//!
//! ## Invariants
//!
//! 1. A sequence is well-formed: exactly one Down, zero or more Moves,
//!    ending in Up or Cancel. A Down reusing a live pointer id replaces the
//!    stale sequence.
//! 2. A sequence produces at most one of tap / swipe / long-press; a
//!    long-press consumes the sequence, so the following Up emits nothing.
//! 3. Pointers participating in a pinch never produce taps or swipes.
//! 4. No OS timers: deadlines (long-press, stale sequences) are checked by
//!    [`GestureRecognizer::poll`] from the frame tick, so nothing can fire
//!    after the owning surface is dropped.
//!
//! ## Failure Modes
//!
//! | Failure | Cause | Fallback |
//! |---------|-------|----------|
//! | Missing Up/Cancel | Host dropped the end event | Sequence released after `sequence_timeout` |
//! | Down outside any row | No hit-test match | Sequence tracked, tap/swipe/long-press not emitted |
//! | Third simultaneous finger | More than two contacts | Pinch suspended until exactly two remain |

use std::time::{Duration, Instant};

use crate::event::{PointerEvent, PointerId, PointerPhase};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for gesture detection.
///
/// The defaults mirror common touch heuristics; none of them is normative,
/// so every threshold is tunable.
#[derive(Debug, Clone)]
pub struct GestureConfig {
    /// Maximum movement for a tap or long-press, in pixels (default: 10).
    pub tap_slop_px: f32,

    /// Maximum duration of a tap (default: 300ms).
    pub tap_max_duration: Duration,

    /// Minimum horizontal travel for a swipe, in pixels (default: 50).
    pub swipe_travel_px: f32,

    /// Maximum cross-axis (vertical) travel for a swipe, in pixels
    /// (default: 30). Anything taller is a scroll, not a rating.
    pub swipe_cross_px: f32,

    /// Hold duration before a long-press fires (default: 500ms).
    pub long_press_duration: Duration,

    /// Window in which repeat swipes on the same target are suppressed
    /// (default: 300ms). The first swipe wins; later ones are dropped,
    /// never queued.
    pub rate_debounce: Duration,

    /// A sequence that never receives Up or Cancel is released after this
    /// long (default: 10s).
    pub sequence_timeout: Duration,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            tap_slop_px: 10.0,
            tap_max_duration: Duration::from_millis(300),
            swipe_travel_px: 50.0,
            swipe_cross_px: 30.0,
            long_press_duration: Duration::from_millis(500),
            rate_debounce: Duration::from_millis(300),
            sequence_timeout: Duration::from_secs(10),
        }
    }
}

impl GestureConfig {
    /// Set the tap movement slop.
    #[must_use]
    pub fn with_tap_slop(mut self, px: f32) -> Self {
        self.tap_slop_px = px;
        self
    }

    /// Set the minimum swipe travel.
    #[must_use]
    pub fn with_swipe_travel(mut self, px: f32) -> Self {
        self.swipe_travel_px = px;
        self
    }

    /// Set the long-press hold duration.
    #[must_use]
    pub fn with_long_press(mut self, duration: Duration) -> Self {
        self.long_press_duration = duration;
        self
    }

    /// Set the swipe debounce window.
    #[must_use]
    pub fn with_rate_debounce(mut self, duration: Duration) -> Self {
        self.rate_debounce = duration;
        self
    }
}

// ---------------------------------------------------------------------------
// Gestures
// ---------------------------------------------------------------------------

/// Horizontal swipe direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    /// Leftward swipe.
    Left,
    /// Rightward swipe.
    Right,
}

/// A recognized semantic gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    /// Quick touch with little movement.
    Tap {
        /// Row the sequence started on.
        target: u64,
        /// X position of the release, in pixels.
        x: f32,
        /// Y position of the release, in pixels.
        y: f32,
    },
    /// Horizontal flick across a row.
    Swipe {
        /// Row the sequence started on.
        target: u64,
        /// Which way the pointer travelled.
        direction: SwipeDirection,
    },
    /// Touch held in place past the hold threshold.
    LongPress {
        /// Row the sequence started on.
        target: u64,
    },
    /// Two-finger spread/contract.
    Pinch {
        /// Relative change in inter-finger distance since the previous
        /// move: positive = fingers moving apart.
        scale_delta: f32,
    },
}

// ---------------------------------------------------------------------------
// Sequence tracking
// ---------------------------------------------------------------------------

/// One live pointer sequence, Down → {Moving, Held} → Up | Cancel.
#[derive(Debug, Clone)]
struct Sequence {
    id: PointerId,
    /// Row the Down landed on, from the caller's hit-test.
    target: Option<u64>,
    start_x: f32,
    start_y: f32,
    last_x: f32,
    last_y: f32,
    started_at: Instant,
    /// Movement exceeded the tap slop at some point.
    moved_past_slop: bool,
    /// Long-press already fired for this sequence.
    long_press_fired: bool,
    /// Sequence took part in a pinch at some point.
    in_pinch: bool,
}

impl Sequence {
    fn displacement(&self) -> (f32, f32) {
        (self.last_x - self.start_x, self.last_y - self.start_y)
    }

    fn travel(&self) -> f32 {
        let (dx, dy) = self.displacement();
        (dx * dx + dy * dy).sqrt()
    }
}

// ---------------------------------------------------------------------------
// GestureRecognizer
// ---------------------------------------------------------------------------

/// Per-pointer-sequence gesture state machine.
///
/// Feed pointer transitions via the `pointer_*` methods and call
/// [`poll`](Self::poll) once per frame for long-press deadlines and stale
/// sequence cleanup. Each call returns the gestures that transition
/// produced, in order.
#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    config: GestureConfig,
    /// Live sequences, at most a handful (one per finger).
    sequences: Vec<Sequence>,
    /// Inter-finger distance at the previous pinch sample.
    pinch_baseline: Option<f32>,
    /// Last emitted swipe: (target, when), for debouncing.
    last_swipe: Option<(u64, Instant)>,
}

impl GestureRecognizer {
    /// Create a recognizer with the given configuration.
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            sequences: Vec::with_capacity(2),
            pinch_baseline: None,
            last_swipe: None,
        }
    }

    /// Create a recognizer with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(GestureConfig::default())
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Number of live pointer sequences.
    #[must_use]
    pub fn active_sequences(&self) -> usize {
        self.sequences.len()
    }

    /// Feed a raw pointer event, with the hit-tested target for Down events.
    ///
    /// Convenience dispatcher over the `pointer_*` methods.
    pub fn feed(
        &mut self,
        event: &PointerEvent,
        target: Option<u64>,
        now: Instant,
    ) -> Vec<Gesture> {
        #[cfg(feature = "tracing")]
        tracing::trace!(
            id = event.id.0,
            phase = ?event.phase,
            row = ?target,
            live = self.sequences.len(),
            "pointer event"
        );
        match event.phase {
            PointerPhase::Down => self.pointer_down(event.id, event.x, event.y, target, now),
            PointerPhase::Move => self.pointer_move(event.id, event.x, event.y, now),
            PointerPhase::Up => self.pointer_up(event.id, event.x, event.y, now),
            PointerPhase::Cancel => self.pointer_cancel(event.id),
        }
    }

    /// Start a sequence. `target` is the row the touch landed on, if any.
    pub fn pointer_down(
        &mut self,
        id: PointerId,
        x: f32,
        y: f32,
        target: Option<u64>,
        now: Instant,
    ) -> Vec<Gesture> {
        // A live sequence with the same id is stale; its pending long-press
        // deadline dies with it.
        self.sequences.retain(|s| s.id != id);

        self.sequences.push(Sequence {
            id,
            target,
            start_x: x,
            start_y: y,
            last_x: x,
            last_y: y,
            started_at: now,
            moved_past_slop: false,
            long_press_fired: false,
            in_pinch: false,
        });

        if self.sequences.len() == 2 {
            // Second finger: establish the pinch baseline and taint both
            // sequences so neither resolves to a tap or swipe later.
            for seq in &mut self.sequences {
                seq.in_pinch = true;
            }
            self.pinch_baseline = self.finger_distance();
        } else {
            self.pinch_baseline = None;
        }

        Vec::new()
    }

    /// Advance a sequence. May emit [`Gesture::Pinch`].
    pub fn pointer_move(&mut self, id: PointerId, x: f32, y: f32, _now: Instant) -> Vec<Gesture> {
        let slop = self.config.tap_slop_px;
        let Some(seq) = self.sequences.iter_mut().find(|s| s.id == id) else {
            return Vec::new();
        };
        seq.last_x = x;
        seq.last_y = y;
        if seq.travel() >= slop {
            seq.moved_past_slop = true;
        }

        if self.sequences.len() == 2 {
            if let Some(dist) = self.finger_distance() {
                let prev = self.pinch_baseline.replace(dist);
                if let Some(prev) = prev
                    && prev > f32::EPSILON
                {
                    let scale_delta = (dist - prev) / prev;
                    if scale_delta != 0.0 {
                        return vec![Gesture::Pinch { scale_delta }];
                    }
                }
            }
        }

        Vec::new()
    }

    /// End a sequence. May emit [`Gesture::Tap`] or [`Gesture::Swipe`].
    pub fn pointer_up(&mut self, id: PointerId, x: f32, y: f32, now: Instant) -> Vec<Gesture> {
        let Some(pos) = self.sequences.iter().position(|s| s.id == id) else {
            return Vec::new();
        };
        let mut seq = self.sequences.remove(pos);
        if self.sequences.len() != 2 {
            self.pinch_baseline = None;
        }

        seq.last_x = x;
        seq.last_y = y;
        if seq.travel() >= self.config.tap_slop_px {
            seq.moved_past_slop = true;
        }

        // Pinch participants and consumed long-presses resolve to nothing.
        if seq.in_pinch || seq.long_press_fired {
            return Vec::new();
        }
        let Some(target) = seq.target else {
            return Vec::new();
        };

        let duration = now.duration_since(seq.started_at);
        let (dx, dy) = seq.displacement();

        if !seq.moved_past_slop && duration < self.config.tap_max_duration {
            return vec![Gesture::Tap { target, x, y }];
        }

        if dx.abs() > self.config.swipe_travel_px && dy.abs() < self.config.swipe_cross_px {
            // Debounce: suppress repeats on the same target inside the
            // window. The window stays anchored at the emitted swipe, so a
            // burst collapses to exactly one.
            if let Some((last_target, at)) = self.last_swipe
                && last_target == target
                && now.duration_since(at) < self.config.rate_debounce
            {
                return Vec::new();
            }
            self.last_swipe = Some((target, now));
            let direction = if dx > 0.0 {
                SwipeDirection::Right
            } else {
                SwipeDirection::Left
            };
            return vec![Gesture::Swipe { target, direction }];
        }

        Vec::new()
    }

    /// Abort a sequence without emitting anything.
    pub fn pointer_cancel(&mut self, id: PointerId) -> Vec<Gesture> {
        self.sequences.retain(|s| s.id != id);
        if self.sequences.len() != 2 {
            self.pinch_baseline = None;
        }
        Vec::new()
    }

    /// Check deadlines: long-press holds and stale sequences.
    ///
    /// Call once per frame tick. Emits [`Gesture::LongPress`] for sequences
    /// held past the threshold, and silently releases sequences that never
    /// received an end event within `sequence_timeout`.
    pub fn poll(&mut self, now: Instant) -> Vec<Gesture> {
        self.sequences
            .retain(|s| now.duration_since(s.started_at) < self.config.sequence_timeout);
        if self.sequences.len() != 2 {
            self.pinch_baseline = None;
        }

        let mut gestures = Vec::new();
        for seq in &mut self.sequences {
            if seq.long_press_fired || seq.moved_past_slop || seq.in_pinch {
                continue;
            }
            let Some(target) = seq.target else { continue };
            if now.duration_since(seq.started_at) >= self.config.long_press_duration {
                seq.long_press_fired = true;
                #[cfg(feature = "tracing")]
                tracing::trace!(id = seq.id.0, row = target, "long press fired");
                gestures.push(Gesture::LongPress { target });
            }
        }
        gestures
    }

    /// Drop all sequences and pending deadlines. Use on teardown.
    pub fn reset(&mut self) {
        self.sequences.clear();
        self.pinch_baseline = None;
        self.last_swipe = None;
    }

    /// Distance between the two live fingers, when exactly two are down.
    fn finger_distance(&self) -> Option<f32> {
        if self.sequences.len() != 2 {
            return None;
        }
        let a = &self.sequences[0];
        let b = &self.sequences[1];
        let dx = a.last_x - b.last_x;
        let dy = a.last_y - b.last_y;
        Some((dx * dx + dy * dy).sqrt())
    }
}
