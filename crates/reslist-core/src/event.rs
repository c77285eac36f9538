#![forbid(unsafe_code)]

//! Canonical input/event types.
//!
//! This module defines the standard event types fed into the result surface.
//! All events derive `Clone` and `PartialEq` for use in tests and pattern
//! matching.
//!
//! # Design Notes
//!
//! - Pointer coordinates are pixels (`f32`), origin at the top-left of the
//!   list container, y growing downward.
//! - Events are injected by the host (a window system, a test harness); the
//!   core never reads input itself.
//! - `Modifiers` use bitflags for easy combination.

use bitflags::bitflags;

/// Canonical input event.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A keyboard event.
    Key(KeyEvent),

    /// A pointer (touch) event.
    Pointer(PointerEvent),

    /// A scroll by `delta` pixels (positive = content moves up / scroll down).
    Scroll {
        /// Signed scroll delta in pixels.
        delta: f32,
    },

    /// A tick from the host's frame loop.
    ///
    /// Fired once per paint frame. Drives coalesced-event flushing,
    /// long-press deadlines, and announcement pacing.
    Tick,
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// The type of key event (press, repeat, or release).
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a new key event with default modifiers and Press kind.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Create a key event with a specific kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Check if this is a specific character key.
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        matches!(self.code, KeyCode::Char(ch) if ch == c)
    }

    /// Check if Ctrl modifier is held.
    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    /// Check if Alt modifier is held.
    #[must_use]
    pub const fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }
}

/// Key codes relevant to list navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A printable character (includes space).
    Char(char),
    /// Enter / Return.
    Enter,
    /// Escape.
    Escape,
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Home.
    Home,
    /// End.
    End,
    /// Page up.
    PageUp,
    /// Page down.
    PageDown,
}

/// The kind of a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyEventKind {
    /// Key was pressed.
    #[default]
    Press,
    /// Key is repeating (held down).
    Repeat,
    /// Key was released.
    Release,
}

bitflags! {
    /// Keyboard modifier flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers held.
        const NONE = 0;
        /// Shift key.
        const SHIFT = 1 << 0;
        /// Control key.
        const CTRL = 1 << 1;
        /// Alt / Option key.
        const ALT = 1 << 2;
        /// Super / Cmd / Windows key.
        const SUPER = 1 << 3;
    }
}

/// Identifier for one concurrent pointer sequence (finger, stylus).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointerId(pub u32);

/// Phase of a pointer sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    /// Contact started.
    Down,
    /// Contact moved.
    Move,
    /// Contact ended normally.
    Up,
    /// Contact was cancelled by the system (palm rejection, focus loss).
    Cancel,
}

/// A raw pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Which pointer sequence this event belongs to.
    pub id: PointerId,
    /// The phase of the sequence.
    pub phase: PointerPhase,
    /// X coordinate in pixels, relative to the list container.
    pub x: f32,
    /// Y coordinate in pixels, relative to the list container.
    pub y: f32,
}

impl PointerEvent {
    /// Create a new pointer event.
    #[must_use]
    pub const fn new(id: PointerId, phase: PointerPhase, x: f32, y: f32) -> Self {
        Self { id, phase, x, y }
    }

    /// Shorthand for a Down event.
    #[must_use]
    pub const fn down(id: u32, x: f32, y: f32) -> Self {
        Self::new(PointerId(id), PointerPhase::Down, x, y)
    }

    /// Shorthand for a Move event.
    #[must_use]
    pub const fn moved(id: u32, x: f32, y: f32) -> Self {
        Self::new(PointerId(id), PointerPhase::Move, x, y)
    }

    /// Shorthand for an Up event.
    #[must_use]
    pub const fn up(id: u32, x: f32, y: f32) -> Self {
        Self::new(PointerId(id), PointerPhase::Up, x, y)
    }

    /// Shorthand for a Cancel event.
    #[must_use]
    pub const fn cancel(id: u32, x: f32, y: f32) -> Self {
        Self::new(PointerId(id), PointerPhase::Cancel, x, y)
    }

    /// Euclidean distance to another position.
    #[must_use]
    pub fn distance_to(&self, x: f32, y: f32) -> f32 {
        let dx = self.x - x;
        let dy = self.y - y;
        (dx * dx + dy * dy).sqrt()
    }
}
