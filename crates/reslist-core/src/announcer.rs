#![forbid(unsafe_code)]

//! Assistive-technology announcement coalescing.
//!
//! Screen readers queue live-region updates; flooding them during rapid
//! interaction (scroll bursts, repeated ratings) makes the output useless.
//! [`Announcer`] enforces a minimum gap between announcements: messages
//! arriving inside the gap are held with a last-message-wins policy and
//! delivered once the gap has elapsed.
//!
//! Politeness follows the live-region model: polite messages wait their
//! turn; an assertive message replaces any held polite one (but a held
//! assertive message is never downgraded by a later polite one).
//!
//! Like the rest of the core this is poll-driven: call
//! [`poll`](Announcer::poll) from the frame tick to release held messages.
//! There are no OS timers, so nothing fires after the owner is dropped.

use std::time::{Duration, Instant};

/// Live-region politeness level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Politeness {
    /// Announce at the next graceful opportunity.
    Polite,
    /// Interrupt current speech.
    Assertive,
}

/// A message for assistive technology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    /// Human-readable message text.
    pub message: String,
    /// How urgently it should be spoken.
    pub politeness: Politeness,
}

impl Announcement {
    /// Create a polite announcement.
    #[must_use]
    pub fn polite(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            politeness: Politeness::Polite,
        }
    }

    /// Create an assertive announcement.
    #[must_use]
    pub fn assertive(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            politeness: Politeness::Assertive,
        }
    }
}

/// Configuration for announcement pacing.
#[derive(Debug, Clone)]
pub struct AnnouncerConfig {
    /// Minimum spacing between delivered announcements (default: 150ms).
    pub min_gap: Duration,
}

impl Default for AnnouncerConfig {
    fn default() -> Self {
        Self {
            min_gap: Duration::from_millis(150),
        }
    }
}

impl AnnouncerConfig {
    /// Set the minimum inter-announcement gap.
    #[must_use]
    pub fn with_min_gap(mut self, gap: Duration) -> Self {
        self.min_gap = gap;
        self
    }
}

/// Coalescing announcement queue.
#[derive(Debug, Clone)]
pub struct Announcer {
    config: AnnouncerConfig,
    /// Message held until the gap elapses; last-message-wins.
    held: Option<Announcement>,
    /// When the most recent announcement was delivered.
    last_delivered_at: Option<Instant>,
}

impl Announcer {
    /// Create an announcer with the given configuration.
    #[must_use]
    pub fn new(config: AnnouncerConfig) -> Self {
        Self {
            config,
            held: None,
            last_delivered_at: None,
        }
    }

    /// Create an announcer with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(AnnouncerConfig::default())
    }

    /// Submit a message. Returns it immediately if the gap has elapsed,
    /// otherwise holds it for a later [`poll`](Self::poll).
    ///
    /// Within the gap, the newest message wins - except that a held
    /// assertive message is not displaced by a polite one.
    pub fn announce(
        &mut self,
        message: impl Into<String>,
        politeness: Politeness,
        now: Instant,
    ) -> Option<Announcement> {
        let announcement = Announcement {
            message: message.into(),
            politeness,
        };

        if self.gap_elapsed(now) {
            self.last_delivered_at = Some(now);
            // A held assertive still outranks an incoming polite: release
            // the assertive now and hold the polite for the next poll.
            if let Some(held) = self.held.take()
                && held.politeness == Politeness::Assertive
                && politeness == Politeness::Polite
            {
                self.held = Some(announcement);
                return Some(held);
            }
            return Some(announcement);
        }

        let keep_held = matches!(
            (&self.held, politeness),
            (
                Some(Announcement {
                    politeness: Politeness::Assertive,
                    ..
                }),
                Politeness::Polite,
            )
        );
        if !keep_held {
            self.held = Some(announcement);
        }
        None
    }

    /// Release the held message if the gap has elapsed.
    ///
    /// Call once per frame tick.
    pub fn poll(&mut self, now: Instant) -> Option<Announcement> {
        if self.held.is_some() && self.gap_elapsed(now) {
            self.last_delivered_at = Some(now);
            return self.held.take();
        }
        None
    }

    /// Whether a message is waiting for the gap to elapse.
    #[must_use]
    pub fn has_held(&self) -> bool {
        self.held.is_some()
    }

    /// Drop any held message. Use on teardown.
    pub fn clear(&mut self) {
        self.held = None;
    }

    fn gap_elapsed(&self, now: Instant) -> bool {
        match self.last_delivered_at {
            Some(at) => now.duration_since(at) >= self.config.min_gap,
            None => true,
        }
    }
}
