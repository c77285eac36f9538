#![forbid(unsafe_code)]

//! The result surface: one facade owning the whole list state.
//!
//! A [`ResultSurface`] owns its viewport, selection controller, gesture
//! recognizer, frame coalescer and announcer exclusively; they are created
//! with the surface and dropped with it. Hosts push raw events in through
//! [`handle_event`](ResultSurface::handle_event), tick
//! [`on_frame`](ResultSurface::on_frame) once per paint, and consume the
//! returned [`ListEvent`]s. The surface never calls back into the host.
//!
//! Layout (scroll application and window computation) happens at most once
//! per frame, in `on_frame`, no matter how many raw events arrived in
//! between.

use std::time::{Duration, Instant};

use reslist_core::announcer::{Announcement, Announcer, AnnouncerConfig, Politeness};
use reslist_core::coalescer::FrameCoalescer;
use reslist_core::event::{Event, KeyEventKind, PointerEvent};
use reslist_core::gesture::{Gesture, GestureConfig, GestureRecognizer, SwipeDirection};

use crate::result::SearchResult;
use crate::selection::{SelectionConfig, SelectionController, SelectionEffect};
use crate::viewport::{ItemHeight, ViewportModel};
use crate::window::{compute_window, RenderWindow, WindowDiff};

/// Field used to group adjacent rows under a heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    /// Group by the entry's category.
    Category,
    /// Group by how the match was produced.
    MatchType,
}

/// Construction-time options for [`ResultSurface`].
#[derive(Debug, Clone)]
pub struct SurfaceConfig {
    /// Route pointer events into the gesture recognizer.
    pub enable_touch_gestures: bool,
    /// Enable `j`/`k` navigation and the rating chords.
    pub enable_advanced_shortcuts: bool,
    /// Row height strategy.
    pub item_height: ItemHeight,
    /// Extra rows rendered beyond each edge of the visible span.
    pub overscan: usize,
    /// Accessible label of the list container.
    pub aria_label: String,
    /// Entry id to select once results containing it are loaded.
    pub selected_id: Option<String>,
    /// Optional grouping projection for the rendered options.
    pub group_by: Option<GroupKey>,
    /// Announce rating outcomes politely.
    pub announce_ratings: bool,
    /// Idle time after which the type-ahead buffer restarts.
    pub typeahead_timeout: Duration,
    /// Gesture thresholds and timers.
    pub gesture: GestureConfig,
    /// Announcement pacing.
    pub announcer: AnnouncerConfig,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            enable_touch_gestures: true,
            enable_advanced_shortcuts: false,
            item_height: ItemHeight::Fixed(64),
            overscan: 3,
            aria_label: "Search results".to_string(),
            selected_id: None,
            group_by: None,
            announce_ratings: true,
            typeahead_timeout: Duration::from_millis(1000),
            gesture: GestureConfig::default(),
            announcer: AnnouncerConfig::default(),
        }
    }
}

impl SurfaceConfig {
    #[must_use]
    pub fn with_touch_gestures(mut self, enabled: bool) -> Self {
        self.enable_touch_gestures = enabled;
        self
    }

    #[must_use]
    pub fn with_advanced_shortcuts(mut self, enabled: bool) -> Self {
        self.enable_advanced_shortcuts = enabled;
        self
    }

    #[must_use]
    pub fn with_item_height(mut self, item_height: ItemHeight) -> Self {
        self.item_height = item_height;
        self
    }

    #[must_use]
    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    #[must_use]
    pub fn with_aria_label(mut self, label: impl Into<String>) -> Self {
        self.aria_label = label.into();
        self
    }

    #[must_use]
    pub fn with_selected_id(mut self, id: impl Into<String>) -> Self {
        self.selected_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_group_by(mut self, key: GroupKey) -> Self {
        self.group_by = Some(key);
        self
    }

    #[must_use]
    pub fn with_announce_ratings(mut self, enabled: bool) -> Self {
        self.announce_ratings = enabled;
        self
    }
}

/// What the surface reports back to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum ListEvent {
    /// A row was invoked (Enter, Space, or tap).
    ResultSelected { index: usize },
    /// A row was rated via swipe or rating chord.
    ResultRated { id: String, helpful: bool },
    /// The active index changed.
    SelectionChanged {
        index: Option<usize>,
        id: Option<String>,
    },
    /// A message for the assistive-technology live region.
    Announcement(Announcement),
    /// Two-finger pinch progress.
    Pinch { scale_delta: f32 },
}

/// Render state of the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceState {
    /// No results; render the "no results" affordance.
    Empty,
    /// Results are present and windowed.
    Ready,
    /// An explicit error short-circuits the list entirely.
    Error(String),
}

/// One windowed row in the accessible projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionNode {
    /// DOM-style node id, `result-{index}`.
    pub id: String,
    /// Row index in the full result array.
    pub index: usize,
    /// Entry id, absent for placeholder rows.
    pub entry_id: Option<String>,
    /// Whether this row is the active selection.
    pub selected: bool,
    /// Whether the underlying entry was malformed.
    pub placeholder: bool,
    /// Group heading value, when grouping is configured.
    pub group: Option<String>,
    /// Y-offset of the row's top edge, in pixels.
    pub offset_px: u32,
    /// Row height, in pixels.
    pub height_px: u32,
    /// Accessible label with ordinal and title.
    pub label: String,
}

/// Accessible projection of the surface for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceView {
    /// Container role; always `"listbox"`.
    pub role: &'static str,
    /// Container label.
    pub label: String,
    /// Node id of the active option, for aria-activedescendant.
    pub active_descendant: Option<String>,
    /// Render state.
    pub state: SurfaceState,
    /// One node per windowed row; empty unless `state` is `Ready`.
    pub options: Vec<OptionNode>,
}

/// A virtualized, multi-modal search-result list.
#[derive(Debug)]
pub struct ResultSurface {
    config: SurfaceConfig,
    results: Vec<SearchResult>,
    query: String,
    /// Bumped on every result swap; array identity for announcements.
    generation: u64,
    error: Option<String>,
    viewport: ViewportModel,
    selection: SelectionController,
    gestures: GestureRecognizer,
    coalescer: FrameCoalescer,
    announcer: Announcer,
    window: RenderWindow,
    last_diff: WindowDiff,
    pending_reveal: Option<usize>,
}

impl ResultSurface {
    #[must_use]
    pub fn new(config: SurfaceConfig) -> Self {
        let selection = SelectionController::new(
            SelectionConfig::default()
                .with_typeahead_timeout(config.typeahead_timeout)
                .with_advanced_shortcuts(config.enable_advanced_shortcuts),
        );
        let gestures = GestureRecognizer::new(config.gesture.clone());
        let announcer = Announcer::new(config.announcer.clone());
        let viewport = ViewportModel::new(config.item_height);
        Self {
            config,
            results: Vec::new(),
            query: String::new(),
            generation: 0,
            error: None,
            viewport,
            selection,
            gestures,
            coalescer: FrameCoalescer::new(),
            announcer,
            window: RenderWindow::EMPTY,
            last_diff: WindowDiff::default(),
            pending_reveal: None,
        }
    }

    /// Current result array.
    #[must_use]
    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    /// Query the current results answer, for display only.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Result-array identity; bumped on every swap.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Currently selected row index.
    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.selection.selected()
    }

    /// Entry id of the selected row.
    #[must_use]
    pub fn selected_id(&self) -> Option<&str> {
        self.selection.selected_id()
    }

    /// Current scroll offset in pixels.
    #[must_use]
    pub fn scroll_offset(&self) -> f32 {
        self.viewport.scroll_offset()
    }

    /// The row range currently worth mounting.
    #[must_use]
    pub fn render_window(&self) -> RenderWindow {
        self.window
    }

    /// Rows that entered and exited the window on the last layout pass.
    #[must_use]
    pub fn window_diff(&self) -> &WindowDiff {
        &self.last_diff
    }

    /// Set the pixel height of the scroll container.
    pub fn set_container_height(&mut self, height: f32) {
        self.viewport.set_container_height(height);
        self.relayout();
    }

    /// Record a measured row height; relevant under
    /// [`ItemHeight::Measured`] only.
    pub fn record_height(&mut self, index: usize, height: u32) {
        if self.viewport.record_height(index, height) {
            self.relayout();
        }
    }

    /// Swap in a fresh result array.
    ///
    /// Clears any error state, reconciles the selection by entry id, and
    /// queues the polite load announcement exactly once for this array.
    pub fn set_results(
        &mut self,
        results: Vec<SearchResult>,
        query: impl Into<String>,
        now: Instant,
    ) -> Vec<ListEvent> {
        self.results = results;
        self.query = query.into();
        self.generation = self.generation.wrapping_add(1);
        self.error = None;
        self.selection.clear_typeahead();
        // In-flight touch sequences refer to rows of the outgoing array.
        self.gestures.reset();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            rows = self.results.len(),
            generation = self.generation,
            "results swapped"
        );

        let row_ids = self
            .results
            .iter()
            .map(|r| r.entry_id().map(str::to_string))
            .collect();
        self.viewport.apply_results(row_ids);
        self.relayout();

        let mut events = Vec::new();
        let sync = self.selection.sync_results(&self.results);
        self.apply_effects(sync, &mut events, now);
        if self.selection.selected().is_none()
            && let Some(id) = self.config.selected_id.clone()
        {
            let fx = self
                .selection
                .select_by_id(&id, &self.results, self.window);
            self.apply_effects(fx, &mut events, now);
        }

        let message = format!(
            "{} search results loaded for \"{}\"",
            self.results.len(),
            self.query
        );
        if let Some(a) = self.announcer.announce(message, Politeness::Polite, now) {
            events.push(ListEvent::Announcement(a));
        }
        events
    }

    /// Enter the error state; rendering short-circuits until the next
    /// [`set_results`](Self::set_results).
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Feed one raw input event.
    ///
    /// Keys resolve synchronously. Pointer moves and scrolls are coalesced
    /// and take effect on the next [`on_frame`](Self::on_frame).
    pub fn handle_event(&mut self, event: Event, now: Instant) -> Vec<ListEvent> {
        let mut events = Vec::new();
        match event {
            Event::Key(key) => {
                if key.kind == KeyEventKind::Release {
                    return events;
                }
                let fx = self.selection.handle_key(
                    &key,
                    &self.results,
                    self.page_len(),
                    self.window,
                    now,
                );
                self.apply_effects(fx, &mut events, now);
            }
            Event::Pointer(p) => {
                if !self.config.enable_touch_gestures {
                    return events;
                }
                if let Some(Event::Pointer(p)) = self.coalescer.push(Event::Pointer(p)) {
                    // Pending moves must reach the recognizer before this
                    // down/up/cancel, or sequences resolve out of order.
                    self.drain_coalesced(&mut events, now);
                    self.feed_pointer(&p, &mut events, now);
                }
            }
            Event::Scroll { delta } => {
                let _ = self.coalescer.push(Event::Scroll { delta });
            }
            Event::Tick => {}
        }
        events
    }

    /// Run the per-paint pass: drain coalesced input, apply scroll, poll
    /// timers, and recompute the render window once.
    pub fn on_frame(&mut self, now: Instant) -> Vec<ListEvent> {
        let mut events = Vec::new();
        self.drain_coalesced(&mut events, now);

        // Long-press deadlines and stale-sequence cleanup.
        let polled = self.gestures.poll(now);
        self.apply_gestures(polled, &mut events, now);

        if let Some(index) = self.pending_reveal.take() {
            self.viewport.scroll_to_reveal(index);
        }
        self.relayout();

        if let Some(a) = self.announcer.poll(now) {
            events.push(ListEvent::Announcement(a));
        }
        events
    }

    /// Build the accessible projection for the current frame.
    #[must_use]
    pub fn view(&self) -> SurfaceView {
        let state = match (&self.error, self.results.is_empty()) {
            (Some(message), _) => SurfaceState::Error(message.clone()),
            (None, true) => SurfaceState::Empty,
            (None, false) => SurfaceState::Ready,
        };
        let options = if state == SurfaceState::Ready {
            self.window.as_range().map(|i| self.option_node(i)).collect()
        } else {
            Vec::new()
        };
        let active_descendant = match state {
            SurfaceState::Ready => self.selection.selected().map(|i| format!("result-{i}")),
            _ => None,
        };
        SurfaceView {
            role: "listbox",
            label: self.config.aria_label.clone(),
            active_descendant,
            state,
            options,
        }
    }

    fn option_node(&self, index: usize) -> OptionNode {
        let result = &self.results[index];
        let title = result.title().unwrap_or("Unavailable result");
        let group = match (self.config.group_by, &result.entry) {
            (Some(GroupKey::Category), Some(entry)) => Some(entry.category.clone()),
            (Some(GroupKey::MatchType), _) => Some(result.match_type.as_str().to_string()),
            _ => None,
        };
        OptionNode {
            id: format!("result-{index}"),
            index,
            entry_id: result.entry_id().map(str::to_string),
            selected: self.selection.selected() == Some(index),
            placeholder: result.entry.is_none(),
            group,
            offset_px: self.viewport.offset_of(index),
            height_px: self.viewport.height_of(index),
            label: format!("Result {} of {}: {title}", index + 1, self.results.len()),
        }
    }

    /// Apply everything the coalescer buffered since the last drain:
    /// summed scroll to the viewport, latest moves to the recognizer.
    fn drain_coalesced(&mut self, events: &mut Vec<ListEvent>, now: Instant) {
        for event in self.coalescer.flush() {
            match event {
                Event::Scroll { delta } => self.viewport.scroll_by(delta),
                Event::Pointer(p) => self.feed_pointer(&p, events, now),
                _ => {}
            }
        }
    }

    fn feed_pointer(&mut self, p: &PointerEvent, events: &mut Vec<ListEvent>, now: Instant) {
        let target = self.hit_test(p.y);
        let gestures = self.gestures.feed(p, target, now);
        self.apply_gestures(gestures, events, now);
    }

    /// Row under a container-relative y coordinate.
    fn hit_test(&self, y: f32) -> Option<u64> {
        self.viewport
            .index_at(y + self.viewport.scroll_offset())
            .map(|i| i as u64)
    }

    fn apply_gestures(
        &mut self,
        gestures: Vec<Gesture>,
        events: &mut Vec<ListEvent>,
        now: Instant,
    ) {
        for gesture in gestures {
            match gesture {
                Gesture::Tap { target, .. } => {
                    let index = target as usize;
                    if index < self.results.len() {
                        let fx = self.selection.select(index, &self.results, self.window);
                        self.apply_effects(fx, events, now);
                        events.push(ListEvent::ResultSelected { index });
                    }
                }
                Gesture::Swipe { target, direction } => {
                    // Placeholder rows have nothing to rate.
                    let id = self
                        .results
                        .get(target as usize)
                        .and_then(SearchResult::entry_id)
                        .map(str::to_string);
                    if let Some(id) = id {
                        let helpful = direction == SwipeDirection::Right;
                        self.push_rating(id, helpful, events, now);
                    }
                }
                Gesture::LongPress { target } => {
                    let title = self
                        .results
                        .get(target as usize)
                        .and_then(SearchResult::title)
                        .unwrap_or("Unavailable result");
                    let message = format!("Long press on {title}");
                    if let Some(a) =
                        self.announcer.announce(message, Politeness::Assertive, now)
                    {
                        events.push(ListEvent::Announcement(a));
                    }
                }
                Gesture::Pinch { scale_delta } => {
                    events.push(ListEvent::Pinch { scale_delta });
                }
            }
        }
    }

    fn apply_effects(
        &mut self,
        effects: Vec<SelectionEffect>,
        events: &mut Vec<ListEvent>,
        now: Instant,
    ) {
        for effect in effects {
            match effect {
                SelectionEffect::SelectionChanged { index, id } => {
                    events.push(ListEvent::SelectionChanged { index, id });
                }
                SelectionEffect::Invoke { index } => {
                    events.push(ListEvent::ResultSelected { index });
                }
                SelectionEffect::Rate { id, helpful } => {
                    self.push_rating(id, helpful, events, now);
                }
                SelectionEffect::ScrollIntoView { index } => {
                    self.pending_reveal = Some(index);
                }
            }
        }
    }

    fn push_rating(&mut self, id: String, helpful: bool, events: &mut Vec<ListEvent>, now: Instant) {
        events.push(ListEvent::ResultRated { id, helpful });
        if self.config.announce_ratings {
            let message = if helpful {
                "Result rated helpful"
            } else {
                "Result rated not helpful"
            };
            if let Some(a) = self.announcer.announce(message, Politeness::Polite, now) {
                events.push(ListEvent::Announcement(a));
            }
        }
    }

    /// Rows in one page jump, counted from the laid-out heights at the
    /// current scroll position.
    fn page_len(&self) -> usize {
        let container = self.viewport.container_height();
        if self.viewport.is_empty() || container <= 0.0 {
            return 1;
        }
        let top = self.viewport.scroll_offset();
        let first = self.viewport.index_at(top).unwrap_or(0);
        let bottom = ((top + container).ceil() as u32).max(1);
        let last = self
            .viewport
            .index_at((bottom - 1) as f32)
            .map_or(self.viewport.len(), |i| i + 1);
        last.saturating_sub(first).max(1)
    }

    /// Recompute the render window and the diff against the previous one.
    fn relayout(&mut self) {
        let next = compute_window(&self.viewport, self.config.overscan);
        self.last_diff = WindowDiff::between(self.window, next);
        self.window = next;

        #[cfg(feature = "tracing")]
        if !self.last_diff.is_empty() {
            tracing::trace!(window = ?self.window, "render window moved");
        }
    }
}
