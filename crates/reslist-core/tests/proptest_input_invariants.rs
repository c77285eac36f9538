//! Property-based invariant tests for the input pipeline.
//!
//! These tests verify invariants that must hold for any valid inputs:
//!
//! 1. Coalescing preserves the net scroll delta, emits at most one scroll
//!    event and at most one move per pointer, and leaves the coalescer
//!    empty.
//! 2. The gesture recognizer never panics on arbitrary pointer streams,
//!    keeps at most one live sequence per pointer id, and only emits
//!    gestures for row targets it was handed on a `Down`.
//! 3. Every sequence is dropped once the sequence timeout passes.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use proptest::prelude::*;
use reslist_core::coalescer::FrameCoalescer;
use reslist_core::event::{Event, PointerEvent, PointerId, PointerPhase};
use reslist_core::gesture::{Gesture, GestureRecognizer};

// ── Helpers ─────────────────────────────────────────────────────────────

fn input_event_strategy() -> impl Strategy<Value = Event> {
    prop_oneof![
        (-200.0f32..200.0).prop_map(|delta| Event::Scroll { delta }),
        (0u32..4, 0.0f32..500.0, 0.0f32..500.0)
            .prop_map(|(id, x, y)| Event::Pointer(PointerEvent::moved(id, x, y))),
        (0u32..4, 0.0f32..500.0, 0.0f32..500.0)
            .prop_map(|(id, x, y)| Event::Pointer(PointerEvent::down(id, x, y))),
        (0u32..4, 0.0f32..500.0, 0.0f32..500.0)
            .prop_map(|(id, x, y)| Event::Pointer(PointerEvent::up(id, x, y))),
    ]
}

fn pointer_step_strategy() -> impl Strategy<Value = (PointerEvent, Option<u64>, u64)> {
    (
        0u32..4,
        prop_oneof![
            Just(PointerPhase::Down),
            Just(PointerPhase::Move),
            Just(PointerPhase::Up),
            Just(PointerPhase::Cancel),
        ],
        0.0f32..500.0,
        0.0f32..500.0,
        proptest::option::of(0u64..50),
        0u64..700,
    )
        .prop_map(|(id, phase, x, y, target, dt_ms)| {
            let event = PointerEvent {
                id: PointerId(id),
                phase,
                x,
                y,
            };
            (event, target, dt_ms)
        })
}

fn gesture_target(gesture: &Gesture) -> Option<u64> {
    match gesture {
        Gesture::Tap { target, .. }
        | Gesture::Swipe { target, .. }
        | Gesture::LongPress { target } => Some(*target),
        Gesture::Pinch { .. } => None,
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Coalescing preserves net scroll and latest moves
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn coalescing_preserves_net_scroll_and_latest_moves(
        events in prop::collection::vec(input_event_strategy(), 0..120),
    ) {
        let mut coalescer = FrameCoalescer::new();
        let mut net_scroll = 0.0f32;
        let mut moved_ids: HashSet<PointerId> = HashSet::new();

        for event in events {
            match &event {
                Event::Scroll { delta } => net_scroll += delta,
                Event::Pointer(p) if p.phase == PointerPhase::Move => {
                    moved_ids.insert(p.id);
                }
                _ => {}
            }
            let _ = coalescer.push(event);
        }

        let mut scroll_events = 0usize;
        let mut flushed_scroll = 0.0f32;
        let mut flushed_ids: HashSet<PointerId> = HashSet::new();
        for event in coalescer.flush() {
            match event {
                Event::Scroll { delta } => {
                    scroll_events += 1;
                    flushed_scroll = delta;
                }
                Event::Pointer(p) => {
                    prop_assert_eq!(p.phase, PointerPhase::Move);
                    prop_assert!(flushed_ids.insert(p.id), "duplicate move for {:?}", p.id);
                }
                other => prop_assert!(false, "unexpected flushed event: {:?}", other),
            }
        }

        prop_assert!(scroll_events <= 1);
        if scroll_events == 1 {
            // Deltas are summed in push order on both sides.
            prop_assert_eq!(flushed_scroll, net_scroll);
        } else {
            prop_assert_eq!(net_scroll, 0.0);
        }
        prop_assert!(flushed_ids.is_subset(&moved_ids));
        prop_assert!(!coalescer.has_pending());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Recognizer is robust to arbitrary pointer streams
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn recognizer_survives_arbitrary_pointer_streams(
        steps in prop::collection::vec(pointer_step_strategy(), 0..80),
    ) {
        let mut recognizer = GestureRecognizer::with_defaults();
        let mut now = Instant::now();
        let mut supplied: HashSet<u64> = HashSet::new();
        let mut seen_ids: HashSet<u32> = HashSet::new();

        for (event, target, dt_ms) in steps {
            now += Duration::from_millis(dt_ms);
            seen_ids.insert(event.id.0);
            if event.phase == PointerPhase::Down
                && let Some(t) = target
            {
                supplied.insert(t);
            }

            let emitted = recognizer.feed(&event, target, now);
            for gesture in emitted.iter().chain(recognizer.poll(now).iter()) {
                if let Some(t) = gesture_target(gesture) {
                    prop_assert!(
                        supplied.contains(&t),
                        "gesture names a target never handed in: {:?}",
                        gesture
                    );
                }
            }
            prop_assert!(recognizer.active_sequences() <= seen_ids.len());
        }

        // 3. Past the sequence timeout everything is released.
        let _ = recognizer.poll(now + Duration::from_secs(11));
        prop_assert_eq!(recognizer.active_sequences(), 0);
    }
}
