#![forbid(unsafe_code)]

//! Core: canonical input events, gesture recognition, frame coalescing, and
//! accessibility announcements for the result-surface list.

pub mod announcer;
pub mod coalescer;
pub mod event;
pub mod gesture;
