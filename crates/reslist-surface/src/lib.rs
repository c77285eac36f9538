#![forbid(unsafe_code)]

//! Virtualized search-result surface for the knowledge-base client.
//!
//! Renders only the rows near the scroll position, tracks selection across
//! keyboard and touch input, and projects an accessible listbox view. The
//! raw event model lives in `reslist-core`; this crate owns the layout and
//! list semantics.
//!
//! Entry point is [`surface::ResultSurface`]; the submodules are usable on
//! their own when a host only needs one piece.

pub mod fenwick;
pub mod result;
pub mod selection;
pub mod surface;
pub mod viewport;
pub mod window;

pub use surface::{ListEvent, ResultSurface, SurfaceConfig, SurfaceState, SurfaceView};
