//! Terminal viewer for a recorded trace
//!
//! - [`app`]: viewer state, the event loop and key handling
//! - [`panes`]: one rendering function per pane
//! - [`theme`]: the colour palette shared by every pane
//!
//! The viewer never executes code. It walks a finished
//! [`TraceTimeline`](crate::trace::TraceTimeline) back and forth, so
//! stepping backward is as cheap as stepping forward.

pub mod app;
pub mod panes;
pub mod theme;

pub use app::App;
