//! UI primitives for the Time Capsule CLI.
//!
//! - **Context**: environment detection (TTY, color, unicode)
//! - **Mode**: output mode resolution (json, plain, pretty)
//! - **Theme**: badge tokens and colors
//! - **Render**: tables, badges, key-value lines, hints

mod context;
mod mode;
pub mod render;
pub mod theme;

pub use context::UiContext;
pub use mode::OutputMode;
pub use theme::Badge;

pub use render::{badge, hint, kv, table, Column};
