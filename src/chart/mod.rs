//! Gantt chart rendering.
//!
//! Task records are resolved into dated bars ([`layout`]) and rasterized into
//! an in-memory PNG ([`render`]).

pub mod font;
pub mod layout;
pub mod render;
pub mod types;


pub use layout::{GanttLayout, classify_status, resolve_task, resolve_tasks};
pub use render::{GanttRenderer, RenderOptions};
pub use types::*;
