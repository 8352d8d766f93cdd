//! WebSocket support for the `workflow.stream` progress feed (spec §6).

pub mod events;
pub mod handler;

pub use events::StreamEvent;
pub use handler::{ws_handler, BroadcastState};
