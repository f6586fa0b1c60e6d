//! Window synchronization over an external window/input tool.
//!
//! Every wait is a bounded poll (see [`crate::polling`]). A search that
//! finds nothing, or a tool call that fails while the window does not exist
//! yet, is a normal "not yet" outcome; only an exhausted budget is an error.

pub mod commands;
pub mod errors;
pub mod handler;
pub mod types;

pub use commands::{WindowCommand, WindowTool};
pub use errors::WindowError;
pub use handler::WindowSynchronizer;
pub use types::{WaitState, WindowHandle, WindowWait, parse_handles, pick_window};
