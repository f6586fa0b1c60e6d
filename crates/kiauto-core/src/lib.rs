//! kiauto-core: headless GUI automation primitives
//!
//! This library drives a desktop application inside a virtual X display by
//! polling window state and synthesizing input through external tools. It
//! is used by the `kiauto` CLI and by workflow code that scripts the GUI.
//!
//! # Main Entry Points
//!
//! - [`display`] - Virtual display session with optional screen recording
//! - [`process`] - Supervised child processes and output file waits
//! - [`window`] - Wait for windows and focus changes
//! - [`clipboard`] - Move text in and out of the clipboard
//! - [`config`] - Configuration management

pub mod clipboard;
pub mod config;
pub mod display;
pub mod errors;
pub mod events;
pub mod logging;
pub mod polling;
pub mod process;
pub mod tool;
pub mod window;

#[cfg(test)]
mod test_support;

// Re-export commonly used types at crate root for convenience
pub use clipboard::{ClipboardBridge, ClipboardError};
pub use config::AutomationConfig;
pub use display::{DisplayError, SessionConfig, SessionLauncher, VirtualDisplaySession};
pub use errors::KiautoError;
pub use polling::Polling;
pub use process::{ProcessError, SupervisedProcess};
pub use tool::{CommandTool, ToolError, ToolRunner};
pub use window::{WindowError, WindowHandle, WindowSynchronizer, WindowWait};

// Re-export logging initialization
pub use logging::{LogContext, init_logging};
