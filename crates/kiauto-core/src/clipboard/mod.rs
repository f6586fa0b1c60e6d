//! Clipboard bridge: move text into and out of the X clipboard.
//!
//! Text is staged through temporary files rather than pipes. The clipboard
//! tool forks a background owner of the selection that keeps inherited
//! descriptors open, so reading its output through a pipe never sees EOF.

pub mod errors;
pub mod operations;

pub use errors::ClipboardError;
pub use operations::ClipboardBridge;
