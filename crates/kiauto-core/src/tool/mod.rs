//! Adapter for external command-line tools (window query tool, display probes).
//!
//! The adapter runs one program with the given arguments and hands back its
//! raw standard output. It never retries; callers that poll own the retry.

pub mod errors;
pub mod operations;

pub use errors::ToolError;
pub use operations::{CommandTool, ToolRunner, is_available};
