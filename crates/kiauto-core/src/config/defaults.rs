//! Built-in configuration defaults.

pub const DEFAULT_WIDTH: u32 = 1024;
pub const DEFAULT_HEIGHT: u32 = 768;
pub const DEFAULT_COLOR_DEPTH: u8 = 24;

pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
pub const DEFAULT_SERVER_TIMEOUT_MS: u64 = 10_000;

/// Output files are usually written shortly after the dialog closes.
pub const DEFAULT_FILE_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_FILE_POLL_INTERVAL_MS: u64 = 200;

pub const DEFAULT_WINDOW_TOOL: &str = "xdotool";
pub const DEFAULT_CLIPBOARD_TOOL: &str = crate::clipboard::operations::DEFAULT_CLIPBOARD_TOOL;
pub const DEFAULT_DISPLAY_SERVER: &str = "Xvfb";
pub const DEFAULT_RECORDER: &str = "recordmydesktop";

/// Directory name used under the home and project directories.
pub const CONFIG_DIR_NAME: &str = ".kiauto";
pub const CONFIG_FILE_NAME: &str = "config.toml";
