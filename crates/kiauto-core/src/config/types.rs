//! Configuration type definitions.
//!
//! Every field read from TOML is optional so that user and project files
//! can be merged field by field. Accessors fall back to the built-in
//! defaults from [`super::defaults`].
//!
//! # Example Configuration
//!
//! ```toml
//! [display]
//! width = 1280
//! height = 1024
//! color_depth = 24
//!
//! [recording]
//! output = "/tmp/kiauto/session.ogv"
//!
//! [polling]
//! timeout_ms = 15000
//! poll_interval_ms = 500
//!
//! [tools]
//! window_tool = "xdotool"
//! clipboard_tool = "xclip"
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::polling::Polling;

/// Main configuration loaded from TOML config files.
///
/// Loaded from:
/// 1. User config: `~/.kiauto/config.toml`
/// 2. Project config: `./.kiauto/config.toml`
///
/// Project config values override user config values.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AutomationConfig {
    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub recording: RecordingConfig,

    #[serde(default)]
    pub polling: PollingConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

/// Virtual framebuffer geometry.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Screen width in pixels. Default: 1024.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    /// Screen height in pixels. Default: 768.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    /// Bits per pixel. Default: 24.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_depth: Option<u8>,
}

/// Screen recording of the virtual display.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct RecordingConfig {
    /// Video file to record into. No recording when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

/// Timeouts and poll cadence, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PollingConfig {
    /// Budget for window and focus waits. Default: 10000.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Delay between window and focus attempts. Default: 500.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_ms: Option<u64>,

    /// Budget for the display server to come up. Default: 10000.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_timeout_ms: Option<u64>,

    /// Budget for an output file to be written. Default: 5000.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_timeout_ms: Option<u64>,

    /// Delay between output file checks. Default: 200.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_poll_interval_ms: Option<u64>,
}

/// External programs driven by the automation layer.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ToolsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_tool: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clipboard_tool: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_server: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorder: Option<String>,
}

impl DisplayConfig {
    pub fn width(&self) -> u32 {
        self.width.unwrap_or(defaults::DEFAULT_WIDTH)
    }

    pub fn height(&self) -> u32 {
        self.height.unwrap_or(defaults::DEFAULT_HEIGHT)
    }

    pub fn color_depth(&self) -> u8 {
        self.color_depth.unwrap_or(defaults::DEFAULT_COLOR_DEPTH)
    }
}

impl PollingConfig {
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms.unwrap_or(defaults::DEFAULT_TIMEOUT_MS)
    }

    pub fn poll_interval_ms(&self) -> u64 {
        self.poll_interval_ms
            .unwrap_or(defaults::DEFAULT_POLL_INTERVAL_MS)
    }

    pub fn server_timeout_ms(&self) -> u64 {
        self.server_timeout_ms
            .unwrap_or(defaults::DEFAULT_SERVER_TIMEOUT_MS)
    }

    pub fn file_timeout_ms(&self) -> u64 {
        self.file_timeout_ms
            .unwrap_or(defaults::DEFAULT_FILE_TIMEOUT_MS)
    }

    pub fn file_poll_interval_ms(&self) -> u64 {
        self.file_poll_interval_ms
            .unwrap_or(defaults::DEFAULT_FILE_POLL_INTERVAL_MS)
    }

    /// Cadence for window and focus waits.
    pub fn window(&self) -> Polling {
        Polling::from_millis(self.timeout_ms(), self.poll_interval_ms())
    }

    /// Cadence for the display server probe. Shares the window poll interval.
    pub fn server(&self) -> Polling {
        Polling::from_millis(self.server_timeout_ms(), self.poll_interval_ms())
    }

    /// Cadence for output file waits.
    pub fn file(&self) -> Polling {
        Polling::from_millis(self.file_timeout_ms(), self.file_poll_interval_ms())
    }
}

impl ToolsConfig {
    pub fn window_tool(&self) -> &str {
        self.window_tool
            .as_deref()
            .unwrap_or(defaults::DEFAULT_WINDOW_TOOL)
    }

    pub fn clipboard_tool(&self) -> &str {
        self.clipboard_tool
            .as_deref()
            .unwrap_or(defaults::DEFAULT_CLIPBOARD_TOOL)
    }

    pub fn display_server(&self) -> &str {
        self.display_server
            .as_deref()
            .unwrap_or(defaults::DEFAULT_DISPLAY_SERVER)
    }

    pub fn recorder(&self) -> &str {
        self.recorder
            .as_deref()
            .unwrap_or(defaults::DEFAULT_RECORDER)
    }
}
