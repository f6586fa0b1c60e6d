use std::path::{Path, PathBuf};

use crate::config::AutomationConfig;
use crate::config::defaults::{DEFAULT_COLOR_DEPTH, DEFAULT_HEIGHT, DEFAULT_WIDTH};

/// Geometry and recording target of one virtual display session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub width: u32,
    pub height: u32,
    pub color_depth: u8,
    pub record_to: Option<PathBuf>,
}

impl SessionConfig {
    pub fn new(width: u32, height: u32, color_depth: u8) -> Self {
        Self {
            width,
            height,
            color_depth,
            record_to: None,
        }
    }

    pub fn with_recording(mut self, path: impl Into<PathBuf>) -> Self {
        self.record_to = Some(path.into());
        self
    }

    /// Screen description in `WIDTHxHEIGHTxDEPTH` form.
    pub fn screen_spec(&self) -> String {
        format!("{}x{}x{}", self.width, self.height, self.color_depth)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT, DEFAULT_COLOR_DEPTH)
    }
}

impl From<&AutomationConfig> for SessionConfig {
    fn from(config: &AutomationConfig) -> Self {
        Self {
            width: config.display.width(),
            height: config.display.height(),
            color_depth: config.display.color_depth(),
            record_to: config.recording.output.clone(),
        }
    }
}

/// Arguments for the screen recorder writing to `output`.
pub fn recorder_args(output: &Path) -> Vec<String> {
    vec![
        "--overwrite".to_string(),
        "--no-sound".to_string(),
        "--no-frame".to_string(),
        "--on-the-fly-encoding".to_string(),
        "-o".to_string(),
        output.display().to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_spec() {
        assert_eq!(SessionConfig::default().screen_spec(), "1024x768x24");
        assert_eq!(SessionConfig::new(1920, 1080, 16).screen_spec(), "1920x1080x16");
    }

    #[test]
    fn test_from_automation_config() {
        let mut config = AutomationConfig::default();
        config.display.width = Some(1280);
        config.recording.output = Some(PathBuf::from("/tmp/rec/out.ogv"));

        let session = SessionConfig::from(&config);
        assert_eq!(session.width, 1280);
        assert_eq!(session.height, 768);
        assert_eq!(session.record_to, Some(PathBuf::from("/tmp/rec/out.ogv")));
    }

    #[test]
    fn test_recorder_args() {
        let args = recorder_args(Path::new("/tmp/out.ogv"));
        assert_eq!(
            args.join(" "),
            "--overwrite --no-sound --no-frame --on-the-fly-encoding -o /tmp/out.ogv"
        );
    }
}
