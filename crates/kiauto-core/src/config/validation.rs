use crate::config::types::AutomationConfig;
use crate::errors::ConfigError;

/// Color depths the virtual framebuffer accepts.
pub const VALID_COLOR_DEPTHS: &[u8] = &[8, 16, 24, 32];

/// Validate a merged configuration.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidConfiguration`] for zero dimensions, an
/// unsupported color depth, or a poll interval that is zero or larger than
/// its timeout.
pub fn validate_config(config: &AutomationConfig) -> Result<(), ConfigError> {
    let display = &config.display;
    if display.width() == 0 || display.height() == 0 {
        return Err(ConfigError::InvalidConfiguration {
            message: format!(
                "Display dimensions must be non-zero, got {}x{}",
                display.width(),
                display.height()
            ),
        });
    }

    if !VALID_COLOR_DEPTHS.contains(&display.color_depth()) {
        return Err(ConfigError::InvalidConfiguration {
            message: format!(
                "Invalid color depth {}. Valid options: {:?}",
                display.color_depth(),
                VALID_COLOR_DEPTHS
            ),
        });
    }

    let polling = &config.polling;
    check_interval(
        "poll_interval_ms",
        polling.poll_interval_ms(),
        "timeout_ms",
        polling.timeout_ms(),
    )?;
    check_interval(
        "poll_interval_ms",
        polling.poll_interval_ms(),
        "server_timeout_ms",
        polling.server_timeout_ms(),
    )?;
    check_interval(
        "file_poll_interval_ms",
        polling.file_poll_interval_ms(),
        "file_timeout_ms",
        polling.file_timeout_ms(),
    )?;

    let tools = &config.tools;
    for (key, value) in [
        ("window_tool", tools.window_tool()),
        ("clipboard_tool", tools.clipboard_tool()),
        ("display_server", tools.display_server()),
        ("recorder", tools.recorder()),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::InvalidConfiguration {
                message: format!("tools.{key} cannot be empty"),
            });
        }
    }

    Ok(())
}

fn check_interval(
    interval_key: &str,
    interval_ms: u64,
    timeout_key: &str,
    timeout_ms: u64,
) -> Result<(), ConfigError> {
    if interval_ms == 0 {
        return Err(ConfigError::InvalidConfiguration {
            message: format!("polling.{interval_key} must be greater than 0"),
        });
    }
    if interval_ms > timeout_ms {
        return Err(ConfigError::InvalidConfiguration {
            message: format!(
                "polling.{interval_key} ({interval_ms}) must not exceed polling.{timeout_key} ({timeout_ms})"
            ),
        });
    }
    Ok(())
}
