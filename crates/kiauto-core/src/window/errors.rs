use crate::errors::KiautoError;
use crate::tool::ToolError;

#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    #[error("Timed out after {timeout_ms}ms waiting for window '{name}' (pattern '{pattern}')")]
    WindowTimeout {
        name: String,
        pattern: String,
        timeout_ms: u64,
    },

    #[error("Timed out after {timeout_ms}ms waiting for window '{handle}' to gain focus")]
    FocusGainTimeout { handle: String, timeout_ms: u64 },

    #[error("Timed out after {timeout_ms}ms waiting for window '{handle}' to lose focus")]
    FocusLossTimeout { handle: String, timeout_ms: u64 },

    #[error("Invalid window title pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error(transparent)]
    Tool(#[from] ToolError),
}

impl KiautoError for WindowError {
    fn error_code(&self) -> &'static str {
        match self {
            WindowError::WindowTimeout { .. } => "WINDOW_TIMEOUT",
            WindowError::FocusGainTimeout { .. } => "WINDOW_FOCUS_GAIN_TIMEOUT",
            WindowError::FocusLossTimeout { .. } => "WINDOW_FOCUS_LOSS_TIMEOUT",
            WindowError::InvalidPattern { .. } => "WINDOW_INVALID_PATTERN",
            WindowError::Tool(e) => e.error_code(),
        }
    }

    fn is_user_error(&self) -> bool {
        match self {
            WindowError::InvalidPattern { .. } => true,
            WindowError::Tool(e) => e.is_user_error(),
            _ => false,
        }
    }
}
