use crate::errors::KiautoError;
use crate::process::ProcessError;

#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("Display '{display}' did not respond after {attempts} attempts ({timeout_ms}ms)")]
    ServerTimeout {
        display: String,
        attempts: u32,
        timeout_ms: u64,
    },

    #[error("Failed to start display server '{program}': {message}")]
    BackendStartFailed { program: String, message: String },

    #[error("No free display number between :{first} and :{last}")]
    NoFreeDisplay { first: u32, last: u32 },

    #[error("Failed to start screen recorder '{program}': {message}")]
    RecorderStartFailed { program: String, message: String },

    #[error(transparent)]
    Process(#[from] ProcessError),
}

impl KiautoError for DisplayError {
    fn error_code(&self) -> &'static str {
        match self {
            DisplayError::ServerTimeout { .. } => "DISPLAY_SERVER_TIMEOUT",
            DisplayError::BackendStartFailed { .. } => "DISPLAY_BACKEND_START_FAILED",
            DisplayError::NoFreeDisplay { .. } => "DISPLAY_NO_FREE_DISPLAY",
            DisplayError::RecorderStartFailed { .. } => "DISPLAY_RECORDER_START_FAILED",
            DisplayError::Process(e) => e.error_code(),
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            DisplayError::BackendStartFailed { .. } | DisplayError::RecorderStartFailed { .. }
        )
    }
}
