use std::path::PathBuf;

use crate::errors::KiautoError;

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Failed to start '{program}': {message}")]
    SpawnFailed { program: String, message: String },

    #[error("Failed to signal process '{pid}': {message}")]
    SignalFailed { pid: u32, message: String },

    #[error("Failed to wait for process '{pid}': {message}")]
    WaitFailed { pid: u32, message: String },

    #[error("Timed out after {timeout_ms}ms waiting for process '{pid}' to write '{path}'")]
    FileTimeout {
        pid: u32,
        path: PathBuf,
        timeout_ms: u64,
    },

    #[error("Process '{pid}' exited without creating '{path}'")]
    ProcessExited { pid: u32, path: PathBuf },
}

impl KiautoError for ProcessError {
    fn error_code(&self) -> &'static str {
        match self {
            ProcessError::SpawnFailed { .. } => "PROCESS_SPAWN_FAILED",
            ProcessError::SignalFailed { .. } => "PROCESS_SIGNAL_FAILED",
            ProcessError::WaitFailed { .. } => "PROCESS_WAIT_FAILED",
            ProcessError::FileTimeout { .. } => "PROCESS_FILE_TIMEOUT",
            ProcessError::ProcessExited { .. } => "PROCESS_EXITED",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, ProcessError::SpawnFailed { .. })
    }
}
