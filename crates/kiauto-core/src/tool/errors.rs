use crate::errors::KiautoError;

/// Failure to invoke an external command-line tool.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    #[error("Tool '{program}' not found in PATH")]
    NotFound { program: String },

    #[error("Failed to run '{program}': {message}")]
    SpawnFailed { program: String, message: String },

    #[error("'{program} {args}' exited with {code}: {stderr}")]
    NonZeroExit {
        program: String,
        args: String,
        code: String,
        stderr: String,
    },
}

impl KiautoError for ToolError {
    fn error_code(&self) -> &'static str {
        match self {
            ToolError::NotFound { .. } => "TOOL_NOT_FOUND",
            ToolError::SpawnFailed { .. } => "TOOL_SPAWN_FAILED",
            ToolError::NonZeroExit { .. } => "TOOL_NON_ZERO_EXIT",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, ToolError::NotFound { .. })
    }
}
