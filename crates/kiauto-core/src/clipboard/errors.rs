use crate::errors::KiautoError;
use crate::tool::ToolError;

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("Failed to store text in clipboard ({}): {output}", describe_exit(.exit_code))]
    StoreFailed {
        /// Exit code of the clipboard tool, `None` if killed by a signal.
        exit_code: Option<i32>,
        /// Everything the tool wrote to stdout and stderr.
        output: String,
    },

    #[error("Clipboard temporary file error: {message}")]
    TempFile { message: String },

    #[error(transparent)]
    Tool(#[from] ToolError),
}

fn describe_exit(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

impl KiautoError for ClipboardError {
    fn error_code(&self) -> &'static str {
        match self {
            ClipboardError::StoreFailed { .. } => "CLIPBOARD_STORE_FAILED",
            ClipboardError::TempFile { .. } => "CLIPBOARD_TEMP_FILE",
            ClipboardError::Tool(_) => "CLIPBOARD_TOOL_FAILED",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, ClipboardError::Tool(ToolError::NotFound { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_failed_display() {
        let error = ClipboardError::StoreFailed {
            exit_code: Some(1),
            output: "Error: Can't open display: (null)".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to store text in clipboard (exit code 1): Error: Can't open display: (null)"
        );
        assert_eq!(error.error_code(), "CLIPBOARD_STORE_FAILED");
    }

    #[test]
    fn test_store_failed_by_signal_display() {
        let error = ClipboardError::StoreFailed {
            exit_code: None,
            output: String::new(),
        };
        assert!(error.to_string().contains("terminated by signal"));
    }

    #[test]
    fn test_missing_tool_is_user_error() {
        let error = ClipboardError::from(ToolError::NotFound {
            program: "xclip".to_string(),
        });
        assert_eq!(error.error_code(), "CLIPBOARD_TOOL_FAILED");
        assert!(error.is_user_error());
    }
}
