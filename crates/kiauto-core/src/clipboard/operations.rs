use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::Stdio;

use tempfile::NamedTempFile;
use tracing::{Span, debug, error};

use super::errors::ClipboardError;
use crate::logging::LogContext;
use crate::tool::CommandTool;

/// Default clipboard tool.
pub const DEFAULT_CLIPBOARD_TOOL: &str = "xclip";

/// Stores and retrieves text through the X clipboard selection.
///
/// The clipboard is one global slot shared with the driven application.
/// A successful [`store`](Self::store) only means the tool accepted the
/// text; callers confirm the effect through window state.
#[derive(Debug)]
pub struct ClipboardBridge {
    tool: CommandTool,
    temp_dir: Option<PathBuf>,
    span: Span,
}

impl ClipboardBridge {
    pub fn new(program: impl Into<String>, log: &LogContext) -> Self {
        Self {
            tool: CommandTool::new(program),
            temp_dir: None,
            span: log.span("clipboard"),
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.tool = self.tool.with_display(display);
        self
    }

    /// Stage temporary files in `dir` instead of the system temp directory.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Put `text` on the clipboard.
    ///
    /// The tool must exit with status 0 and print nothing; any captured
    /// output or a non-zero status fails with [`ClipboardError::StoreFailed`].
    /// Both temporary files are removed before this returns.
    pub fn store(&self, text: &str) -> Result<(), ClipboardError> {
        let _entered = self.span.enter();
        debug!(event = "core.clipboard.store_started", text = %text);

        let mut input = self.temp_file("kiauto-clip-in-")?;
        input
            .write_all(text.as_bytes())
            .and_then(|_| input.flush())
            .map_err(|e| temp_file_error("write clipboard text", e))?;

        let capture = self.temp_file("kiauto-clip-out-")?;
        let stdout = capture
            .as_file()
            .try_clone()
            .map_err(|e| temp_file_error("open capture file", e))?;
        let stderr = capture
            .as_file()
            .try_clone()
            .map_err(|e| temp_file_error("open capture file", e))?;

        let status = self
            .tool
            .command()
            .args(["-selection", "clipboard"])
            .arg(input.path())
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .status()
            .map_err(|e| ClipboardError::Tool(self.tool.spawn_error(e)))?;

        input
            .close()
            .map_err(|e| temp_file_error("remove clipboard text file", e))?;

        let mut output = String::new();
        capture
            .reopen()
            .and_then(|mut file| file.read_to_string(&mut output))
            .map_err(|e| temp_file_error("read capture file", e))?;
        capture
            .close()
            .map_err(|e| temp_file_error("remove capture file", e))?;

        if !output.is_empty() || !status.success() {
            error!(
                event = "core.clipboard.store_failed",
                status = %status,
                output = %output.trim()
            );
            return Err(ClipboardError::StoreFailed {
                exit_code: status.code(),
                output,
            });
        }

        debug!(event = "core.clipboard.store_completed", bytes = text.len());
        Ok(())
    }

    /// Read the current clipboard text.
    ///
    /// An empty clipboard yields an empty string rather than an error.
    pub fn retrieve(&self) -> Result<String, ClipboardError> {
        let _entered = self.span.enter();

        let output = self
            .tool
            .command()
            .args(["-o", "-selection", "clipboard"])
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|e| ClipboardError::Tool(self.tool.spawn_error(e)))?;

        if !output.status.success() {
            debug!(
                event = "core.clipboard.retrieve_empty",
                status = %output.status
            );
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(event = "core.clipboard.retrieve_completed", text = %text);
        Ok(text)
    }

    fn temp_file(&self, prefix: &str) -> Result<NamedTempFile, ClipboardError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(prefix);
        let file = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        };
        file.map_err(|e| temp_file_error("create temporary file", e))
    }
}

fn temp_file_error(action: &str, e: std::io::Error) -> ClipboardError {
    ClipboardError::TempFile {
        message: format!("Failed to {action}: {e}"),
    }
}
