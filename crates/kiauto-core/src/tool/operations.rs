use std::io::ErrorKind;
use std::process::{Command, Stdio};

use tracing::debug;

use super::errors::ToolError;

/// Something that can run an external tool and return its raw stdout.
///
/// Implemented by [`CommandTool`] for real processes; tests provide scripted
/// runners instead.
pub trait ToolRunner: Send + Sync {
    /// Name of the program, used in logs and errors.
    fn program(&self) -> &str;

    /// Run the tool with `args` and return its standard output verbatim.
    ///
    /// Trailing whitespace is preserved; callers strip what they need.
    fn run(&self, args: &[String]) -> Result<Vec<u8>, ToolError>;
}

/// Runs a program found in `PATH` (or by absolute path).
#[derive(Debug, Clone)]
pub struct CommandTool {
    program: String,
    display: Option<String>,
}

impl CommandTool {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            display: None,
        }
    }

    /// Point the tool at a specific X display instead of the inherited `DISPLAY`.
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    pub fn display(&self) -> Option<&str> {
        self.display.as_deref()
    }

    /// Build a `Command` for this program with the display applied.
    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        if let Some(display) = &self.display {
            command.env("DISPLAY", display);
        }
        command
    }

    /// Map a failure to start this program onto [`ToolError`].
    pub fn spawn_error(&self, e: std::io::Error) -> ToolError {
        match e.kind() {
            ErrorKind::NotFound => ToolError::NotFound {
                program: self.program.clone(),
            },
            _ => ToolError::SpawnFailed {
                program: self.program.clone(),
                message: e.to_string(),
            },
        }
    }
}

impl ToolRunner for CommandTool {
    fn program(&self) -> &str {
        &self.program
    }

    fn run(&self, args: &[String]) -> Result<Vec<u8>, ToolError> {
        debug!(
            event = "core.tool.run_started",
            program = %self.program,
            args = %args.join(" ")
        );

        let output = self
            .command()
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            debug!(
                event = "core.tool.run_failed",
                program = %self.program,
                status = %output.status,
                stderr = %stderr
            );
            return Err(ToolError::NonZeroExit {
                program: self.program.clone(),
                args: args.join(" "),
                code: output.status.to_string(),
                stderr,
            });
        }

        debug!(
            event = "core.tool.run_completed",
            program = %self.program,
            bytes = output.stdout.len()
        );

        Ok(output.stdout)
    }
}

/// Check whether `program` can be found in `PATH`.
pub fn is_available(program: &str) -> bool {
    which::which(program).is_ok()
}
