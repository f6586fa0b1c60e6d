use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{Span, info, warn};

use super::errors::DisplayError;
use super::types::SessionConfig;
use crate::logging::LogContext;
use crate::process::{ProcessError, SupervisedProcess};

/// First display number tried when looking for a free one.
pub const FIRST_DISPLAY: u32 = 99;

const DISPLAY_SEARCH_RANGE: u32 = 100;

/// A virtual display server that can be started and stopped.
pub trait DisplayBackend {
    /// Start the server and return its display name, e.g. `":99"`.
    fn start(&mut self, config: &SessionConfig) -> Result<String, DisplayError>;

    /// Stop the server. Stopping a server that is not running does nothing.
    fn stop(&mut self) -> Result<(), DisplayError>;
}

/// Runs an `Xvfb` virtual framebuffer on the first free display number.
pub struct XvfbBackend {
    program: String,
    first_display: u32,
    socket_root: PathBuf,
    log: LogContext,
    span: Span,
    server: Option<SupervisedProcess>,
}

impl XvfbBackend {
    pub fn new(program: impl Into<String>, log: &LogContext) -> Self {
        Self {
            program: program.into(),
            first_display: FIRST_DISPLAY,
            socket_root: PathBuf::from("/tmp"),
            log: log.clone(),
            span: log.span("display"),
            server: None,
        }
    }

    /// Directory holding the `.X<n>-lock` files and `.X11-unix` sockets.
    pub fn with_socket_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.socket_root = root.into();
        self
    }

    pub fn with_first_display(mut self, first: u32) -> Self {
        self.first_display = first;
        self
    }

    pub fn is_running(&self) -> bool {
        self.server.is_some()
    }
}

/// First display number at or after `first` with neither a lock file nor a
/// socket under `root`.
pub fn find_free_display(root: &Path, first: u32) -> Result<u32, DisplayError> {
    let last = first.saturating_add(DISPLAY_SEARCH_RANGE - 1);
    (first..=last)
        .find(|n| {
            !root.join(format!(".X{n}-lock")).exists()
                && !root.join(".X11-unix").join(format!("X{n}")).exists()
        })
        .ok_or(DisplayError::NoFreeDisplay { first, last })
}

impl DisplayBackend for XvfbBackend {
    fn start(&mut self, config: &SessionConfig) -> Result<String, DisplayError> {
        let span = self.span.clone();
        let _entered = span.enter();

        if self.server.is_some() {
            return Err(DisplayError::BackendStartFailed {
                program: self.program.clone(),
                message: "display server is already running".to_string(),
            });
        }

        let number = find_free_display(&self.socket_root, self.first_display)?;
        let display_name = format!(":{number}");
        let screen = config.screen_spec();

        info!(
            event = "core.display.backend_start_started",
            program = %self.program,
            display = %display_name,
            screen = %screen
        );

        let mut command = Command::new(&self.program);
        command
            .args([display_name.as_str(), "-screen", "0", screen.as_str(), "-nolisten", "tcp"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let mut server = SupervisedProcess::spawn(&mut command, &self.log).map_err(|e| match e {
            ProcessError::SpawnFailed { program, message } => {
                DisplayError::BackendStartFailed { program, message }
            }
            other => DisplayError::Process(other),
        })?;

        if let Some(status) = server.try_wait()? {
            warn!(
                event = "core.display.backend_start_failed",
                display = %display_name,
                status = %status
            );
            return Err(DisplayError::BackendStartFailed {
                program: self.program.clone(),
                message: format!("exited immediately with {status}"),
            });
        }

        info!(
            event = "core.display.backend_start_completed",
            display = %display_name,
            pid = server.id()
        );
        self.server = Some(server);
        Ok(display_name)
    }

    fn stop(&mut self) -> Result<(), DisplayError> {
        let Some(mut server) = self.server.take() else {
            return Ok(());
        };
        let _entered = self.span.enter();
        server.terminate()?;
        let status = server.wait()?;
        info!(event = "core.display.backend_stop_completed", status = %status);
        Ok(())
    }
}
