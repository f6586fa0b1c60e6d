//! Scoped virtual display with optional screen recording.
//!
//! [`SessionLauncher::open`] either returns a running session or leaves
//! nothing behind: if the server never answers or the recorder cannot be
//! started, the display backend is stopped before the error is returned.
//! A [`VirtualDisplaySession`] tears itself down on drop; teardown failures
//! are logged and never propagated.

use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::{Span, error, info, warn};

use super::backend::{DisplayBackend, XvfbBackend};
use super::errors::DisplayError;
use super::probe::ServerProbe;
use super::types::{SessionConfig, recorder_args};
use crate::config::AutomationConfig;
use crate::config::defaults::DEFAULT_RECORDER;
use crate::logging::LogContext;
use crate::polling::Polling;
use crate::process::{ProcessError, SupervisedProcess};

/// Builds and opens a [`VirtualDisplaySession`].
pub struct SessionLauncher {
    backend: Box<dyn DisplayBackend>,
    probe: ServerProbe,
    polling: Polling,
    recorder: String,
    log: LogContext,
}

impl SessionLauncher {
    pub fn new(backend: Box<dyn DisplayBackend>, log: &LogContext) -> Self {
        Self {
            backend,
            probe: ServerProbe::detect(log),
            polling: Polling::default(),
            recorder: DEFAULT_RECORDER.to_string(),
            log: log.clone(),
        }
    }

    /// Launcher for an Xvfb server and tools named in `config`.
    pub fn from_config(config: &AutomationConfig, log: &LogContext) -> Self {
        let backend = XvfbBackend::new(config.tools.display_server(), log);
        Self::new(Box::new(backend), log)
            .with_polling(config.polling.server())
            .with_recorder(config.tools.recorder())
    }

    pub fn with_probe(mut self, probe: ServerProbe) -> Self {
        self.probe = probe;
        self
    }

    /// Budget for the server to start answering.
    pub fn with_polling(mut self, polling: Polling) -> Self {
        self.polling = polling;
        self
    }

    pub fn with_recorder(mut self, program: impl Into<String>) -> Self {
        self.recorder = program.into();
        self
    }

    /// Start the display, wait for it to answer, then start the recorder if
    /// `config.record_to` is set.
    pub fn open(self, config: &SessionConfig) -> Result<VirtualDisplaySession, DisplayError> {
        let Self {
            mut backend,
            probe,
            polling,
            recorder,
            log,
        } = self;
        let span = log.span("display");
        let _entered = span.enter();

        info!(
            event = "core.display.session_open_started",
            screen = %config.screen_spec(),
            recording = config.record_to.is_some()
        );

        let display_name = backend.start(config)?;

        let recorder = match prepare_display(&display_name, config, &probe, &polling, &recorder, &log) {
            Ok(recorder) => recorder,
            Err(e) => {
                error!(
                    event = "core.display.session_open_failed",
                    display = %display_name,
                    error = %e
                );
                if let Err(stop_error) = backend.stop() {
                    warn!(
                        event = "core.display.backend_stop_failed",
                        display = %display_name,
                        error = %stop_error
                    );
                }
                return Err(e);
            }
        };

        info!(event = "core.display.session_open_completed", display = %display_name);
        drop(_entered);

        Ok(VirtualDisplaySession {
            backend,
            display: display_name,
            config: config.clone(),
            recorder,
            closed: false,
            span,
        })
    }
}

fn prepare_display(
    display_name: &str,
    config: &SessionConfig,
    probe: &ServerProbe,
    polling: &Polling,
    program: &str,
    log: &LogContext,
) -> Result<Option<SupervisedProcess>, DisplayError> {
    probe.wait_for_server(display_name, polling)?;

    let Some(output) = &config.record_to else {
        return Ok(None);
    };

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| DisplayError::RecorderStartFailed {
            program: program.to_string(),
            message: format!("cannot create '{}': {e}", parent.display()),
        })?;
    }

    let mut command = Command::new(program);
    command
        .args(recorder_args(output))
        .env("DISPLAY", display_name)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    let recorder = SupervisedProcess::spawn(&mut command, log).map_err(|e| match e {
        ProcessError::SpawnFailed { program, message } => {
            DisplayError::RecorderStartFailed { program, message }
        }
        other => DisplayError::Process(other),
    })?;

    info!(
        event = "core.display.recording_started",
        pid = recorder.id(),
        output = %output.display()
    );
    Ok(Some(recorder))
}

/// One running virtual display, plus its recorder when recording.
pub struct VirtualDisplaySession {
    backend: Box<dyn DisplayBackend>,
    display: String,
    config: SessionConfig,
    recorder: Option<SupervisedProcess>,
    closed: bool,
    span: Span,
}

impl VirtualDisplaySession {
    /// Display name to export as `DISPLAY` to every child.
    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_some()
    }

    pub fn recording_path(&self) -> Option<&Path> {
        self.recorder
            .as_ref()
            .and(self.config.record_to.as_deref())
    }

    /// A `Command` for `program` that runs on this display.
    pub fn command(&self, program: impl AsRef<std::ffi::OsStr>) -> Command {
        let mut command = Command::new(program);
        command.env("DISPLAY", &self.display);
        command
    }

    /// Stop the recorder and the display now instead of at drop.
    pub fn close(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let _entered = self.span.enter();

        // The recorder only finalizes its output on SIGTERM
        if let Some(mut recorder) = self.recorder.take() {
            if let Err(e) = recorder.terminate() {
                warn!(event = "core.display.recorder_stop_failed", error = %e);
            }
            match recorder.wait() {
                Ok(status) => {
                    info!(event = "core.display.recording_stopped", status = %status);
                }
                Err(e) => {
                    warn!(event = "core.display.recorder_stop_failed", error = %e);
                }
            }
        }

        if let Err(e) = self.backend.stop() {
            warn!(
                event = "core.display.backend_stop_failed",
                display = %self.display,
                error = %e
            );
        }

        info!(event = "core.display.session_closed", display = %self.display);
    }
}

impl Drop for VirtualDisplaySession {
    fn drop(&mut self) {
        self.teardown();
    }
}
