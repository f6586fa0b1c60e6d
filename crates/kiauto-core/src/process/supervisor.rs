//! Scoped ownership of a child process.
//!
//! A [`SupervisedProcess`] always ends the same way: streams closed, then
//! SIGTERM if the scope ended abnormally, then exactly one wait. Normal
//! completion goes through [`SupervisedProcess::wait`] or
//! [`SupervisedProcess::supervise`]; anything else (an early `?` return, a
//! panic) reaches `Drop` and is treated as abnormal.

use std::process::{Child, Command, ExitStatus};

use tracing::{Span, debug, info, warn};

use crate::logging::LogContext;
use crate::process::errors::ProcessError;
use crate::process::types::ChildHandle;

pub struct SupervisedProcess<C: ChildHandle = Child> {
    child: C,
    name: String,
    streams_closed: bool,
    terminated: bool,
    waited: bool,
    status: Option<ExitStatus>,
    span: Span,
}

impl SupervisedProcess<Child> {
    /// Start `command` under supervision.
    pub fn spawn(command: &mut Command, log: &LogContext) -> Result<Self, ProcessError> {
        let name = command.get_program().to_string_lossy().into_owned();
        let child = command.spawn().map_err(|e| ProcessError::SpawnFailed {
            program: name.clone(),
            message: e.to_string(),
        })?;
        Ok(Self::from_child(child, name, log))
    }
}

impl<C: ChildHandle> SupervisedProcess<C> {
    /// Take ownership of an already running child.
    pub fn from_child(child: C, name: impl Into<String>, log: &LogContext) -> Self {
        let span = log.span("process");
        let name = name.into();
        {
            let _entered = span.enter();
            info!(
                event = "core.process.started",
                pid = child.id(),
                name = %name
            );
        }
        Self {
            child,
            name,
            streams_closed: false,
            terminated: false,
            waited: false,
            status: None,
            span,
        }
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Access the underlying child, e.g. to read a piped stream.
    pub fn child_mut(&mut self) -> &mut C {
        &mut self.child
    }

    /// Controlled shutdown before the scope ends: close streams, send SIGTERM.
    ///
    /// The exit is still awaited when the scope ends. Calling this more than
    /// once, or after the process was reaped, does nothing.
    pub fn terminate(&mut self) -> Result<(), ProcessError> {
        if self.terminated || self.waited {
            return Ok(());
        }
        let span = self.span.clone();
        let _entered = span.enter();
        self.close_streams();
        self.child.terminate()?;
        self.terminated = true;
        info!(
            event = "core.process.terminate_sent",
            pid = self.child.id(),
            name = %self.name
        );
        Ok(())
    }

    /// Non-blocking exit check. Reaping here counts as the single wait.
    pub fn try_wait(&mut self) -> Result<Option<ExitStatus>, ProcessError> {
        if self.waited {
            return Ok(self.status);
        }
        let status = self.child.try_wait()?;
        if let Some(status) = status {
            self.waited = true;
            self.status = Some(status);
            debug!(
                parent: &self.span,
                event = "core.process.exited",
                pid = self.child.id(),
                status = %status
            );
        }
        Ok(status)
    }

    pub fn is_running(&mut self) -> Result<bool, ProcessError> {
        Ok(self.try_wait()?.is_none())
    }

    /// Normal end of scope: close streams and wait for the process to exit.
    pub fn wait(mut self) -> Result<ExitStatus, ProcessError> {
        self.finish(false)
    }

    /// Run `body` with the process, then tear it down.
    ///
    /// If `body` fails the process is sent SIGTERM before it is awaited and
    /// the body's error is returned; a teardown failure on that path is
    /// logged, not returned. If `body` succeeds the process is awaited
    /// without a signal.
    pub fn supervise<T, E, F>(mut self, body: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
        E: From<ProcessError>,
    {
        match body(&mut self) {
            Ok(value) => {
                self.finish(false)?;
                Ok(value)
            }
            Err(e) => {
                if let Err(teardown) = self.finish(true) {
                    warn!(
                        parent: &self.span,
                        event = "core.process.teardown_failed",
                        pid = self.child.id(),
                        error = %teardown
                    );
                }
                Err(e)
            }
        }
    }

    fn close_streams(&mut self) {
        if !self.streams_closed {
            self.child.close_streams();
            self.streams_closed = true;
        }
    }

    fn finish(&mut self, abnormal: bool) -> Result<ExitStatus, ProcessError> {
        if self.waited {
            if let Some(status) = self.status {
                return Ok(status);
            }
            return Err(ProcessError::WaitFailed {
                pid: self.child.id(),
                message: "process was already awaited".to_string(),
            });
        }

        let span = self.span.clone();
        let _entered = span.enter();
        self.close_streams();

        if abnormal && !self.terminated {
            match self.child.terminate() {
                Ok(()) => {
                    self.terminated = true;
                    info!(
                        event = "core.process.terminate_sent",
                        pid = self.child.id(),
                        name = %self.name,
                        reason = "abnormal_exit"
                    );
                }
                Err(e) => {
                    warn!(
                        event = "core.process.terminate_failed",
                        pid = self.child.id(),
                        error = %e
                    );
                }
            }
        }

        self.waited = true;
        let status = self.child.wait()?;
        self.status = Some(status);
        info!(
            event = "core.process.exited",
            pid = self.child.id(),
            name = %self.name,
            status = %status
        );
        Ok(status)
    }
}

impl<C: ChildHandle> Drop for SupervisedProcess<C> {
    fn drop(&mut self) {
        if self.waited {
            return;
        }
        if let Err(e) = self.finish(true) {
            warn!(
                parent: &self.span,
                event = "core.process.teardown_failed",
                pid = self.child.id(),
                error = %e
            );
        }
    }
}
