use tracing::{Span, debug, info, warn};

use super::errors::DisplayError;
use crate::logging::LogContext;
use crate::polling::{Polling, poll_until};
use crate::tool::{CommandTool, ToolRunner, is_available};

/// Lightweight command used to check that a display server answers.
#[derive(Debug, Clone)]
pub struct ServerProbe {
    program: String,
    args: Vec<String>,
    verifies: bool,
    span: Span,
}

impl ServerProbe {
    /// Pick the best probe installed on this machine.
    ///
    /// Prefers `setxkbmap -query`, then `xset q`. Without either the probe
    /// falls back to `ls`, which cannot tell whether the server is up.
    pub fn detect(log: &LogContext) -> Self {
        let span = log.span("display");
        let (program, args, verifies) = if is_available("setxkbmap") {
            ("setxkbmap", vec!["-query"], true)
        } else if is_available("xset") {
            ("xset", vec!["q"], true)
        } else {
            warn!(
                parent: &span,
                event = "core.display.probe_unavailable",
                message = "setxkbmap and xset not found, display readiness cannot be verified"
            );
            ("ls", vec![], false)
        };

        Self {
            program: program.to_string(),
            args: args.into_iter().map(String::from).collect(),
            verifies,
            span,
        }
    }

    pub fn custom(program: impl Into<String>, args: &[&str], log: &LogContext) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
            verifies: true,
            span: log.span("display"),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Whether a successful probe actually proves the server is up.
    pub fn verifies(&self) -> bool {
        self.verifies
    }

    /// Poll `display_name` until the probe command succeeds.
    ///
    /// Any failure of the probe counts as "not yet". Fails with
    /// [`DisplayError::ServerTimeout`] once the attempt budget is spent.
    pub fn wait_for_server(&self, display_name: &str, polling: &Polling) -> Result<(), DisplayError> {
        let _entered = self.span.enter();
        let tool = CommandTool::new(&self.program).with_display(display_name);

        info!(
            event = "core.display.server_wait_started",
            display = %display_name,
            probe = %self.program,
            timeout_ms = polling.timeout_ms()
        );

        let ready = poll_until(polling, |attempt| {
            Ok::<_, DisplayError>(match tool.run(&self.args) {
                Ok(_) => Some(()),
                Err(e) => {
                    debug!(
                        event = "core.display.server_wait_retry",
                        attempt = attempt,
                        error = %e
                    );
                    None
                }
            })
        })?;

        match ready {
            Some(()) => {
                info!(event = "core.display.server_wait_completed", display = %display_name);
                Ok(())
            }
            None => {
                warn!(
                    event = "core.display.server_wait_timeout",
                    display = %display_name,
                    attempts = polling.attempts()
                );
                Err(DisplayError::ServerTimeout {
                    display: display_name.to_string(),
                    attempts: polling.attempts(),
                    timeout_ms: polling.timeout_ms(),
                })
            }
        }
    }
}
