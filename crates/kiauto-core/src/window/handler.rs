use std::time::Duration;

use regex::Regex;
use tracing::{Span, debug, info, warn};

use super::commands::WindowTool;
use super::errors::WindowError;
use super::types::{WaitState, WindowHandle, WindowWait, pick_window};
use crate::logging::LogContext;
use crate::polling::{Polling, poll_until};
use crate::tool::{CommandTool, ToolRunner};

/// Waits for windows and focus changes by polling the window tool.
pub struct WindowSynchronizer {
    tool: WindowTool,
    polling: Polling,
    span: Span,
}

impl WindowSynchronizer {
    pub fn new(runner: Box<dyn ToolRunner>, log: &LogContext) -> Self {
        Self {
            tool: WindowTool::new(runner),
            polling: Polling::default(),
            span: log.span("window"),
        }
    }

    /// Synchronizer driving `program` on `display`.
    pub fn for_display(program: &str, display: &str, log: &LogContext) -> Self {
        Self::new(
            Box::new(CommandTool::new(program).with_display(display)),
            log,
        )
    }

    pub fn with_polling(mut self, polling: Polling) -> Self {
        self.polling = polling;
        self
    }

    pub fn polling(&self) -> &Polling {
        &self.polling
    }

    /// Direct access to the tool for one-shot commands (keys, resize).
    pub fn tool(&self) -> &WindowTool {
        &self.tool
    }

    /// Wait for a visible window whose title matches `request.pattern`.
    ///
    /// Search failures are counted as "not found yet". When `request.focus`
    /// is set the window is focused and the call blocks until it holds the
    /// focus; a window that never gains focus fails with
    /// [`WindowError::FocusGainTimeout`].
    pub fn wait_for_window(&self, request: &WindowWait) -> Result<WindowHandle, WindowError> {
        let _entered = self.span.enter();
        Regex::new(&request.pattern).map_err(|e| WindowError::InvalidPattern {
            pattern: request.pattern.clone(),
            message: e.to_string(),
        })?;

        let polling = self.polling_for(request.timeout);
        let mut state = WaitState::Polling;
        info!(
            event = "core.window.wait_started",
            name = %request.name,
            pattern = %request.pattern,
            timeout_ms = polling.timeout_ms(),
            attempts = polling.attempts(),
            focus = request.focus
        );

        let found = poll_until(&polling, |attempt| {
            let Some(handle) = self.find_candidate(request, attempt) else {
                return Ok(None);
            };
            transition(&mut state, WaitState::Matched, &handle);

            if !request.focus {
                return Ok(Some(handle));
            }

            transition(&mut state, WaitState::Focusing, &handle);
            if let Err(e) = self.tool.focus(&handle, true) {
                debug!(
                    event = "core.window.focus_retry",
                    attempt = attempt,
                    handle = %handle,
                    error = %e
                );
                state = WaitState::Polling;
                return Ok(None);
            }

            match self.poll_focus(&handle, &polling, true) {
                Ok(true) => Ok(Some(handle)),
                Ok(false) => {
                    transition(&mut state, WaitState::TimedOut, &handle);
                    Err(WindowError::FocusGainTimeout {
                        handle: handle.to_string(),
                        timeout_ms: polling.timeout_ms(),
                    })
                }
                Err(e) => {
                    debug!(
                        event = "core.window.focus_retry",
                        attempt = attempt,
                        handle = %handle,
                        error = %e
                    );
                    state = WaitState::Polling;
                    Ok(None)
                }
            }
        })?;

        match found {
            Some(handle) => {
                transition(&mut state, WaitState::Done, &handle);
                info!(
                    event = "core.window.wait_completed",
                    name = %request.name,
                    handle = %handle
                );
                Ok(handle)
            }
            None => {
                state = WaitState::TimedOut;
                warn!(
                    event = "core.window.wait_timeout",
                    name = %request.name,
                    pattern = %request.pattern,
                    state = %state,
                    timeout_ms = polling.timeout_ms()
                );
                Err(WindowError::WindowTimeout {
                    name: request.name.clone(),
                    pattern: request.pattern.clone(),
                    timeout_ms: polling.timeout_ms(),
                })
            }
        }
    }

    /// Block until `handle` holds the input focus.
    pub fn wait_focus_gained(
        &self,
        handle: &WindowHandle,
        timeout: Option<Duration>,
    ) -> Result<(), WindowError> {
        let _entered = self.span.enter();
        let polling = self.polling_for(timeout);
        if self.poll_focus(handle, &polling, true)? {
            return Ok(());
        }
        warn!(event = "core.window.focus_gain_timeout", handle = %handle);
        Err(WindowError::FocusGainTimeout {
            handle: handle.to_string(),
            timeout_ms: polling.timeout_ms(),
        })
    }

    /// Block until `handle` no longer holds the input focus.
    pub fn wait_focus_lost(
        &self,
        handle: &WindowHandle,
        timeout: Option<Duration>,
    ) -> Result<(), WindowError> {
        let _entered = self.span.enter();
        let polling = self.polling_for(timeout);
        if self.poll_focus(handle, &polling, false)? {
            return Ok(());
        }
        warn!(event = "core.window.focus_loss_timeout", handle = %handle);
        Err(WindowError::FocusLossTimeout {
            handle: handle.to_string(),
            timeout_ms: polling.timeout_ms(),
        })
    }

    /// The window currently holding input focus.
    pub fn focused_window(&self) -> Result<Option<WindowHandle>, WindowError> {
        Ok(self.tool.focused()?)
    }

    fn polling_for(&self, timeout: Option<Duration>) -> Polling {
        match timeout {
            Some(timeout) => self.polling.with_timeout(timeout),
            None => self.polling,
        }
    }

    /// One search attempt. `None` means "not yet", whatever the reason.
    fn find_candidate(&self, request: &WindowWait, attempt: u32) -> Option<WindowHandle> {
        let matches = match self.tool.search(&request.pattern, true) {
            Ok(matches) => matches,
            Err(e) => {
                debug!(
                    event = "core.window.search_retry",
                    attempt = attempt,
                    error = %e
                );
                return None;
            }
        };

        let handle = pick_window(&matches)?.clone();
        if request.skip.as_ref() == Some(&handle) {
            debug!(
                event = "core.window.search_skipped",
                attempt = attempt,
                handle = %handle
            );
            return None;
        }
        Some(handle)
    }

    /// Poll the focused window until it is (`gained`) or is not `handle`.
    /// `Ok(false)` means the budget ran out.
    fn poll_focus(
        &self,
        handle: &WindowHandle,
        polling: &Polling,
        gained: bool,
    ) -> Result<bool, WindowError> {
        debug!(
            event = "core.window.focus_wait_started",
            handle = %handle,
            gained = gained,
            timeout_ms = polling.timeout_ms()
        );
        let reached = poll_until(polling, |attempt| {
            let focused = self.tool.focused()?;
            let has_focus = focused.as_ref() == Some(handle);
            if has_focus == gained {
                return Ok::<_, WindowError>(Some(()));
            }
            debug!(
                event = "core.window.focus_wait_retry",
                attempt = attempt,
                focused = ?focused.as_ref().map(WindowHandle::as_str)
            );
            Ok(None)
        })?;
        Ok(reached.is_some())
    }
}

fn transition(state: &mut WaitState, next: WaitState, handle: &WindowHandle) {
    debug_assert!(!state.is_terminal(), "no transition out of {state}");
    debug!(
        event = "core.window.state_changed",
        from = %state,
        to = %next,
        handle = %handle
    );
    *state = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::ToolError;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    type CallLog = Arc<Mutex<Vec<String>>>;

    /// Window tool double: search answers come from a queue, focus follows
    /// `windowfocus` when `focus_follows` is set.
    struct ScriptedTool {
        calls: CallLog,
        searches: Mutex<VecDeque<Result<&'static str, ()>>>,
        focused: Mutex<String>,
        focus_follows: bool,
    }

    impl ScriptedTool {
        fn new(searches: Vec<Result<&'static str, ()>>) -> (Self, CallLog) {
            let calls = CallLog::default();
            let tool = Self {
                calls: calls.clone(),
                searches: Mutex::new(searches.into()),
                focused: Mutex::new("1".to_string()),
                focus_follows: true,
            };
            (tool, calls)
        }

        fn focused(self, id: &str) -> Self {
            *self.focused.lock().unwrap() = id.to_string();
            self
        }

        fn focus_sticks(mut self) -> Self {
            self.focus_follows = false;
            self
        }
    }

    fn no_match(args: &[String]) -> ToolError {
        ToolError::NonZeroExit {
            program: "xdotool".to_string(),
            args: args.join(" "),
            code: "exit status: 1".to_string(),
            stderr: String::new(),
        }
    }

    impl ToolRunner for ScriptedTool {
        fn program(&self) -> &str {
            "xdotool"
        }

        fn run(&self, args: &[String]) -> Result<Vec<u8>, ToolError> {
            self.calls.lock().unwrap().push(args.join(" "));
            match args.first().map(String::as_str) {
                Some("search") if args.last().is_some_and(|a| a == "windowfocus") => {
                    Ok(Vec::new())
                }
                Some("search") => match self.searches.lock().unwrap().pop_front() {
                    Some(Ok(output)) => Ok(output.as_bytes().to_vec()),
                    Some(Err(())) | None => Err(no_match(args)),
                },
                Some("getwindowfocus") => {
                    Ok(format!("{}\n", self.focused.lock().unwrap()).into_bytes())
                }
                Some("windowfocus") => {
                    if self.focus_follows
                        && let Some(id) = args.last()
                    {
                        *self.focused.lock().unwrap() = id.clone();
                    }
                    Ok(Vec::new())
                }
                _ => Ok(Vec::new()),
            }
        }
    }

    fn synchronizer(tool: ScriptedTool, polling: Polling) -> WindowSynchronizer {
        WindowSynchronizer::new(Box::new(tool), &LogContext::default()).with_polling(polling)
    }

    fn count(calls: &CallLog, prefix: &str) -> usize {
        calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn fast() -> Polling {
        Polling::from_millis(200, 50)
    }

    #[test]
    fn test_single_match_returned_on_first_attempt() {
        let (tool, calls) = ScriptedTool::new(vec![Ok("111\n")]);
        let sync = synchronizer(tool, fast());

        let handle = sync
            .wait_for_window(&WindowWait::new("Plot", "Plot").focus(false))
            .unwrap();

        assert_eq!(handle, WindowHandle::from("111"));
        assert_eq!(count(&calls, "search"), 1);
    }

    #[test]
    fn test_two_matches_returns_second() {
        let (tool, _calls) = ScriptedTool::new(vec![Ok("111\n222\n")]);
        let sync = synchronizer(tool, fast());

        let handle = sync
            .wait_for_window(&WindowWait::new("Plot", "Plot").focus(false))
            .unwrap();
        assert_eq!(handle, WindowHandle::from("222"));
    }

    #[test]
    fn test_skipped_window_keeps_polling() {
        let (tool, calls) = ScriptedTool::new(vec![Ok("333\n"); 10]);
        let sync = synchronizer(tool, fast());

        let request = WindowWait::new("Plot", "Plot").focus(false).skip("333");
        let result = sync.wait_for_window(&request);

        assert!(matches!(result, Err(WindowError::WindowTimeout { .. })));
        assert_eq!(count(&calls, "search"), 4);
    }

    #[test]
    fn test_skip_then_new_window() {
        let (tool, _calls) = ScriptedTool::new(vec![Ok("333\n"), Ok("333\n"), Ok("444\n")]);
        let sync = synchronizer(tool, fast());

        let request = WindowWait::new("Plot", "Plot").focus(false).skip("333");
        assert_eq!(
            sync.wait_for_window(&request).unwrap(),
            WindowHandle::from("444")
        );
    }

    #[test]
    fn test_timeout_attempts_and_elapsed() {
        let (tool, calls) = ScriptedTool::new(vec![]);
        let sync = synchronizer(tool, Polling::from_millis(400, 100));

        let start = Instant::now();
        let result = sync.wait_for_window(&WindowWait::new("ERC", "Electrical Rules"));
        let elapsed = start.elapsed();

        match result {
            Err(WindowError::WindowTimeout {
                name,
                pattern,
                timeout_ms,
            }) => {
                assert_eq!(name, "ERC");
                assert_eq!(pattern, "Electrical Rules");
                assert_eq!(timeout_ms, 400);
            }
            other => panic!("expected WindowTimeout, got {other:?}"),
        }
        assert_eq!(count(&calls, "search"), 4);
        assert!(elapsed >= Duration::from_millis(400), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(400 + 100 + 300), "elapsed {elapsed:?}");
    }

    #[test]
    fn test_request_timeout_overrides_default() {
        let (tool, calls) = ScriptedTool::new(vec![]);
        let sync = synchronizer(tool, Polling::from_millis(10_000, 50));

        let request = WindowWait::new("Plot", "Plot").timeout(Duration::from_millis(100));
        assert!(sync.wait_for_window(&request).is_err());
        assert_eq!(count(&calls, "search"), 2);
    }

    #[test]
    fn test_invalid_pattern_rejected_before_polling() {
        let (tool, calls) = ScriptedTool::new(vec![]);
        let sync = synchronizer(tool, fast());

        let result = sync.wait_for_window(&WindowWait::new("Broken", "Plot ("));
        assert!(matches!(result, Err(WindowError::InvalidPattern { .. })));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_backreference_pattern_rejected() {
        let (tool, calls) = ScriptedTool::new(vec![Ok("62914566\n")]);
        let sync = synchronizer(tool, fast());

        let result = sync.wait_for_window(&WindowWait::new("Twin", r"(Plot) \1"));
        match result {
            Err(WindowError::InvalidPattern { pattern, .. }) => assert_eq!(pattern, r"(Plot) \1"),
            other => panic!("expected InvalidPattern, got {other:?}"),
        }
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_end_to_end_match_on_fourth_poll_then_focus() {
        let (tool, calls) =
            ScriptedTool::new(vec![Err(()), Err(()), Ok(""), Ok("62914566\n")]);
        let sync = synchronizer(tool, Polling::default());

        let request = WindowWait::new("app", "MyApp").timeout(Duration::from_secs(2));
        assert_eq!(sync.polling_for(request.timeout).attempts(), 4);

        let handle = sync.wait_for_window(&request).unwrap();

        assert_eq!(handle, WindowHandle::from("62914566"));
        assert_eq!(count(&calls, "search"), 4);
        let calls = calls.lock().unwrap();
        assert!(calls.contains(&"windowfocus --sync 62914566".to_string()));
        assert_eq!(calls.last().map(String::as_str), Some("getwindowfocus"));
    }

    #[test]
    fn test_focus_never_gained_fails() {
        let (tool, _calls) = ScriptedTool::new(vec![Ok("555\n")]);
        let sync = synchronizer(tool.focus_sticks(), fast());

        let result = sync.wait_for_window(&WindowWait::new("Plot", "Plot"));
        match result {
            Err(WindowError::FocusGainTimeout { handle, .. }) => assert_eq!(handle, "555"),
            other => panic!("expected FocusGainTimeout, got {other:?}"),
        }
    }

    #[test]
    fn test_wait_focus_gained_and_lost() {
        let (tool, _calls) = ScriptedTool::new(vec![]);
        let sync = synchronizer(tool.focused("777"), fast());
        let handle = WindowHandle::from("777");

        assert!(sync.wait_focus_gained(&handle, None).is_ok());
        assert!(matches!(
            sync.wait_focus_lost(&handle, None),
            Err(WindowError::FocusLossTimeout { .. })
        ));

        let other = WindowHandle::from("888");
        assert!(sync.wait_focus_lost(&other, None).is_ok());
        assert!(matches!(
            sync.wait_focus_gained(&other, None),
            Err(WindowError::FocusGainTimeout { .. })
        ));
    }

    #[test]
    fn test_focus_tool_failure_propagates() {
        struct Broken;
        impl ToolRunner for Broken {
            fn program(&self) -> &str {
                "xdotool"
            }
            fn run(&self, _args: &[String]) -> Result<Vec<u8>, ToolError> {
                Err(ToolError::NotFound {
                    program: "xdotool".to_string(),
                })
            }
        }

        let sync = WindowSynchronizer::new(Box::new(Broken), &LogContext::default());
        let result = sync.wait_focus_gained(&WindowHandle::from("1"), None);
        assert!(matches!(
            result,
            Err(WindowError::Tool(ToolError::NotFound { .. }))
        ));
    }

    #[test]
    fn test_for_display_uses_real_tool() {
        let sync =
            WindowSynchronizer::for_display("kiauto-missing-xdotool", ":99", &LogContext::default());
        assert_eq!(sync.tool().program(), "kiauto-missing-xdotool");
        assert_eq!(sync.polling(), &Polling::default());
        assert!(matches!(
            sync.focused_window(),
            Err(WindowError::Tool(ToolError::NotFound { .. }))
        ));
    }

    #[test]
    fn test_one_shot_commands() {
        let (tool, calls) = ScriptedTool::new(vec![]);
        let sync = synchronizer(tool.focused("99"), fast());

        sync.tool().key(&["ctrl+shift+p"]).unwrap();
        sync.tool()
            .resize(&WindowHandle::from("99"), 800, 600, true)
            .unwrap();
        sync.tool().search_and_focus("Pcbnew").unwrap();
        assert_eq!(sync.focused_window().unwrap(), Some(WindowHandle::from("99")));

        let calls = calls.lock().unwrap();
        assert_eq!(
            calls.as_slice(),
            [
                "key ctrl+shift+p",
                "windowsize --sync 99 800 600",
                "search --name Pcbnew windowfocus",
                "getwindowfocus"
            ]
        );
    }
}
