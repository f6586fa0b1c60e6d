use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Identifier of a window as printed by the window tool.
///
/// Only a lookup key; holding one keeps nothing alive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowHandle(String);

impl WindowHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WindowHandle {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for WindowHandle {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Parse tool output into handles, one per non-empty line.
pub fn parse_handles(output: &str) -> Vec<WindowHandle> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(WindowHandle::from)
        .collect()
}

/// Choose the window among search results.
///
/// One match is taken as is. With two or more the second one wins: the
/// first entry is usually a transient window of the tool itself.
pub fn pick_window(matches: &[WindowHandle]) -> Option<&WindowHandle> {
    match matches {
        [] => None,
        [only] => Some(only),
        [_, second, ..] => Some(second),
    }
}

/// Request for [`WindowSynchronizer::wait_for_window`](super::WindowSynchronizer::wait_for_window).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowWait {
    /// Human readable name used in logs and errors.
    pub name: String,
    /// Regular expression matched against window titles.
    ///
    /// The pattern is checked with `regex` syntax before the first search,
    /// while the window tool itself matches it as a case-insensitive POSIX
    /// extended regex. Constructs outside the common subset, such as
    /// backreferences, are rejected with
    /// [`WindowError::InvalidPattern`](super::WindowError::InvalidPattern).
    /// Case-insensitive matching comes from the tool, so `(?i)` is not needed.
    pub pattern: String,
    /// Overrides the synchronizer's timeout.
    pub timeout: Option<Duration>,
    /// Focus the window and wait for focus before returning.
    pub focus: bool,
    /// A window to ignore, typically one left over from a previous step.
    pub skip: Option<WindowHandle>,
}

impl WindowWait {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            timeout: None,
            focus: true,
            skip: None,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn focus(mut self, focus: bool) -> Self {
        self.focus = focus;
        self
    }

    pub fn skip(mut self, handle: impl Into<WindowHandle>) -> Self {
        self.skip = Some(handle.into());
        self
    }
}

/// Progress of a window wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitState {
    Polling,
    Matched,
    Focusing,
    Done,
    TimedOut,
}

impl WaitState {
    pub fn is_terminal(self) -> bool {
        matches!(self, WaitState::Done | WaitState::TimedOut)
    }
}

impl fmt::Display for WaitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WaitState::Polling => "polling",
            WaitState::Matched => "matched",
            WaitState::Focusing => "focusing",
            WaitState::Done => "done",
            WaitState::TimedOut => "timed_out",
        };
        f.write_str(name)
    }
}
