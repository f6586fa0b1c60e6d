use tracing::debug;

use super::types::{WindowHandle, parse_handles};
use crate::tool::{ToolError, ToolRunner};

/// One request in the window tool's command vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowCommand {
    Search { pattern: String, only_visible: bool },
    Focus { handle: WindowHandle, sync: bool },
    GetFocus,
    Resize {
        handle: WindowHandle,
        width: u32,
        height: u32,
        sync: bool,
    },
    Key { keys: Vec<String> },
    SearchAndFocus { pattern: String },
}

impl WindowCommand {
    /// Command line arguments for the tool.
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::new();
        match self {
            WindowCommand::Search {
                pattern,
                only_visible,
            } => {
                args.push("search".to_string());
                if *only_visible {
                    args.push("--onlyvisible".to_string());
                }
                args.extend(["--name".to_string(), pattern.clone()]);
            }
            WindowCommand::Focus { handle, sync } => {
                args.push("windowfocus".to_string());
                if *sync {
                    args.push("--sync".to_string());
                }
                args.push(handle.to_string());
            }
            WindowCommand::GetFocus => args.push("getwindowfocus".to_string()),
            WindowCommand::Resize {
                handle,
                width,
                height,
                sync,
            } => {
                args.push("windowsize".to_string());
                if *sync {
                    args.push("--sync".to_string());
                }
                args.extend([handle.to_string(), width.to_string(), height.to_string()]);
            }
            WindowCommand::Key { keys } => {
                args.push("key".to_string());
                args.extend(keys.iter().cloned());
            }
            WindowCommand::SearchAndFocus { pattern } => {
                args.extend([
                    "search".to_string(),
                    "--name".to_string(),
                    pattern.clone(),
                    "windowfocus".to_string(),
                ]);
            }
        }
        args
    }
}

/// Typed front end for the window/input tool.
pub struct WindowTool {
    runner: Box<dyn ToolRunner>,
}

impl WindowTool {
    pub fn new(runner: Box<dyn ToolRunner>) -> Self {
        Self { runner }
    }

    pub fn program(&self) -> &str {
        self.runner.program()
    }

    /// Run `command` and return its output as text.
    pub fn execute(&self, command: &WindowCommand) -> Result<String, ToolError> {
        let output = self.runner.run(&command.args())?;
        let text = String::from_utf8_lossy(&output).into_owned();
        debug!(
            event = "core.window.command_completed",
            command = ?command,
            output = %text.trim()
        );
        Ok(text)
    }

    /// Windows whose title matches `pattern`, in the order the tool lists them.
    pub fn search(&self, pattern: &str, only_visible: bool) -> Result<Vec<WindowHandle>, ToolError> {
        let output = self.execute(&WindowCommand::Search {
            pattern: pattern.to_string(),
            only_visible,
        })?;
        Ok(parse_handles(&output))
    }

    pub fn focus(&self, handle: &WindowHandle, sync: bool) -> Result<(), ToolError> {
        self.execute(&WindowCommand::Focus {
            handle: handle.clone(),
            sync,
        })?;
        Ok(())
    }

    /// The window holding input focus, if the tool reports one.
    pub fn focused(&self) -> Result<Option<WindowHandle>, ToolError> {
        let output = self.execute(&WindowCommand::GetFocus)?;
        Ok(parse_handles(&output).into_iter().next())
    }

    pub fn resize(
        &self,
        handle: &WindowHandle,
        width: u32,
        height: u32,
        sync: bool,
    ) -> Result<(), ToolError> {
        self.execute(&WindowCommand::Resize {
            handle: handle.clone(),
            width,
            height,
            sync,
        })?;
        Ok(())
    }

    /// Send key strokes such as `ctrl+p` or `Return` to the focused window.
    pub fn key<S: AsRef<str>>(&self, keys: &[S]) -> Result<(), ToolError> {
        self.execute(&WindowCommand::Key {
            keys: keys.iter().map(|k| k.as_ref().to_string()).collect(),
        })?;
        Ok(())
    }

    /// Focus the first window matching `pattern` in a single tool call.
    pub fn search_and_focus(&self, pattern: &str) -> Result<(), ToolError> {
        self.execute(&WindowCommand::SearchAndFocus {
            pattern: pattern.to_string(),
        })?;
        Ok(())
    }
}
