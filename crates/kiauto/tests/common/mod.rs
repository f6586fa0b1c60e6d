//! Shared fixtures for CLI integration tests.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Write an executable `/bin/sh` script named `name` into `dir`.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}")).expect("Failed to write stub script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
        .expect("Failed to make stub script executable");
    path
}

/// Write `./.kiauto/config.toml` under `project`.
pub fn write_project_config(project: &Path, content: &str) {
    let config_dir = project.join(".kiauto");
    fs::create_dir_all(&config_dir).expect("Failed to create .kiauto dir");
    fs::write(config_dir.join("config.toml"), content).expect("Failed to write config");
}

/// Clipboard tool double keeping the selection in a file next to itself.
pub fn fake_clipboard(dir: &Path) -> PathBuf {
    let state = dir.join("selection");
    write_script(
        dir,
        "fake-xclip",
        &format!(
            "if [ \"$1\" = \"-o\" ]; then cat '{0}' 2>/dev/null; exit 0; fi\n\
             cat \"$3\" > '{0}'\n",
            state.display()
        ),
    )
}

/// Window tool double: one visible window `12345` that takes focus.
pub fn fake_window_tool(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "fake-xdotool",
        "case \"$1\" in\n\
         search) echo 12345 ;;\n\
         getwindowfocus) echo 12345 ;;\n\
         esac\n",
    )
}

/// Run `kiauto` in `project` with `HOME` pointing at the same directory, so
/// no real user config leaks into the test.
pub fn run_kiauto(project: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_kiauto"))
        .current_dir(project)
        .env("HOME", project)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute kiauto")
}
