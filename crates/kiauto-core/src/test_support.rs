//! Helpers shared by unit tests that need stand-in executables.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Write an executable `/bin/sh` script named `name` into `dir`.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}")).expect("write stub script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod stub script");
    path
}
