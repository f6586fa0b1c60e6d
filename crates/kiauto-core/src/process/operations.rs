use std::fs;
use std::path::{Path, PathBuf};

use sysinfo::{ProcessStatus, ProcessesToUpdate, System};
use tracing::{debug, info, warn};

use crate::polling::{Polling, poll_until};
use crate::process::errors::ProcessError;
use crate::process::types::Pid;

/// Check if a process with the given PID is alive.
///
/// Zombies count as exited: they hold no files and will never write again.
pub fn is_process_running(pid: u32) -> bool {
    let mut system = System::new();
    let pid_obj = Pid::from_raw(pid).to_sysinfo_pid();
    system.refresh_processes(ProcessesToUpdate::Some(&[pid_obj]), true);
    match system.process(pid_obj) {
        Some(process) => !matches!(process.status(), ProcessStatus::Zombie | ProcessStatus::Dead),
        None => false,
    }
}

/// Paths of the files a process currently holds open.
///
/// Reads `/proc/<pid>/fd`; an unreadable or missing directory yields an
/// empty list.
pub fn open_files(pid: u32) -> Vec<PathBuf> {
    let fd_dir = PathBuf::from(format!("/proc/{pid}/fd"));
    let Ok(entries) = fs::read_dir(&fd_dir) else {
        return Vec::new();
    };
    entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| fs::read_link(entry.path()).ok())
        .collect()
}

fn is_file_open_by(pid: u32, path: &Path) -> bool {
    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    open_files(pid).iter().any(|open| open == &target)
}

/// Wait until process `pid` has created `path` and closed it again.
///
/// Returns once the file exists and is not held open by the process.
/// Fails with [`ProcessError::ProcessExited`] if the process is gone and the
/// file was never created, and with [`ProcessError::FileTimeout`] when the
/// polling budget runs out.
pub fn wait_for_file_created_by_process(
    pid: u32,
    path: &Path,
    polling: &Polling,
) -> Result<(), ProcessError> {
    info!(
        event = "core.process.file_wait_started",
        pid = pid,
        path = %path.display(),
        timeout_ms = polling.timeout_ms()
    );

    let found = poll_until(polling, |attempt| {
        let running = is_process_running(pid);

        if !path.is_file() {
            if !running {
                warn!(
                    event = "core.process.file_wait_failed",
                    pid = pid,
                    path = %path.display(),
                    reason = "process_exited"
                );
                return Err(ProcessError::ProcessExited {
                    pid,
                    path: path.to_path_buf(),
                });
            }
            debug!(
                event = "core.process.file_wait_retry",
                attempt = attempt,
                reason = "not_created"
            );
            return Ok(None);
        }

        if running && is_file_open_by(pid, path) {
            debug!(
                event = "core.process.file_wait_retry",
                attempt = attempt,
                reason = "still_open"
            );
            return Ok(None);
        }

        Ok(Some(()))
    })?;

    match found {
        Some(()) => {
            info!(
                event = "core.process.file_wait_completed",
                pid = pid,
                path = %path.display()
            );
            Ok(())
        }
        None => {
            warn!(
                event = "core.process.file_wait_timeout",
                pid = pid,
                path = %path.display(),
                timeout_ms = polling.timeout_ms()
            );
            Err(ProcessError::FileTimeout {
                pid,
                path: path.to_path_buf(),
                timeout_ms: polling.timeout_ms(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::{Command, Stdio};
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    fn spawn_sleep(seconds: &str) -> std::process::Child {
        Command::new("sleep")
            .arg(seconds)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("Failed to spawn test process")
    }

    #[test]
    fn test_is_process_running_with_invalid_pid() {
        assert!(!is_process_running(999999));
    }

    #[test]
    fn test_is_process_running_lifecycle() {
        let mut child = spawn_sleep("10");
        let pid = child.id();
        assert!(is_process_running(pid));

        let _ = child.kill();
        let _ = child.wait();
        assert!(!is_process_running(pid));
    }

    #[test]
    fn test_open_files_of_missing_process() {
        assert!(open_files(999999).is_empty());
    }

    #[test]
    fn test_existing_closed_file_returns_immediately() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("plot.pdf");
        fs::write(&output, b"%PDF").unwrap();
        let mut child = spawn_sleep("10");

        let start = Instant::now();
        let result =
            wait_for_file_created_by_process(child.id(), &output, &Polling::from_millis(2000, 50));

        let _ = child.kill();
        let _ = child.wait();
        assert!(result.is_ok());
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_waits_until_file_is_closed() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("erc.rpt");
        let script = format!("exec 3>'{}'; sleep 0.3", output.display());

        let start = Instant::now();
        let mut child = Command::new("sh")
            .args(["-c", &script])
            .spawn()
            .expect("spawn writer");

        let result =
            wait_for_file_created_by_process(child.id(), &output, &Polling::from_millis(5000, 50));
        let elapsed = start.elapsed();

        let _ = child.wait();
        assert!(result.is_ok(), "unexpected {result:?}");
        assert!(elapsed >= Duration::from_millis(300), "elapsed {elapsed:?}");
    }

    #[test]
    fn test_process_exited_without_file() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("never.pdf");
        let mut child = Command::new("true").spawn().expect("spawn true");
        let pid = child.id();
        child.wait().unwrap();

        let result = wait_for_file_created_by_process(pid, &output, &Polling::from_millis(1000, 50));
        assert!(matches!(result, Err(ProcessError::ProcessExited { .. })));
    }

    #[test]
    fn test_file_timeout() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("slow.pdf");
        let mut child = spawn_sleep("10");

        let result =
            wait_for_file_created_by_process(child.id(), &output, &Polling::from_millis(200, 50));

        let _ = child.kill();
        let _ = child.wait();
        match result {
            Err(ProcessError::FileTimeout { timeout_ms, .. }) => assert_eq!(timeout_ms, 200),
            other => panic!("expected FileTimeout, got {other:?}"),
        }
    }
}
