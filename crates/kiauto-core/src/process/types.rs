use std::process::{Child, ExitStatus};

use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use sysinfo::Pid as SysinfoPid;

use crate::process::errors::ProcessError;

/// Platform-safe process ID wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pid(u32);

impl Pid {
    pub fn from_raw(pid: u32) -> Self {
        Self(pid)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    pub fn to_sysinfo_pid(&self) -> SysinfoPid {
        SysinfoPid::from_u32(self.0)
    }

    pub fn to_nix_pid(&self) -> nix::unistd::Pid {
        nix::unistd::Pid::from_raw(self.0 as i32)
    }
}

impl From<u32> for Pid {
    fn from(pid: u32) -> Self {
        Self(pid)
    }
}

/// The operations a supervisor needs from a child process.
///
/// Implemented for [`std::process::Child`]; tests substitute handles that
/// record the call sequence.
pub trait ChildHandle {
    fn id(&self) -> u32;

    /// Close stdin, stdout and stderr if they were piped. Idempotent.
    fn close_streams(&mut self);

    /// Ask the process to exit (SIGTERM, not SIGKILL).
    fn terminate(&mut self) -> Result<(), ProcessError>;

    /// Block until the process exits and reap it.
    fn wait(&mut self) -> Result<ExitStatus, ProcessError>;

    /// Reap the process if it has already exited.
    fn try_wait(&mut self) -> Result<Option<ExitStatus>, ProcessError>;
}

impl ChildHandle for Child {
    fn id(&self) -> u32 {
        Child::id(self)
    }

    fn close_streams(&mut self) {
        drop(self.stdin.take());
        drop(self.stdout.take());
        drop(self.stderr.take());
    }

    fn terminate(&mut self) -> Result<(), ProcessError> {
        let pid = Pid::from_raw(Child::id(self));
        match signal::kill(pid.to_nix_pid(), Signal::SIGTERM) {
            // Already gone: nothing left to terminate.
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(e) => Err(ProcessError::SignalFailed {
                pid: pid.as_u32(),
                message: e.to_string(),
            }),
        }
    }

    fn wait(&mut self) -> Result<ExitStatus, ProcessError> {
        Child::wait(self).map_err(|e| ProcessError::WaitFailed {
            pid: Child::id(self),
            message: e.to_string(),
        })
    }

    fn try_wait(&mut self) -> Result<Option<ExitStatus>, ProcessError> {
        Child::try_wait(self).map_err(|e| ProcessError::WaitFailed {
            pid: Child::id(self),
            message: e.to_string(),
        })
    }
}
