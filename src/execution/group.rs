//! Process-group termination.
//!
//! The executor places every child in its own process group, so killing the
//! group also takes down subshells and pipeline members it forked.

use std::io;

/// Forcefully terminate every process in a group.
pub trait GroupTerminator: Send + Sync {
    /// Kill the group whose id is `group_id`.
    fn terminate_group(&self, group_id: u32) -> io::Result<()>;
}

/// Kills with SIGKILL on Unix, `taskkill /T /F` on Windows.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalTerminator;

#[cfg(unix)]
impl GroupTerminator for SignalTerminator {
    fn terminate_group(&self, group_id: u32) -> io::Result<()> {
        let pgid = libc::pid_t::try_from(group_id)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "group id out of range"))?;
        if pgid <= 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "refusing to signal a non-positive group id",
            ));
        }

        // SAFETY: kill(2) has no memory-safety preconditions. A negative pid
        // targets the process group, which was created for this child only.
        let rc = unsafe { libc::kill(-pgid, libc::SIGKILL) };
        if rc == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }
}

#[cfg(not(unix))]
impl GroupTerminator for SignalTerminator {
    fn terminate_group(&self, group_id: u32) -> io::Result<()> {
        let status = std::process::Command::new("taskkill")
            .args(["/T", "/F", "/PID", &group_id.to_string()])
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()?;
        if status.success() {
            Ok(())
        } else {
            Err(io::Error::other(format!("taskkill exited with {status}")))
        }
    }
}
