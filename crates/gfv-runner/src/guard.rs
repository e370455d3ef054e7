// SPDX-License-Identifier: MIT OR Apache-2.0
//! Ownership wrapper that guarantees a child never outlives its invocation.

use std::io;
use std::process::ExitStatus;
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout};
use tracing::{debug, warn};

/// Owns a spawned child until it has been reaped.
///
/// [`ChildGuard::terminate`] is the normal teardown path. If the guard is
/// dropped without it (the invocation future was cancelled), `Drop` sends
/// SIGKILL to the process group and starts killing the child; tokio reaps it
/// in the background because the command was built with `kill_on_drop`.
pub(crate) struct ChildGuard {
    child: Child,
    pid: Option<u32>,
    group: bool,
    exited: bool,
    torn_down: bool,
}

impl ChildGuard {
    pub(crate) fn new(child: Child, group: bool) -> Self {
        let pid = child.id();
        Self {
            child,
            pid,
            group,
            exited: false,
            torn_down: false,
        }
    }

    pub(crate) fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub(crate) fn take_stdin(&mut self) -> Option<ChildStdin> {
        self.child.stdin.take()
    }

    pub(crate) fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    pub(crate) fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.child.stderr.take()
    }

    /// Wait for exit. Cancel-safe: dropping the future leaves the child
    /// running and owned by the guard.
    pub(crate) async fn wait(&mut self) -> io::Result<ExitStatus> {
        let status = self.child.wait().await?;
        self.exited = true;
        Ok(status)
    }

    /// Best-effort teardown: kill the process group (if any) and, when the
    /// child has not exited yet, kill and reap it. Failures are logged only.
    pub(crate) async fn terminate(&mut self) {
        if self.group {
            self.signal_group();
        }
        if !self.exited {
            match self.child.kill().await {
                Ok(()) => debug!(target: "gfv.runner", pid = ?self.pid, "killed child"),
                Err(e) => warn!(target: "gfv.runner", pid = ?self.pid, error = %e, "failed to kill child"),
            }
            self.exited = true;
        }
        self.torn_down = true;
    }

    #[cfg(unix)]
    fn signal_group(&self) {
        use nix::errno::Errno;
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        let Some(pgid) = self.pid.and_then(|p| i32::try_from(p).ok()) else {
            return;
        };
        match killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
            Ok(()) => debug!(target: "gfv.runner", pgid, "signalled process group"),
            Err(Errno::ESRCH) => {}
            Err(e) => warn!(target: "gfv.runner", pgid, error = %e, "failed to signal process group"),
        }
    }

    #[cfg(not(unix))]
    fn signal_group(&self) {}
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if self.torn_down {
            return;
        }
        if self.group {
            self.signal_group();
        }
        if !self.exited {
            if let Err(e) = self.child.start_kill() {
                warn!(target: "gfv.runner", pid = ?self.pid, error = %e, "failed to kill child on drop");
            } else {
                debug!(target: "gfv.runner", pid = ?self.pid, "killed child on drop");
            }
        }
    }
}
