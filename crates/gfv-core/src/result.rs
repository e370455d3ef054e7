// SPDX-License-Identifier: MIT OR Apache-2.0
//! Outcome of one process invocation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// How an invocation ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum RunStatus {
    /// Exit code zero.
    Success,
    /// The tool ran and exited with a non-zero code.
    NonZeroExit(i32),
    /// The child could not be spawned.
    LaunchFailed(String),
    /// The timeout elapsed first; the child was killed.
    TimedOut,
    /// Cancelled by the caller, or terminated by a signal.
    Killed,
    /// Feeding stdin or draining a pipe failed.
    IoFailed(String),
}

impl RunStatus {
    /// Map an exit code to `Success` or `NonZeroExit`.
    pub fn from_code(code: i32) -> Self {
        if code == 0 {
            Self::Success
        } else {
            Self::NonZeroExit(code)
        }
    }

    /// Returns `true` for [`RunStatus::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Returns `true` when the tool actually ran to completion, whatever its
    /// exit code.
    pub fn ran_to_completion(&self) -> bool {
        matches!(self, Self::Success | Self::NonZeroExit(_))
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::NonZeroExit(code) => write!(f, "exited with code {code}"),
            Self::LaunchFailed(reason) => write!(f, "launch failed: {reason}"),
            Self::TimedOut => f.write_str("timed out"),
            Self::Killed => f.write_str("killed"),
            Self::IoFailed(reason) => write!(f, "i/o failed: {reason}"),
        }
    }
}

/// Captured streams and status of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    /// Correlation id, also recorded on the tracing span.
    pub invocation_id: Uuid,
    /// Child process id, when the spawn succeeded.
    pub pid: Option<u32>,
    /// Completion status.
    pub status: RunStatus,
    /// Everything read from standard output.
    pub stdout: Vec<u8>,
    /// Everything read from standard error.
    pub stderr: Vec<u8>,
    /// Wall-clock start.
    pub started_at: DateTime<Utc>,
    /// Time from spawn to teardown.
    pub elapsed: Duration,
}

impl RunResult {
    /// A result for a child that never started.
    pub fn launch_failed(invocation_id: Uuid, reason: impl Into<String>) -> Self {
        Self {
            invocation_id,
            pid: None,
            status: RunStatus::LaunchFailed(reason.into()),
            stdout: Vec::new(),
            stderr: Vec::new(),
            started_at: Utc::now(),
            elapsed: Duration::ZERO,
        }
    }

    /// A synthetic completed result, for callers that fake the runner.
    pub fn completed(status: RunStatus, stdout: impl Into<Vec<u8>>, stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            invocation_id: Uuid::new_v4(),
            pid: None,
            status,
            stdout: stdout.into(),
            stderr: stderr.into(),
            started_at: Utc::now(),
            elapsed: Duration::ZERO,
        }
    }
}

/// Free-form lint output meant for transient display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Decoded standard-error text.
    pub text: String,
    /// Status of the run that produced it.
    pub status: RunStatus,
}

impl Diagnostic {
    /// Returns `true` when there is nothing to show.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}
