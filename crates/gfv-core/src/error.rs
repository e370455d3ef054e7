// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error taxonomy for format/lint orchestration.

use crate::RunStatus;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Machine-readable, stable error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No invocation plan exists for this OS.
    PlatformUnsupported,
    /// The command spec cannot be launched as written.
    InvalidCommand,
    /// Spawning the child failed.
    LaunchFailed,
    /// The child outlived its timeout.
    TimedOut,
    /// The child was cancelled or killed by a signal.
    Killed,
    /// Tool output is not valid in the configured encoding.
    DecodeError,
    /// The payload cannot be represented in the configured encoding.
    EncodeError,
    /// The tool exited non-zero.
    ToolFailed,
    /// A pipe read or write failed.
    IoFailed,
    /// The document has no path on disk.
    NoFilePath,
    /// Configuration could not be loaded or is invalid.
    Config,
}

impl ErrorCode {
    /// Stable string form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PlatformUnsupported => "PLATFORM_UNSUPPORTED",
            Self::InvalidCommand => "INVALID_COMMAND",
            Self::LaunchFailed => "LAUNCH_FAILED",
            Self::TimedOut => "TIMED_OUT",
            Self::Killed => "KILLED",
            Self::DecodeError => "DECODE_ERROR",
            Self::EncodeError => "ENCODE_ERROR",
            Self::ToolFailed => "TOOL_FAILED",
            Self::IoFailed => "IO_FAILED",
            Self::NoFilePath => "NO_FILE_PATH",
            Self::Config => "CONFIG",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by resolution, dispatch, and orchestration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GfvError {
    /// The shell resolver has no strategy for this OS.
    #[error("unsupported platform: {os}")]
    PlatformUnsupported {
        /// OS identifier that was rejected.
        os: String,
    },

    /// The command spec is unusable (e.g. empty argv).
    #[error("invalid command: {reason}")]
    InvalidCommand {
        /// What is wrong with it.
        reason: String,
    },

    /// The child process could not be started.
    #[error("failed to launch {program}: {reason}")]
    LaunchFailed {
        /// Program that was launched.
        program: String,
        /// OS-level reason.
        reason: String,
    },

    /// The tool did not finish in time.
    #[error("{program} timed out")]
    TimedOut {
        /// Program that was launched.
        program: String,
    },

    /// The tool was cancelled or killed.
    #[error("{program} was killed")]
    Killed {
        /// Program that was launched.
        program: String,
    },

    /// Output bytes are not valid text.
    #[error("output is not valid {encoding} (at byte {offset})")]
    Decode {
        /// Encoding label.
        encoding: &'static str,
        /// First invalid byte offset.
        offset: usize,
    },

    /// Payload text cannot be encoded.
    #[error("character {ch:?} at index {index} cannot be encoded as {encoding}")]
    Encode {
        /// Encoding label.
        encoding: &'static str,
        /// Character index in the payload.
        index: usize,
        /// Offending character.
        ch: char,
    },

    /// The tool ran and reported failure on stderr.
    #[error("{}", tool_failed_message(.code, .stderr))]
    ToolFailed {
        /// Exit code.
        code: i32,
        /// Decoded standard error.
        stderr: String,
    },

    /// A pipe operation failed.
    #[error("i/o error talking to {program}: {reason}")]
    IoFailed {
        /// Program that was launched.
        program: String,
        /// Underlying error text.
        reason: String,
    },

    /// Lint needs a file path but the document is unsaved.
    #[error("document has no file path")]
    NoFilePath,

    /// Configuration could not be loaded or validated.
    #[error("configuration error: {0}")]
    Config(String),
}

fn tool_failed_message(code: &i32, stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("tool exited with code {code}")
    } else {
        stderr.to_string()
    }
}

impl GfvError {
    /// Stable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::PlatformUnsupported { .. } => ErrorCode::PlatformUnsupported,
            Self::InvalidCommand { .. } => ErrorCode::InvalidCommand,
            Self::LaunchFailed { .. } => ErrorCode::LaunchFailed,
            Self::TimedOut { .. } => ErrorCode::TimedOut,
            Self::Killed { .. } => ErrorCode::Killed,
            Self::Decode { .. } => ErrorCode::DecodeError,
            Self::Encode { .. } => ErrorCode::EncodeError,
            Self::ToolFailed { .. } => ErrorCode::ToolFailed,
            Self::IoFailed { .. } => ErrorCode::IoFailed,
            Self::NoFilePath => ErrorCode::NoFilePath,
            Self::Config(_) => ErrorCode::Config,
        }
    }

    /// Whether re-running the same invocation could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TimedOut { .. } | Self::Killed { .. })
    }

    /// Error for a non-success status that carries no stream content.
    ///
    /// Returns `None` for `Success` and `NonZeroExit`, which callers handle
    /// with the captured streams.
    pub fn from_status(program: &str, status: &RunStatus) -> Option<Self> {
        let program = program.to_string();
        match status {
            RunStatus::Success | RunStatus::NonZeroExit(_) => None,
            RunStatus::LaunchFailed(reason) => Some(Self::LaunchFailed {
                program,
                reason: reason.clone(),
            }),
            RunStatus::TimedOut => Some(Self::TimedOut { program }),
            RunStatus::Killed => Some(Self::Killed { program }),
            RunStatus::IoFailed(reason) => Some(Self::IoFailed {
                program,
                reason: reason.clone(),
            }),
        }
    }
}
