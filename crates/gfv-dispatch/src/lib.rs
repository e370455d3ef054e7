// SPDX-License-Identifier: MIT OR Apache-2.0
//! gfv-dispatch
#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! Turns a [`RunResult`] into what the editor should do with it.
//!
//! * Format mode ([`Dispatcher::apply`]): stdout of a successful run becomes
//!   the replacement text; anything else is an error and the original text
//!   stays as it was.
//! * Lint mode ([`Dispatcher::summarize`]): stderr becomes a [`Diagnostic`]
//!   whatever the exit status, because vet-style tools report findings on
//!   stderr and exit non-zero when they find any.

use gfv_core::{Diagnostic, GfvError, RunResult, RunStatus, TextEncoding};
use std::borrow::Cow;
use tracing::debug;

/// Replacement text produced by a successful format run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// Decoded standard output.
    pub text: String,
    /// `false` when the tool returned the input unchanged.
    pub changed: bool,
}

/// Decodes and interprets captured tool output.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    encoding: TextEncoding,
    tool: String,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(TextEncoding::default())
    }
}

impl Dispatcher {
    /// Dispatcher for `encoding`.
    pub fn new(encoding: TextEncoding) -> Self {
        Self {
            encoding,
            tool: "tool".into(),
        }
    }

    /// Name the tool in error messages.
    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = tool.into();
        self
    }

    /// Configured encoding.
    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Encode document text for the tool's stdin.
    pub fn encode_payload(&self, text: &str) -> Result<Vec<u8>, GfvError> {
        self.encoding.encode(text)
    }

    /// Format mode: the replacement for `original`, or why there is none.
    pub fn apply(&self, result: &RunResult, original: &str) -> Result<Replacement, GfvError> {
        match &result.status {
            RunStatus::Success => {
                let text = self.encoding.decode(&result.stdout)?;
                let changed = text != original;
                debug!(target: "gfv.dispatch", tool = %self.tool, changed, "format output accepted");
                Ok(Replacement { text, changed })
            }
            RunStatus::NonZeroExit(code) => Err(GfvError::ToolFailed {
                code: *code,
                stderr: self.stderr_text(&result.stderr),
            }),
            other => Err(GfvError::from_status(&self.tool, other).unwrap_or_else(|| {
                GfvError::IoFailed {
                    program: self.tool.clone(),
                    reason: other.to_string(),
                }
            })),
        }
    }

    /// Format mode, never destructive: the text to keep in the buffer plus
    /// the error, if any. On failure the text is `original`, untouched.
    pub fn apply_or_keep<'a>(
        &self,
        result: &RunResult,
        original: &'a str,
    ) -> (Cow<'a, str>, Option<GfvError>) {
        match self.apply(result, original) {
            Ok(r) => (Cow::Owned(r.text), None),
            Err(e) => (Cow::Borrowed(original), Some(e)),
        }
    }

    /// Lint mode: stderr as a diagnostic, whatever the exit status.
    pub fn summarize(&self, result: &RunResult) -> Diagnostic {
        Diagnostic {
            text: self.encoding.decode_lossy(&result.stderr),
            status: result.status.clone(),
        }
    }

    fn stderr_text(&self, stderr: &[u8]) -> String {
        self.encoding
            .decode(stderr)
            .unwrap_or_else(|_| format!("<stderr is not valid {}>", self.encoding))
    }
}
