// SPDX-License-Identifier: MIT OR Apache-2.0
//! gfv-core
#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! Shared vocabulary for the gofmt-vet orchestration crates.
//!
//! A caller describes a tool invocation with a [`CommandSpec`]; the shell
//! resolver turns it into a platform-specific [`InvocationPlan`]; the process
//! runner executes the plan and produces a [`RunResult`]; the dispatcher
//! interprets that result as replacement text or a [`Diagnostic`].

pub mod encoding;
pub mod error;
pub mod plan;
pub mod result;
pub mod spec;

pub use encoding::TextEncoding;
pub use error::{ErrorCode, GfvError};
pub use plan::{CREATE_NO_WINDOW, InvocationPlan, Platform, ShellKind};
pub use result::{Diagnostic, RunResult, RunStatus};
pub use spec::{CommandSpec, PayloadTransport};
