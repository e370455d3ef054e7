// SPDX-License-Identifier: MIT OR Apache-2.0
//! gfv-host
#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! The editor-facing layer. An editor implements [`EditorHost`] for its
//! active document; [`Orchestrator`] runs the configured formatter or linter
//! against it and applies the result.

mod gating;
mod host;
mod memory;
mod orchestrator;

pub use gating::{ToolKind, command_enabled, is_go_file, target_path};
pub use gfv_runner::CancelToken;
pub use host::{EditorHost, Region};
pub use memory::{MemoryHost, Popup};
pub use orchestrator::{FormatOutcome, Orchestrator, PreSaveReport};
