// SPDX-License-Identifier: MIT OR Apache-2.0
//! Library half of the `gfv` binary: a file-backed editor host and the
//! subcommand implementations.
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod commands;
mod file_host;

pub use file_host::FileHost;
