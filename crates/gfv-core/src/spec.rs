// SPDX-License-Identifier: MIT OR Apache-2.0
//! Declarative tool invocation descriptions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// How the invocation payload reaches the external tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PayloadTransport {
    /// Payload is written to standard input, which is then closed.
    #[default]
    Stdin,
    /// Payload is appended as the final command-line argument.
    Argument,
    /// No payload is delivered; standard input is closed immediately.
    None,
}

/// Immutable description of one external tool invocation.
///
/// Construct with [`CommandSpec::new`] and the consuming builder methods.
/// Nothing downstream mutates a spec: the shell resolver borrows it and
/// produces a fresh plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    argv: Vec<String>,
    cwd: Option<PathBuf>,
    env: BTreeMap<String, String>,
    inherit_env: bool,
    transport: PayloadTransport,
    use_shell: bool,
}

impl CommandSpec {
    /// Create a spec for `program` with no arguments, stdin transport, and
    /// shell wrapping enabled.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            argv: vec![program.into()],
            cwd: None,
            env: BTreeMap::new(),
            inherit_env: true,
            transport: PayloadTransport::Stdin,
            use_shell: true,
        }
    }

    /// Create a spec from a full argument vector (program first).
    ///
    /// An empty vector is accepted here and rejected at resolution time.
    pub fn from_argv<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            ..Self::new("")
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.argv.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.argv.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Override one environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Choose whether the process-wide environment is inherited.
    pub fn inherit_env(mut self, inherit: bool) -> Self {
        self.inherit_env = inherit;
        self
    }

    /// Choose how the payload is delivered.
    pub fn transport(mut self, transport: PayloadTransport) -> Self {
        self.transport = transport;
        self
    }

    /// Choose whether the platform shell layer wraps the command.
    pub fn use_shell(mut self, use_shell: bool) -> Self {
        self.use_shell = use_shell;
        self
    }

    /// Full argument vector, program first.
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Program name, if the argv is non-empty.
    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    /// Working directory override.
    pub fn working_dir(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Environment overrides.
    pub fn env_overrides(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Whether the process-wide environment is inherited.
    pub fn inherits_env(&self) -> bool {
        self.inherit_env
    }

    /// Payload transport.
    pub fn payload_transport(&self) -> PayloadTransport {
        self.transport
    }

    /// Whether the command expects its payload on standard input.
    pub fn expects_stdin(&self) -> bool {
        self.transport == PayloadTransport::Stdin
    }

    /// Whether the shell layer wraps the command.
    pub fn wants_shell(&self) -> bool {
        self.use_shell
    }
}
