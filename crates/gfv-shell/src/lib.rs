// SPDX-License-Identifier: MIT OR Apache-2.0
//! gfv-shell
#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! Pure mapping from a [`CommandSpec`] and a [`Platform`] to an
//! [`InvocationPlan`]. Nothing here spawns a process or reads live process
//! state: the environment arrives as an [`EnvSnapshot`] and the OS as a
//! [`Platform`] value, so every branch is testable on any host.

pub mod env;
pub mod quote;

pub use env::EnvSnapshot;

use gfv_core::{CREATE_NO_WINDOW, CommandSpec, GfvError, InvocationPlan, Platform, ShellKind};
use tracing::debug;

/// Shell used on macOS and Linux unless configured otherwise.
pub const DEFAULT_POSIX_SHELL: &str = "bash";

/// Shell used on POSIX systems that are neither macOS nor Linux.
const FALLBACK_POSIX_SHELL: &str = "/bin/sh";

/// Launcher used to find the POSIX shell through `PATH`.
const ENV_LAUNCHER: &str = "/usr/bin/env";

/// Resolves command specs into platform-specific launch plans.
#[derive(Debug, Clone)]
pub struct ShellResolver {
    posix_shell: String,
}

impl Default for ShellResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellResolver {
    /// Resolver using [`DEFAULT_POSIX_SHELL`].
    pub fn new() -> Self {
        Self {
            posix_shell: DEFAULT_POSIX_SHELL.to_string(),
        }
    }

    /// Resolver using a different shell on macOS and Linux.
    pub fn with_posix_shell(shell: impl Into<String>) -> Self {
        Self {
            posix_shell: shell.into(),
        }
    }

    /// Configured POSIX shell.
    pub fn posix_shell(&self) -> &str {
        &self.posix_shell
    }

    /// Resolve `spec` for `platform` against an environment snapshot.
    pub fn resolve(
        &self,
        spec: &CommandSpec,
        platform: Platform,
        env: &EnvSnapshot,
    ) -> Result<InvocationPlan, GfvError> {
        self.resolve_with_payload(spec, None, platform, env)
    }

    /// Resolve `spec`, appending `payload` to argv when the spec uses
    /// argument transport. For other transports `payload` is ignored here;
    /// the runner delivers it.
    pub fn resolve_with_payload(
        &self,
        spec: &CommandSpec,
        payload: Option<&str>,
        platform: Platform,
        env: &EnvSnapshot,
    ) -> Result<InvocationPlan, GfvError> {
        let argv = spec.argv();
        let Some(program) = argv.first().filter(|p| !p.trim().is_empty()) else {
            return Err(GfvError::InvalidCommand {
                reason: "command must not be empty".into(),
            });
        };

        let trailing = match (spec.payload_transport(), payload) {
            (gfv_core::PayloadTransport::Argument, Some(p)) => Some(p),
            _ => None,
        };

        let mut plan = InvocationPlan {
            program: program.clone(),
            args: Vec::new(),
            shell: None,
            creation_flags: 0,
            new_process_group: platform.is_posix(),
            verbatim_args: false,
            cwd: spec.working_dir().map(ToOwned::to_owned),
            env: env.merged_with(spec.env_overrides(), spec.inherits_env()),
            pipe_stdin: spec.expects_stdin(),
        };

        if platform == Platform::Windows {
            plan.creation_flags = CREATE_NO_WINDOW;
        }

        if spec.wants_shell() {
            let line = command_line(argv, trailing, platform);
            match platform {
                Platform::Windows => {
                    plan.program = comspec(env);
                    plan.args = vec!["/C".into(), line];
                    plan.shell = Some(ShellKind::Cmd);
                    plan.verbatim_args = true;
                }
                Platform::MacOs => {
                    plan.program = ENV_LAUNCHER.into();
                    plan.args = vec![self.posix_shell.clone(), "-l".into(), "-c".into(), line];
                    plan.shell = Some(ShellKind::Login);
                }
                Platform::Linux => {
                    plan.program = ENV_LAUNCHER.into();
                    plan.args = vec![self.posix_shell.clone(), "-c".into(), line];
                    plan.shell = Some(ShellKind::NonLogin);
                }
                Platform::OtherPosix => {
                    plan.program = FALLBACK_POSIX_SHELL.into();
                    plan.args = vec!["-c".into(), line];
                    plan.shell = Some(ShellKind::NonLogin);
                }
            }
        } else {
            plan.args = argv[1..].to_vec();
            plan.args.extend(trailing.map(str::to_string));
        }

        debug!(
            target: "gfv.shell",
            %platform,
            program = %plan.program,
            shell = ?plan.shell,
            "resolved invocation plan"
        );
        Ok(plan)
    }

    /// Resolve for the running OS with a fresh copy of the process
    /// environment.
    pub fn resolve_current(
        &self,
        spec: &CommandSpec,
        payload: Option<&str>,
    ) -> Result<InvocationPlan, GfvError> {
        let platform = Platform::current()?;
        self.resolve_with_payload(spec, payload, platform, &EnvSnapshot::capture())
    }
}

/// Build the single command-line string handed to the shell.
///
/// A one-element argv is a command template and passes through as written;
/// longer argvs are quoted element by element. A trailing payload is always
/// quoted.
fn command_line(argv: &[String], trailing: Option<&str>, platform: Platform) -> String {
    let quote_one = |s: &str| match platform {
        Platform::Windows => quote::cmd_quote(s),
        _ => quote::posix_quote(s),
    };

    let mut line = if argv.len() == 1 {
        argv[0].clone()
    } else {
        argv.iter()
            .map(|a| quote_one(a))
            .collect::<Vec<_>>()
            .join(" ")
    };
    if let Some(p) = trailing {
        line.push(' ');
        line.push_str(&quote_one(p));
    }
    line
}

fn comspec(env: &EnvSnapshot) -> String {
    env.get_ignore_case("COMSPEC")
        .filter(|v| !v.trim().is_empty())
        .map_or_else(|| "cmd.exe".to_string(), ToOwned::to_owned)
}
