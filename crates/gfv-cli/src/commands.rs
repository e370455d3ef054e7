// SPDX-License-Identifier: MIT OR Apache-2.0
//! Subcommand implementations.
//!
//! These are library-level so they can be tested without spawning the
//! binary. Each returns a [`Verdict`]; `main` maps it to the exit code.

use crate::FileHost;
use anyhow::{Context, Result};
use gfv_config::{ConfigWarning, GfvConfig, validate_config};
use gfv_core::{CommandSpec, PayloadTransport, Platform};
use gfv_host::{CancelToken, Orchestrator, ToolKind, is_go_file};
use gfv_shell::{EnvSnapshot, ShellResolver};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Outcome of a subcommand that completed without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Nothing to report.
    Clean,
    /// `--check` found a file that would change, or the linter found issues.
    Findings,
}

impl Verdict {
    /// Process exit code.
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Clean => 0,
            Self::Findings => 1,
        }
    }
}

/// What `fmt` does with the formatted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FmtMode {
    /// Print it to stdout.
    #[default]
    Print,
    /// Rewrite the file in place.
    Write,
    /// Report whether the file would change.
    Check,
}

/// `gfv fmt`.
pub async fn cmd_fmt(
    orch: &Orchestrator,
    path: &Path,
    mode: FmtMode,
    out: &mut dyn Write,
) -> Result<Verdict> {
    let mut host = FileHost::open(path, orch.config().encoding())?;
    let outcome = orch
        .try_format(&mut host, &CancelToken::new())
        .await
        .with_context(|| format!("format '{}'", path.display()))?;

    match mode {
        FmtMode::Print => {
            out.write_all(host.text().as_bytes())?;
            Ok(Verdict::Clean)
        }
        FmtMode::Write => {
            if outcome.changed {
                host.save()?;
                info!(target: "gfv.cli", path = %path.display(), "rewrote file");
            }
            Ok(Verdict::Clean)
        }
        FmtMode::Check => {
            if outcome.changed {
                writeln!(out, "{}", path.display())?;
                Ok(Verdict::Findings)
            } else {
                Ok(Verdict::Clean)
            }
        }
    }
}

/// `gfv vet`.
pub async fn cmd_vet(orch: &Orchestrator, path: &Path, out: &mut dyn Write) -> Result<Verdict> {
    let mut host = FileHost::open(path, orch.config().encoding())?;
    let diagnostic = orch
        .try_lint(&mut host, &CancelToken::new())
        .await
        .with_context(|| format!("lint '{}'", path.display()))?;
    if diagnostic.is_empty() {
        return Ok(Verdict::Clean);
    }
    out.write_all(diagnostic.text.as_bytes())?;
    if !diagnostic.text.ends_with('\n') {
        writeln!(out)?;
    }
    Ok(Verdict::Findings)
}

/// `gfv save`: run the pre-save hook, then write the file if it changed.
///
/// Lint output goes to `out`, status messages to stderr. Findings means the
/// linter reported something or an enabled step failed.
pub async fn cmd_save(orch: &Orchestrator, path: &Path, out: &mut dyn Write) -> Result<Verdict> {
    if !is_go_file(path) {
        info!(target: "gfv.cli", path = %path.display(), "not a Go file; nothing to do");
        return Ok(Verdict::Clean);
    }
    let mut host = FileHost::open(path, orch.config().encoding())?;
    let report = orch.on_pre_save(&mut host).await;
    if host.is_dirty() {
        host.save()?;
    }
    for status in host.statuses() {
        eprintln!("{status}");
    }
    for popup in host.popups() {
        out.write_all(popup.as_bytes())?;
    }

    let config = orch.config();
    let failed = (config.format_on_save() && !report.formatted)
        || (config.lint_on_save() && !report.linted);
    let diagnostics = host.popups().iter().any(|p| !p.trim().is_empty());
    Ok(if failed || diagnostics {
        Verdict::Findings
    } else {
        Verdict::Clean
    })
}

/// Options for `gfv plan`.
#[derive(Debug, Clone, Default)]
pub struct PlanRequest {
    /// Argument vector; empty means the configured command for `tool`.
    pub argv: Vec<String>,
    /// Tool whose configured command is used when `argv` is empty.
    pub tool: Option<ToolKind>,
    /// OS to resolve for instead of the running one.
    pub os: Option<String>,
    /// Launch without the platform shell.
    pub no_shell: bool,
    /// Payload appended to argv (argument transport).
    pub payload: Option<String>,
    /// Include the child environment in the output.
    pub show_env: bool,
}

/// `gfv plan`: the resolved [`InvocationPlan`](gfv_core::InvocationPlan) as
/// pretty JSON.
pub fn plan_json(config: &GfvConfig, req: &PlanRequest) -> Result<String> {
    let platform = match &req.os {
        Some(os) => Platform::from_os(os)?,
        None => Platform::current()?,
    };
    let mut spec = if req.argv.is_empty() {
        let tool = req.tool.unwrap_or(ToolKind::Format);
        let section = match tool {
            ToolKind::Format => &config.format,
            ToolKind::Lint => &config.lint.tool,
        };
        section.command_spec(tool.section(), platform)?
    } else {
        CommandSpec::from_argv(req.argv.iter().cloned())
    };
    if req.no_shell {
        spec = spec.use_shell(false);
    }
    if req.payload.is_some() {
        spec = spec.transport(PayloadTransport::Argument);
    }

    let resolver = ShellResolver::with_posix_shell(config.posix_shell());
    let env = if req.show_env {
        EnvSnapshot::capture()
    } else {
        EnvSnapshot::empty()
    };
    let plan = resolver.resolve_with_payload(&spec, req.payload.as_deref(), platform, &env)?;
    let mut value = serde_json::to_value(&plan)?;
    if !req.show_env {
        if let Some(obj) = value.as_object_mut() {
            obj.remove("env");
        }
    }
    serde_json::to_string_pretty(&value).context("serialize plan")
}

/// `gfv config`: the effective configuration plus validation warnings.
pub fn config_report(config: &GfvConfig, json: bool) -> Result<(String, Vec<ConfigWarning>)> {
    let warnings = validate_config(config)?;
    let text = if json {
        serde_json::to_string_pretty(config).context("serialize config")?
    } else {
        toml::to_string_pretty(config).context("serialize config")?
    };
    Ok((text, warnings))
}
