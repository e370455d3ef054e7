// SPDX-License-Identifier: MIT OR Apache-2.0
//! Format and lint commands, end to end.

use crate::{EditorHost, Region, ToolKind, is_go_file};
use gfv_config::GfvConfig;
use gfv_core::{
    CommandSpec, Diagnostic, GfvError, InvocationPlan, PayloadTransport, Platform, RunResult,
};
use gfv_dispatch::Dispatcher;
use gfv_runner::{CancelToken, ProcessRunner};
use gfv_shell::{EnvSnapshot, ShellResolver};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What a successful format run did to the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOutcome {
    /// The region that was sent to the formatter.
    pub region: Region,
    /// Whether the region was replaced.
    pub changed: bool,
}

/// What the pre-save hook ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreSaveReport {
    /// The formatter ran and succeeded.
    pub formatted: bool,
    /// The linter ran and succeeded.
    pub linted: bool,
}

/// Wires config, resolver, runner, and dispatcher to an [`EditorHost`].
///
/// The `*_document` entry points never fail: every error becomes a status
/// message on the host. The `try_*` forms return the error instead.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    config: GfvConfig,
    resolver: ShellResolver,
    runner: ProcessRunner,
    platform: Platform,
    env: EnvSnapshot,
}

impl Orchestrator {
    /// Orchestrator for the running OS and the current process environment.
    pub fn new(config: GfvConfig) -> Result<Self, GfvError> {
        Ok(Self::for_platform(
            config,
            Platform::current()?,
            EnvSnapshot::capture(),
        ))
    }

    /// Orchestrator for an explicit platform and environment.
    pub fn for_platform(config: GfvConfig, platform: Platform, env: EnvSnapshot) -> Self {
        let resolver = ShellResolver::with_posix_shell(config.posix_shell());
        Self {
            config,
            resolver,
            runner: ProcessRunner::new(),
            platform,
            env,
        }
    }

    /// Replace the process runner.
    pub fn with_runner(mut self, runner: ProcessRunner) -> Self {
        self.runner = runner;
        self
    }

    /// Effective configuration.
    pub fn config(&self) -> &GfvConfig {
        &self.config
    }

    /// The command spec configured for `kind`.
    pub fn command_spec(&self, kind: ToolKind) -> Result<CommandSpec, GfvError> {
        let tool = match kind {
            ToolKind::Format => &self.config.format,
            ToolKind::Lint => &self.config.lint.tool,
        };
        tool.command_spec(kind.section(), self.platform)
            .map_err(|e| GfvError::Config(e.to_string()))
    }

    /// The plan `kind` would run with, for inspection.
    pub fn plan(
        &self,
        kind: ToolKind,
        payload: Option<&str>,
        cwd: Option<&Path>,
    ) -> Result<InvocationPlan, GfvError> {
        let mut spec = self.command_spec(kind)?;
        if let Some(dir) = cwd {
            spec = spec.cwd(dir);
        }
        self.resolver
            .resolve_with_payload(&spec, payload, self.platform, &self.env)
    }

    // -----------------------------------------------------------------------
    // Format
    // -----------------------------------------------------------------------

    /// Format the selection (or the whole document) and replace it when the
    /// formatter changed it. On failure the document is left untouched.
    pub async fn try_format<H: EditorHost + ?Sized>(
        &self,
        host: &mut H,
        cancel: &CancelToken,
    ) -> Result<FormatOutcome, GfvError> {
        let text = host.document_text();
        let region = host
            .selection()
            .filter(|r| !r.is_empty() && r.slice(&text).is_some())
            .unwrap_or_else(|| Region::whole(&text));
        let payload = region.slice(&text).unwrap_or(&text);

        let spec = self.command_spec(ToolKind::Format)?;
        let (result, dispatcher) = self.invoke(ToolKind::Format, &spec, payload, cancel).await?;
        let replacement = dispatcher.apply(&result, payload)?;

        if replacement.changed {
            host.replace_region(region, &replacement.text);
        }
        info!(
            target: "gfv.host",
            invocation = %result.invocation_id,
            changed = replacement.changed,
            bytes = region.len(),
            "format finished"
        );
        Ok(FormatOutcome {
            region,
            changed: replacement.changed,
        })
    }

    /// [`try_format`](Self::try_format), reporting errors as a status
    /// message.
    pub async fn format_document<H: EditorHost + ?Sized>(
        &self,
        host: &mut H,
    ) -> Option<FormatOutcome> {
        match self.try_format(host, &CancelToken::new()).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                report(host, ToolKind::Format, &e);
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Lint
    // -----------------------------------------------------------------------

    /// Run the linter in the document's directory and return its stderr.
    pub async fn try_lint<H: EditorHost + ?Sized>(
        &self,
        host: &mut H,
        cancel: &CancelToken,
    ) -> Result<Diagnostic, GfvError> {
        let path = host.document_path().ok_or(GfvError::NoFilePath)?;
        let path = std::path::absolute(&path).unwrap_or(path);
        let payload = path.to_string_lossy().into_owned();

        let mut spec = self.command_spec(ToolKind::Lint)?;
        if let Some(dir) = lint_dir(&path) {
            spec = spec.cwd(dir);
        }
        let (result, dispatcher) = self.invoke(ToolKind::Lint, &spec, &payload, cancel).await?;
        if let Some(e) = GfvError::from_status(spec.program().unwrap_or_default(), &result.status)
        {
            return Err(e);
        }
        let diagnostic = dispatcher.summarize(&result);
        info!(
            target: "gfv.host",
            invocation = %result.invocation_id,
            status = %diagnostic.status,
            empty = diagnostic.is_empty(),
            "lint finished"
        );
        Ok(diagnostic)
    }

    /// [`try_lint`](Self::try_lint), showing the diagnostic in a popup (or a
    /// status message when there is nothing to show) and reporting errors as
    /// a status message.
    pub async fn lint_document<H: EditorHost + ?Sized>(&self, host: &mut H) -> Option<Diagnostic> {
        match self.try_lint(host, &CancelToken::new()).await {
            Ok(diagnostic) => {
                if !diagnostic.is_empty() || self.config.lint.show_empty() {
                    let (w, h) = self.config.lint.popup_size();
                    host.show_transient_message(&diagnostic.text, w, h);
                } else {
                    host.status_message(&format!("{}: no issues found", ToolKind::Lint));
                }
                Some(diagnostic)
            }
            Err(e) => {
                report(host, ToolKind::Lint, &e);
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Pre-save hook. Runs format then lint on Go files, each only when its
    /// `*_on_save` flag is set.
    pub async fn on_pre_save<H: EditorHost + ?Sized>(&self, host: &mut H) -> PreSaveReport {
        let mut report = PreSaveReport::default();
        let is_go = host.document_path().is_some_and(|p| is_go_file(&p));
        if !is_go {
            return report;
        }
        if self.config.format_on_save() {
            report.formatted = self.format_document(host).await.is_some();
        }
        if self.config.lint_on_save() {
            report.linted = self.lint_document(host).await.is_some();
        }
        report
    }

    async fn invoke(
        &self,
        kind: ToolKind,
        spec: &CommandSpec,
        payload: &str,
        cancel: &CancelToken,
    ) -> Result<(RunResult, Dispatcher), GfvError> {
        let dispatcher = Dispatcher::new(self.config.encoding())
            .with_tool(spec.program().unwrap_or(kind.label()));
        let input = match spec.payload_transport() {
            PayloadTransport::Stdin => dispatcher.encode_payload(payload)?,
            PayloadTransport::Argument | PayloadTransport::None => Vec::new(),
        };
        let plan = self
            .resolver
            .resolve_with_payload(spec, Some(payload), self.platform, &self.env)?;
        let timeout = match kind {
            ToolKind::Format => self.config.format.timeout(),
            ToolKind::Lint => self.config.lint.tool.timeout(),
        };
        let result = self
            .runner
            .run_with_cancel(&plan, &input, timeout, cancel)
            .await;
        Ok((result, dispatcher))
    }
}

fn lint_dir(path: &Path) -> Option<PathBuf> {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

fn report<H: EditorHost + ?Sized>(host: &mut H, kind: ToolKind, err: &GfvError) {
    warn!(target: "gfv.host", tool = %kind, code = %err.code(), error = %err, "command failed");
    host.status_message(&format!("{kind}: {err}"));
}
