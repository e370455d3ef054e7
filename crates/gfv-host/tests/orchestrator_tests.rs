// SPDX-License-Identifier: MIT OR Apache-2.0
//! Orchestrator tests against real `sh` children.
#![cfg(unix)]

use gfv_config::GfvConfig;
use gfv_core::{ErrorCode, GfvError, PayloadTransport, RunStatus};
use gfv_host::{CancelToken, MemoryHost, Orchestrator, PreSaveReport, Region};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn config(format: &str, lint: &str) -> GfvConfig {
    let mut cfg = GfvConfig {
        posix_shell: Some("sh".into()),
        ..GfvConfig::default()
    };
    cfg.format.command = Some(vec![format.into()]);
    cfg.lint.tool.command = Some(vec![lint.into()]);
    cfg.lint.tool.use_shell = Some(true);
    cfg
}

fn orchestrator(format: &str, lint: &str) -> Orchestrator {
    Orchestrator::new(config(format, lint)).unwrap()
}

// ---------------------------------------------------------------------------
// Format
// ---------------------------------------------------------------------------

#[tokio::test]
async fn format_replaces_whole_document() {
    let mut host = MemoryHost::new("package main\n");
    let outcome = orchestrator("tr a-z A-Z", "true")
        .format_document(&mut host)
        .await
        .unwrap();
    assert!(outcome.changed);
    assert_eq!(host.text, "PACKAGE MAIN\n");
    assert_eq!(host.replacements, 1);
    assert!(host.statuses.is_empty());
}

#[tokio::test]
async fn format_only_touches_selection() {
    let mut host = MemoryHost::new("keep fix keep").with_selection(Region::new(5, 8));
    orchestrator("tr a-z A-Z", "true")
        .format_document(&mut host)
        .await
        .unwrap();
    assert_eq!(host.text, "keep FIX keep");
}

#[tokio::test]
async fn empty_selection_formats_everything() {
    let mut host = MemoryHost::new("abc").with_selection(Region::new(1, 1));
    orchestrator("tr a-z A-Z", "true")
        .format_document(&mut host)
        .await
        .unwrap();
    assert_eq!(host.text, "ABC");
}

#[tokio::test]
async fn unchanged_output_is_not_written_back() {
    let mut host = MemoryHost::new("package main\n");
    let outcome = orchestrator("cat", "true")
        .format_document(&mut host)
        .await
        .unwrap();
    assert!(!outcome.changed);
    assert_eq!(host.replacements, 0);
}

#[tokio::test]
async fn formatting_twice_is_idempotent() {
    let orch = orchestrator("tr -s ' '", "true");
    let mut host = MemoryHost::new("package   main\n");
    orch.format_document(&mut host).await.unwrap();
    let once = host.text.clone();
    let second = orch.format_document(&mut host).await.unwrap();
    assert_eq!(host.text, once);
    assert!(!second.changed);
}

#[tokio::test]
async fn tool_failure_keeps_buffer_and_reports_stderr() {
    let mut host = MemoryHost::new("package main\nfunc {");
    let outcome = orchestrator("echo 'syntax error: line 2' >&2; exit 2", "true")
        .format_document(&mut host)
        .await;
    assert!(outcome.is_none());
    assert_eq!(host.text, "package main\nfunc {");
    assert_eq!(host.replacements, 0);
    assert_eq!(host.statuses, ["gofmt: syntax error: line 2"]);
}

#[tokio::test]
async fn missing_formatter_is_reported() {
    let mut cfg = config("true", "true");
    cfg.format.command = Some(vec!["/nonexistent/gofmt".into()]);
    cfg.format.use_shell = Some(false);
    let mut host = MemoryHost::new("package main");
    let err = Orchestrator::new(cfg)
        .unwrap()
        .try_format(&mut host, &CancelToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::LaunchFailed);
    assert_eq!(host.text, "package main");
}

#[tokio::test]
async fn slow_formatter_times_out_without_touching_buffer() {
    let mut cfg = config("sleep 5", "true");
    cfg.format.timeout_ms = Some(100);
    let mut host = MemoryHost::new("package main");
    let err = Orchestrator::new(cfg)
        .unwrap()
        .try_format(&mut host, &CancelToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, GfvError::TimedOut { .. }));
    assert!(err.is_retryable());
    assert_eq!(host.text, "package main");
}

#[tokio::test]
async fn cancelled_format_is_killed() {
    let orch = orchestrator("sleep 5", "true");
    let cancel = CancelToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });
    let mut host = MemoryHost::new("x");
    let err = orch.try_format(&mut host, &cancel).await.unwrap_err();
    assert!(matches!(err, GfvError::Killed { .. }));
}

#[tokio::test]
async fn latin1_payload_round_trips() {
    let mut cfg = config("cat", "true");
    cfg.encoding = Some(gfv_core::TextEncoding::Latin1);
    let mut host = MemoryHost::new("café");
    let outcome = Orchestrator::new(cfg)
        .unwrap()
        .format_document(&mut host)
        .await
        .unwrap();
    assert!(!outcome.changed);
    assert_eq!(host.text, "café");
}

#[tokio::test]
async fn unencodable_payload_never_spawns() {
    let mut cfg = config("cat", "true");
    cfg.encoding = Some(gfv_core::TextEncoding::Latin1);
    let mut host = MemoryHost::new("a → b");
    let err = Orchestrator::new(cfg)
        .unwrap()
        .try_format(&mut host, &CancelToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::EncodeError);
}

// ---------------------------------------------------------------------------
// Lint
// ---------------------------------------------------------------------------

#[tokio::test]
async fn lint_shows_stderr_popup_with_default_size() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("main.go");
    let mut host = MemoryHost::new("package main").with_path(&file);
    let diag = orchestrator("cat", "echo 'main.go:3: unreachable code' >&2; exit 1")
        .lint_document(&mut host)
        .await
        .unwrap();
    assert_eq!(diag.status, RunStatus::NonZeroExit(1));
    assert_eq!(host.popups.len(), 1);
    assert_eq!(host.popups[0].text, "main.go:3: unreachable code\n");
    assert_eq!((host.popups[0].max_width, host.popups[0].max_height), (640, 200));
}

#[tokio::test]
async fn lint_runs_in_file_directory_with_path_on_stdin() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    let file = root.join("main.go");
    let mut host = MemoryHost::new("").with_path(&file);
    let diag = orchestrator("cat", "pwd -P >&2; cat >&2")
        .try_lint(&mut host, &CancelToken::new())
        .await
        .unwrap();
    assert_eq!(
        diag.text,
        format!("{}\n{}", root.display(), file.display())
    );
}

#[tokio::test]
async fn lint_argument_transport_appends_path() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("it's.go");
    let mut cfg = config("cat", "printf '%s' >&2");
    cfg.lint.tool.transport = Some(PayloadTransport::Argument);
    let mut host = MemoryHost::new("").with_path(&file);
    let diag = Orchestrator::new(cfg)
        .unwrap()
        .try_lint(&mut host, &CancelToken::new())
        .await
        .unwrap();
    assert!(diag.text.ends_with("it's.go"), "{}", diag.text);
}

#[tokio::test]
async fn clean_lint_posts_status_instead_of_popup() {
    let dir = tempfile::tempdir().unwrap();
    let mut host = MemoryHost::new("").with_path(dir.path().join("main.go"));
    orchestrator("cat", "exit 0")
        .lint_document(&mut host)
        .await
        .unwrap();
    assert!(host.popups.is_empty());
    assert_eq!(host.statuses, ["go vet: no issues found"]);
}

#[tokio::test]
async fn show_empty_forces_popup() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config("cat", "exit 0");
    cfg.lint.show_empty = Some(true);
    let mut host = MemoryHost::new("").with_path(dir.path().join("main.go"));
    Orchestrator::new(cfg)
        .unwrap()
        .lint_document(&mut host)
        .await
        .unwrap();
    assert_eq!(host.popups.len(), 1);
    assert_eq!(host.popups[0].text, "");
}

// ---------------------------------------------------------------------------
// Pre-save hook
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pre_save_formats_then_lints_go_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config("tr a-z A-Z", "echo vetted >&2");
    cfg.format_on_save = Some(true);
    cfg.lint_on_save = Some(true);
    let mut host = MemoryHost::new("package main").with_path(dir.path().join("main.go"));
    let report = Orchestrator::new(cfg)
        .unwrap()
        .on_pre_save(&mut host)
        .await;
    assert_eq!(
        report,
        PreSaveReport {
            formatted: true,
            linted: true
        }
    );
    assert_eq!(host.text, "PACKAGE MAIN");
    assert_eq!(host.popups[0].text, "vetted\n");
}
