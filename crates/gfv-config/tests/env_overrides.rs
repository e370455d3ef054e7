// SPDX-License-Identifier: MIT OR Apache-2.0
//! `GFV_*` environment override tests. Environment variables are
//! process-global, so every test here is `#[serial]`.

use gfv_config::{ConfigError, GfvConfig, apply_env_overrides, load_config};
use gfv_core::TextEncoding;
use serial_test::serial;
use std::io::Write;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Sets variables for the lifetime of the guard and removes them on drop.
struct EnvGuard {
    keys: Vec<&'static str>,
}

impl EnvGuard {
    fn new(pairs: &[(&'static str, &str)]) -> Self {
        let keys = pairs.iter().map(|(k, _)| *k).collect();
        for (k, v) in pairs {
            // SAFETY: tests in this file run serially.
            unsafe { std::env::set_var(k, v) };
        }
        Self { keys }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for k in &self.keys {
            // SAFETY: tests in this file run serially.
            unsafe { std::env::remove_var(k) };
        }
    }
}

// ---------------------------------------------------------------------------
// Overrides
// ---------------------------------------------------------------------------

#[test]
#[serial]
fn no_variables_leaves_defaults() {
    let cfg = load_config(None).unwrap();
    assert_eq!(cfg, GfvConfig::default());
}

#[test]
#[serial]
fn every_variable_applies() {
    let _env = EnvGuard::new(&[
        ("GFV_LOG_LEVEL", "trace"),
        ("GFV_ENCODING", "latin1"),
        ("GFV_POSIX_SHELL", "sh"),
        ("GFV_FORMAT_TIMEOUT_MS", "250"),
        ("GFV_LINT_TIMEOUT_MS", "750"),
        ("GFV_FORMAT_ON_SAVE", "yes"),
    ]);
    let cfg = load_config(None).unwrap();
    assert_eq!(cfg.log_level.as_deref(), Some("trace"));
    assert_eq!(cfg.encoding(), TextEncoding::Latin1);
    assert_eq!(cfg.posix_shell(), "sh");
    assert_eq!(cfg.format.timeout_ms, Some(250));
    assert_eq!(cfg.lint.tool.timeout_ms, Some(750));
    assert!(cfg.format_on_save());
}

#[test]
#[serial]
fn env_beats_file() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(f, "posix_shell = \"zsh\"\n[format]\ntimeout_ms = 9000").unwrap();
    let _env = EnvGuard::new(&[("GFV_FORMAT_TIMEOUT_MS", "100")]);
    let cfg = load_config(Some(f.path())).unwrap();
    assert_eq!(cfg.posix_shell(), "zsh");
    assert_eq!(cfg.format.timeout_ms, Some(100));
}

#[test]
#[serial]
fn flag_accepts_common_spellings() {
    for (value, expected) in [("1", true), ("TRUE", true), ("off", false), ("no", false)] {
        let _env = EnvGuard::new(&[("GFV_FORMAT_ON_SAVE", value)]);
        let mut cfg = GfvConfig::default();
        apply_env_overrides(&mut cfg).unwrap();
        assert_eq!(cfg.format_on_save(), expected, "value {value}");
    }
}

// ---------------------------------------------------------------------------
// Rejections
// ---------------------------------------------------------------------------

#[test]
#[serial]
fn malformed_timeout_is_rejected() {
    let _env = EnvGuard::new(&[("GFV_FORMAT_TIMEOUT_MS", "soon")]);
    let err = load_config(None).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnv { ref var, .. } if var == "GFV_FORMAT_TIMEOUT_MS"));
}

#[test]
#[serial]
fn unknown_encoding_is_rejected() {
    let _env = EnvGuard::new(&[("GFV_ENCODING", "utf-16")]);
    let err = load_config(None).unwrap_err();
    assert!(err.to_string().contains("GFV_ENCODING"));
}

#[test]
#[serial]
fn bad_flag_is_rejected() {
    let _env = EnvGuard::new(&[("GFV_FORMAT_ON_SAVE", "maybe")]);
    let mut cfg = GfvConfig::default();
    assert!(apply_env_overrides(&mut cfg).is_err());
}
