// SPDX-License-Identifier: MIT OR Apache-2.0
//! Configuration loading, validation, and merging for gofmt-vet.
//!
//! [`GfvConfig`] holds the encoding, the POSIX shell, the pre-save flags, and
//! one [`ToolConfig`] per tool. Every field is optional in TOML; [`load_config`]
//! layers the file over [`GfvConfig::default()`] and then applies `GFV_*`
//! environment overrides.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use gfv_core::{CommandSpec, PayloadTransport, Platform, TextEncoding};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration loading or validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The requested configuration file was not found.
    #[error("config file not found: {path}")]
    FileNotFound {
        /// Path that was requested.
        path: String,
    },

    /// The file could not be parsed as valid TOML.
    #[error("failed to parse config: {reason}")]
    ParseError {
        /// Human-readable parse error detail.
        reason: String,
    },

    /// An environment override holds a value of the wrong shape.
    #[error("invalid value for {var}: '{value}'")]
    InvalidEnv {
        /// Variable name.
        var: String,
        /// Rejected value.
        value: String,
    },

    /// Semantic validation failed (one or more problems).
    #[error("config validation failed: {reasons:?}")]
    ValidationError {
        /// Individual validation failure messages.
        reasons: Vec<String>,
    },

    /// A tool section has no usable command.
    #[error("[{tool}] has no command")]
    MissingCommand {
        /// Section name.
        tool: String,
    },
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// Advisory-level issues that do not prevent operation but deserve attention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A tool timeout is unusually large.
    LargeTimeout {
        /// Section name.
        tool: String,
        /// Timeout in milliseconds.
        ms: u64,
    },
    /// `use_shell = false` with a single command element containing spaces;
    /// it will be executed as one program name, not split.
    UnsplitCommand {
        /// Section name.
        tool: String,
        /// The command element.
        command: String,
    },
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::LargeTimeout { tool, ms } => {
                write!(f, "[{tool}] has a large timeout ({ms}ms)")
            }
            ConfigWarning::UnsplitCommand { tool, command } => write!(
                f,
                "[{tool}] command '{command}' runs without a shell and will not be split; \
                 list arguments separately"
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct GfvConfig {
    /// Encoding of payloads and tool output (`"utf-8"` or `"latin-1"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<TextEncoding>,

    /// Log level override (e.g. `"debug"`, `"info"`, `"warn"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Shell used on POSIX platforms when a tool runs through a shell.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posix_shell: Option<String>,

    /// Format the document from the pre-save hook.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_on_save: Option<bool>,

    /// Lint the document from the pre-save hook.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lint_on_save: Option<bool>,

    /// Formatter settings.
    #[serde(default)]
    pub format: ToolConfig,

    /// Linter settings.
    #[serde(default)]
    pub lint: LintConfig,
}

impl Default for GfvConfig {
    fn default() -> Self {
        Self {
            encoding: Some(TextEncoding::Utf8),
            log_level: Some("info".into()),
            posix_shell: Some(DEFAULT_POSIX_SHELL.into()),
            format_on_save: Some(false),
            lint_on_save: Some(false),
            format: ToolConfig::with_command(["gofmt"], Some(true)),
            lint: LintConfig {
                tool: ToolConfig::with_command(["go", "vet"], None),
                popup_max_width: Some(DEFAULT_POPUP_WIDTH),
                popup_max_height: Some(DEFAULT_POPUP_HEIGHT),
                show_empty: Some(false),
            },
        }
    }
}

impl GfvConfig {
    /// Configured encoding, or UTF-8.
    pub fn encoding(&self) -> TextEncoding {
        self.encoding.unwrap_or_default()
    }

    /// Configured POSIX shell, or `bash`.
    pub fn posix_shell(&self) -> &str {
        self.posix_shell.as_deref().unwrap_or(DEFAULT_POSIX_SHELL)
    }

    /// Whether the pre-save hook formats.
    pub fn format_on_save(&self) -> bool {
        self.format_on_save.unwrap_or(false)
    }

    /// Whether the pre-save hook lints.
    pub fn lint_on_save(&self) -> bool {
        self.lint_on_save.unwrap_or(false)
    }
}

/// Settings shared by every tool section.
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct ToolConfig {
    /// Program and arguments. A single element is a shell command template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,

    /// How the payload reaches the tool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<PayloadTransport>,

    /// Run through the platform shell. Absent means the platform default:
    /// `cmd` on Windows, direct launch elsewhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_shell: Option<bool>,

    /// Timeout in milliseconds (1–86 400 000). Absent waits indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Extra environment variables for the tool.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

impl ToolConfig {
    fn with_command<const N: usize>(argv: [&str; N], use_shell: Option<bool>) -> Self {
        Self {
            command: Some(argv.iter().map(|s| (*s).to_string()).collect()),
            transport: Some(PayloadTransport::Stdin),
            use_shell,
            timeout_ms: None,
            env: BTreeMap::new(),
        }
    }

    /// Timeout as a [`Duration`].
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Whether the tool runs through the shell on `platform`.
    pub fn wants_shell(&self, platform: Platform) -> bool {
        self.use_shell.unwrap_or(platform == Platform::Windows)
    }

    /// Build the [`CommandSpec`] this section describes for `platform`.
    ///
    /// `tool` names the section in the error.
    pub fn command_spec(&self, tool: &str, platform: Platform) -> Result<CommandSpec, ConfigError> {
        let argv = match &self.command {
            Some(argv) if argv.first().is_some_and(|p| !p.trim().is_empty()) => argv,
            _ => {
                return Err(ConfigError::MissingCommand {
                    tool: tool.to_string(),
                });
            }
        };
        let spec = CommandSpec::from_argv(argv.iter().cloned())
            .transport(self.transport.unwrap_or_default())
            .use_shell(self.wants_shell(platform));
        Ok(self
            .env
            .iter()
            .fold(spec, |spec, (k, v)| spec.env(k.clone(), v.clone())))
    }
}

/// Linter settings: a [`ToolConfig`] plus how diagnostics are shown.
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct LintConfig {
    /// Command settings.
    #[serde(flatten)]
    pub tool: ToolConfig,

    /// Popup width for diagnostics, in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popup_max_width: Option<u32>,

    /// Popup height for diagnostics, in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popup_max_height: Option<u32>,

    /// Show a popup even when the linter printed nothing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_empty: Option<bool>,
}

impl LintConfig {
    /// `(width, height)` of the diagnostics popup.
    pub fn popup_size(&self) -> (u32, u32) {
        (
            self.popup_max_width.unwrap_or(DEFAULT_POPUP_WIDTH),
            self.popup_max_height.unwrap_or(DEFAULT_POPUP_HEIGHT),
        )
    }

    /// Whether an empty diagnostic still gets a popup.
    pub fn show_empty(&self) -> bool {
        self.show_empty.unwrap_or(false)
    }
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default POSIX shell.
pub const DEFAULT_POSIX_SHELL: &str = "bash";

/// Default diagnostics popup width.
pub const DEFAULT_POPUP_WIDTH: u32 = 640;

/// Default diagnostics popup height.
pub const DEFAULT_POPUP_HEIGHT: u32 = 200;

/// Maximum allowed timeout in milliseconds (24 hours).
const MAX_TIMEOUT_MS: u64 = 86_400_000;

/// Threshold above which a timeout generates a warning (5 minutes).
const LARGE_TIMEOUT_THRESHOLD_MS: u64 = 300_000;

/// Recognised log levels.
const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load a [`GfvConfig`] from an optional TOML file path.
///
/// * If `path` is `Some`, the file is parsed and merged over the defaults.
/// * If `path` is `None`, returns [`GfvConfig::default()`].
///
/// Environment variable overrides are applied on top in both cases.
pub fn load_config(path: Option<&Path>) -> Result<GfvConfig, ConfigError> {
    let mut config = match path {
        Some(p) => {
            let content = std::fs::read_to_string(p).map_err(|_| ConfigError::FileNotFound {
                path: p.display().to_string(),
            })?;
            merge_configs(GfvConfig::default(), parse_toml(&content)?)
        }
        None => GfvConfig::default(),
    };
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Parse a TOML string into a [`GfvConfig`]. Absent fields stay `None`.
pub fn parse_toml(content: &str) -> Result<GfvConfig, ConfigError> {
    toml::from_str::<GfvConfig>(content).map_err(|e| ConfigError::ParseError {
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Env overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides.
///
/// Recognised variables:
/// - `GFV_LOG_LEVEL`
/// - `GFV_ENCODING`
/// - `GFV_POSIX_SHELL`
/// - `GFV_FORMAT_TIMEOUT_MS`
/// - `GFV_LINT_TIMEOUT_MS`
/// - `GFV_FORMAT_ON_SAVE`
pub fn apply_env_overrides(config: &mut GfvConfig) -> Result<(), ConfigError> {
    if let Ok(val) = std::env::var("GFV_LOG_LEVEL") {
        config.log_level = Some(val);
    }
    if let Ok(val) = std::env::var("GFV_ENCODING") {
        config.encoding = Some(val.parse().map_err(|_| invalid("GFV_ENCODING", &val))?);
    }
    if let Ok(val) = std::env::var("GFV_POSIX_SHELL") {
        config.posix_shell = Some(val);
    }
    if let Ok(val) = std::env::var("GFV_FORMAT_TIMEOUT_MS") {
        config.format.timeout_ms = Some(
            val.trim()
                .parse()
                .map_err(|_| invalid("GFV_FORMAT_TIMEOUT_MS", &val))?,
        );
    }
    if let Ok(val) = std::env::var("GFV_LINT_TIMEOUT_MS") {
        config.lint.tool.timeout_ms = Some(
            val.trim()
                .parse()
                .map_err(|_| invalid("GFV_LINT_TIMEOUT_MS", &val))?,
        );
    }
    if let Ok(val) = std::env::var("GFV_FORMAT_ON_SAVE") {
        config.format_on_save =
            Some(parse_flag(&val).ok_or_else(|| invalid("GFV_FORMAT_ON_SAVE", &val))?);
    }
    Ok(())
}

fn invalid(var: &str, value: &str) -> ConfigError {
    ConfigError::InvalidEnv {
        var: var.into(),
        value: value.into(),
    }
}

fn parse_flag(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a configuration, returning advisory warnings.
///
/// Hard errors (empty commands, out-of-range timeouts, unknown log levels,
/// zero popup sizes, an empty shell) are returned as a
/// [`ConfigError::ValidationError`]; soft issues come back as warnings.
pub fn validate_config(config: &GfvConfig) -> Result<Vec<ConfigWarning>, ConfigError> {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<ConfigWarning> = Vec::new();

    if let Some(ref level) = config.log_level
        && !VALID_LOG_LEVELS.contains(&level.as_str())
    {
        errors.push(format!("invalid log_level '{level}'"));
    }

    if let Some(ref shell) = config.posix_shell
        && shell.trim().is_empty()
    {
        errors.push("posix_shell must not be empty".into());
    }

    validate_tool("format", &config.format, &mut errors, &mut warnings);
    validate_tool("lint", &config.lint.tool, &mut errors, &mut warnings);

    if config.lint.popup_max_width == Some(0) {
        errors.push("[lint] popup_max_width must be greater than zero".into());
    }
    if config.lint.popup_max_height == Some(0) {
        errors.push("[lint] popup_max_height must be greater than zero".into());
    }

    if errors.is_empty() {
        Ok(warnings)
    } else {
        Err(ConfigError::ValidationError { reasons: errors })
    }
}

fn validate_tool(
    name: &str,
    tool: &ToolConfig,
    errors: &mut Vec<String>,
    warnings: &mut Vec<ConfigWarning>,
) {
    match &tool.command {
        Some(argv) if argv.first().is_some_and(|p| !p.trim().is_empty()) => {
            let direct = !Platform::current().is_ok_and(|p| tool.wants_shell(p));
            if direct
                && argv.len() == 1
                && argv[0].trim().contains(char::is_whitespace)
            {
                warnings.push(ConfigWarning::UnsplitCommand {
                    tool: name.into(),
                    command: argv[0].clone(),
                });
            }
        }
        Some(_) => errors.push(format!("[{name}] command must not be empty")),
        None => {}
    }

    if let Some(ms) = tool.timeout_ms {
        if ms == 0 || ms > MAX_TIMEOUT_MS {
            errors.push(format!(
                "[{name}] timeout {ms}ms out of range (1..{MAX_TIMEOUT_MS})"
            ));
        } else if ms > LARGE_TIMEOUT_THRESHOLD_MS {
            warnings.push(ConfigWarning::LargeTimeout {
                tool: name.into(),
                ms,
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Merging
// ---------------------------------------------------------------------------

/// Merge two configurations. Values in `overlay` take precedence over `base`.
///
/// Tool `env` maps are combined; on key collisions the overlay entry wins.
pub fn merge_configs(base: GfvConfig, overlay: GfvConfig) -> GfvConfig {
    GfvConfig {
        encoding: overlay.encoding.or(base.encoding),
        log_level: overlay.log_level.or(base.log_level),
        posix_shell: overlay.posix_shell.or(base.posix_shell),
        format_on_save: overlay.format_on_save.or(base.format_on_save),
        lint_on_save: overlay.lint_on_save.or(base.lint_on_save),
        format: merge_tool(base.format, overlay.format),
        lint: LintConfig {
            tool: merge_tool(base.lint.tool, overlay.lint.tool),
            popup_max_width: overlay.lint.popup_max_width.or(base.lint.popup_max_width),
            popup_max_height: overlay.lint.popup_max_height.or(base.lint.popup_max_height),
            show_empty: overlay.lint.show_empty.or(base.lint.show_empty),
        },
    }
}

fn merge_tool(base: ToolConfig, overlay: ToolConfig) -> ToolConfig {
    let mut env = base.env;
    env.extend(overlay.env);
    ToolConfig {
        command: overlay.command.or(base.command),
        transport: overlay.transport.or(base.transport),
        use_shell: overlay.use_shell.or(base.use_shell),
        timeout_ms: overlay.timeout_ms.or(base.timeout_ms),
        env,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
