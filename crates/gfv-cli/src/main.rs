// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use gfv_cli::commands::{self, FmtMode, PlanRequest, Verdict};
use gfv_config::{GfvConfig, load_config, validate_config};
use gfv_host::{Orchestrator, ToolKind};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gfv", version, about = "Run gofmt and go vet the way the editor plugin does")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long, global = true)]
    debug: bool,

    /// Timeout for the external tool, in milliseconds.
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Format a file with the configured formatter.
    Fmt {
        /// File to format.
        file: PathBuf,

        /// Rewrite the file in place instead of printing it.
        #[arg(long, conflicts_with = "check")]
        write: bool,

        /// Exit 1 and print the path if the file would change.
        #[arg(long)]
        check: bool,
    },

    /// Lint a file's package with the configured linter.
    Vet {
        /// File whose directory is linted.
        file: PathBuf,
    },

    /// Run the pre-save hook (format and/or lint, per config) and save.
    Save {
        /// File being saved.
        file: PathBuf,
    },

    /// Print the invocation plan for a command as JSON.
    Plan {
        /// Resolve for this OS (windows, macos, linux, freebsd, ...).
        #[arg(long)]
        os: Option<String>,

        /// Launch without the platform shell.
        #[arg(long)]
        no_shell: bool,

        /// Include the child environment.
        #[arg(long)]
        show_env: bool,

        /// Use this tool's configured command when no argv is given.
        #[arg(long, value_enum, default_value_t = ToolArg::Format)]
        tool: ToolArg,

        /// Append this payload as the final argument.
        #[arg(long)]
        payload: Option<String>,

        /// Program and arguments.
        #[arg(last = true)]
        argv: Vec<String>,
    },

    /// Print the effective configuration and any warnings.
    Config {
        /// Print JSON instead of TOML.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ToolArg {
    Format,
    Lint,
}

impl From<ToolArg> for ToolKind {
    fn from(v: ToolArg) -> Self {
        match v {
            ToolArg::Format => ToolKind::Format,
            ToolArg::Lint => ToolKind::Lint,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(verdict) => ExitCode::from(verdict.exit_code()),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> Result<Verdict> {
    let mut config = load_config(cli.config.as_deref()).context("load config")?;
    if let Some(ms) = cli.timeout_ms {
        config.format.timeout_ms = Some(ms);
        config.lint.tool.timeout_ms = Some(ms);
    }
    init_tracing(&config, cli.debug);
    if !matches!(cli.command, Commands::Config { .. }) {
        for w in validate_config(&config).context("validate config")? {
            warn!(target: "gfv.cli", "{w}");
        }
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let verdict = match cli.command {
        Commands::Fmt { file, write, check } => {
            let mode = if write {
                FmtMode::Write
            } else if check {
                FmtMode::Check
            } else {
                FmtMode::Print
            };
            commands::cmd_fmt(&orchestrator(config)?, &file, mode, &mut out).await?
        }
        Commands::Vet { file } => commands::cmd_vet(&orchestrator(config)?, &file, &mut out).await?,
        Commands::Save { file } => {
            commands::cmd_save(&orchestrator(config)?, &file, &mut out).await?
        }
        Commands::Plan {
            os,
            no_shell,
            show_env,
            tool,
            payload,
            argv,
        } => {
            let request = PlanRequest {
                argv,
                tool: Some(tool.into()),
                os,
                no_shell,
                payload,
                show_env,
            };
            writeln!(out, "{}", commands::plan_json(&config, &request)?)?;
            Verdict::Clean
        }
        Commands::Config { json } => {
            let (text, warnings) = commands::config_report(&config, json)?;
            for w in &warnings {
                eprintln!("warning: {w}");
            }
            writeln!(out, "{}", text.trim_end())?;
            Verdict::Clean
        }
    };
    out.flush()?;
    Ok(verdict)
}

fn orchestrator(config: GfvConfig) -> Result<Orchestrator> {
    Orchestrator::new(config).context("unsupported platform")
}

fn init_tracing(config: &GfvConfig, debug: bool) {
    let filter = if debug {
        EnvFilter::new("gfv=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "gfv={}",
                config.log_level.as_deref().unwrap_or("info")
            ))
        })
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn plan_collects_trailing_argv() {
        let cli = Cli::try_parse_from(["gfv", "plan", "--os", "linux", "--", "go", "vet", "-x"])
            .unwrap();
        match cli.command {
            Commands::Plan { argv, os, .. } => {
                assert_eq!(argv, ["go", "vet", "-x"]);
                assert_eq!(os.as_deref(), Some("linux"));
            }
            other => panic!("expected plan, got {other:?}"),
        }
    }

    #[test]
    fn write_and_check_conflict() {
        assert!(Cli::try_parse_from(["gfv", "fmt", "a.go", "--write", "--check"]).is_err());
    }
}
