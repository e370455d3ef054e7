// SPDX-License-Identifier: MIT OR Apache-2.0
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use schemars::schema_for;
use std::path::{Path, PathBuf};

const CONFIG_SCHEMA: &str = "gfv-config.schema.json";

#[derive(Parser, Debug)]
#[command(name = "xtask", version, about = "Repo maintenance tasks")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the JSON Schema for the TOML configuration file.
    Schema {
        /// Output directory.
        #[arg(long, default_value = "schemas")]
        out_dir: PathBuf,

        /// Fail if the file on disk differs instead of rewriting it.
        #[arg(long)]
        check: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Schema { out_dir, check } => schema(&out_dir, check),
    }
}

fn schema(out_dir: &Path, check: bool) -> Result<()> {
    let path = out_dir.join(CONFIG_SCHEMA);
    let rendered = render(&schema_for!(gfv_config::GfvConfig))?;

    if check {
        let on_disk = std::fs::read_to_string(&path)
            .with_context(|| format!("read {}", path.display()))?;
        if on_disk != rendered {
            bail!("{} is stale; run `cargo xtask schema`", path.display());
        }
        eprintln!("{} is up to date", path.display());
        return Ok(());
    }

    std::fs::create_dir_all(out_dir).context("create schema output dir")?;
    std::fs::write(&path, rendered).with_context(|| format!("write {}", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn render(schema: &schemars::Schema) -> Result<String> {
    let mut s = serde_json::to_string_pretty(schema)?;
    s.push('\n');
    Ok(s)
}
