use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use zbx_bridge::config::Config;
use zbx_bridge::dispatch::{ShellRunner, SystemShell};
use zbx_bridge::returner::{JobResult, Returner};
use zbx_bridge::sender::TrapSender;
use zbx_bridge::telemetry::init_tracing;
use zbx_bridge::types::TrapLevel;

use crate::cli::{Cli, Command};

const DEFAULT_CONFIG: &str = "zbx-bridge.toml";

pub fn run(cli: Cli) -> Result<()> {
    init_tracing(cli.log_filter.as_deref(), cli.json_logs)?;

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let config = Config::from_file(&config_path)?;
    let sender = config.resolve_sender()?;
    info!(
        sender = %sender.sender_path().display(),
        agent_config = %sender.config_path().display(),
        "trap sender resolved"
    );

    match cli.command {
        Command::Return { file } => {
            let payload = read_payload(file.as_deref())?;
            let job: JobResult =
                serde_json::from_str(&payload).context("invalid job result document")?;
            if cli.dry_run {
                Returner::new(sender, LoggingShell).process(&job);
            } else {
                Returner::new(sender, SystemShell).process(&job);
            }
        }
        Command::Send { level, output } => {
            send_one(&sender, cli.dry_run, level, &output);
        }
    }
    Ok(())
}

fn send_one(sender: &TrapSender, dry_run: bool, level: TrapLevel, output: &str) {
    if dry_run {
        sender.send(&LoggingShell, level, output);
    } else {
        sender.send(&SystemShell, level, output);
    }
}

fn read_payload(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read job result from stdin")?;
            Ok(buffer)
        }
    }
}

/// Shell stand-in for `--dry-run`: logs the command it would have run.
struct LoggingShell;

impl ShellRunner for LoggingShell {
    fn shell(&self, command: &str) {
        info!(%command, "dry run, not executing");
    }
}
