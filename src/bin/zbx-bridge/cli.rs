use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use zbx_bridge::types::TrapLevel;

#[derive(Parser, Debug)]
#[command(author, version, about = "Salt to Zabbix trap bridge", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log the sender commands instead of executing them.
    #[arg(long, action = ArgAction::SetTrue)]
    pub dry_run: bool,

    /// Use a JSON layer for logs (`--features json-logs`).
    #[arg(long, action = ArgAction::SetTrue)]
    pub json_logs: bool,

    /// Explicit log filter (e.g. "zbx_bridge=debug").
    #[arg(long, value_name = "FILTER")]
    pub log_filter: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Forward a finished job's results as traps.
    Return {
        /// Job result JSON document; read from stdin when omitted.
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
    },
    /// Push a single trap.
    Send {
        /// Trap level (info, warning, high).
        #[arg(long, value_parser = clap::value_parser!(TrapLevel))]
        level: TrapLevel,
        /// Trap payload.
        output: String,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
