use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Severity of a trap pushed to the monitoring server.
///
/// Each level maps to one fixed trapper item key on the Zabbix side; the
/// returner never sends anything outside these three.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrapLevel {
    Info,
    Warning,
    High,
}

impl TrapLevel {
    /// Trapper item key the level is delivered under.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Info => "salt.trap.info",
            Self::Warning => "salt.trap.warning",
            Self::High => "salt.trap.high",
        }
    }
}

impl Display for TrapLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::High => "high",
        })
    }
}

impl FromStr for TrapLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" | "information" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warning),
            "high" => Ok(Self::High),
            other => Err(format!("unknown trap level: {other}")),
        }
    }
}
