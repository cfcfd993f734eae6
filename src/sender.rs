//! Trap transmission through the `zabbix_sender` binary.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::dispatch::ShellRunner;
use crate::error::SenderError;
use crate::types::TrapLevel;

/// Known installation locations, probed in priority order. Both paths of a
/// pair must exist for the pair to be selected.
const SENDER_LOCATIONS: &[(&str, &str)] = &[
    (
        "/usr/local/zabbix/bin/zabbix_sender",
        "/usr/local/zabbix/etc/zabbix_agentd.conf",
    ),
    ("/usr/bin/zabbix_sender", "/etc/zabbix/zabbix_agentd.conf"),
];

/// Handle on a local `zabbix_sender` binary and the agent configuration it
/// reads the server address from.
#[derive(Clone, Debug)]
pub struct TrapSender {
    sender: PathBuf,
    config: PathBuf,
}

impl TrapSender {
    /// Use an explicit binary and agent-config pair.
    ///
    /// # Errors
    ///
    /// Returns [`SenderError::MissingPath`] when either path does not exist.
    pub fn new(sender: PathBuf, config: PathBuf) -> Result<Self, SenderError> {
        if !sender.exists() {
            return Err(SenderError::MissingPath {
                role: "sender binary",
                path: sender,
            });
        }
        if !config.exists() {
            return Err(SenderError::MissingPath {
                role: "agent config",
                path: config,
            });
        }
        Ok(Self { sender, config })
    }

    /// Probe the known installation locations. `None` disables trap
    /// transmission entirely; callers are expected to report, not fail.
    #[must_use]
    pub fn discover() -> Option<Self> {
        let candidates: Vec<(PathBuf, PathBuf)> = SENDER_LOCATIONS
            .iter()
            .map(|(bin, cfg)| (PathBuf::from(bin), PathBuf::from(cfg)))
            .collect();
        Self::probe(&candidates)
    }

    fn probe(candidates: &[(PathBuf, PathBuf)]) -> Option<Self> {
        candidates
            .iter()
            .find(|(bin, cfg)| bin.exists() && cfg.exists())
            .map(|(bin, cfg)| Self {
                sender: bin.clone(),
                config: cfg.clone(),
            })
    }

    #[must_use]
    pub fn sender_path(&self) -> &Path {
        &self.sender
    }

    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config
    }

    /// Push one trap. Fire-and-forget: the shell result is discarded and
    /// nothing is reported back, per the send contract.
    pub fn send(&self, shell: &impl ShellRunner, level: TrapLevel, output: &str) {
        let command = self.command(level, output);
        debug!(level = %level, "sending trap");
        shell.shell(&command);
    }

    fn command(&self, level: TrapLevel, output: &str) -> String {
        format!(
            "{} -c {} -k {} -o \"{}\"",
            self.sender.display(),
            self.config.display(),
            level.key(),
            output,
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::fs;
    use std::path::{Path, PathBuf};

    use super::TrapSender;
    use crate::dispatch::ShellRunner;
    use crate::types::TrapLevel;

    struct RecordingShell {
        commands: RefCell<Vec<String>>,
    }

    impl RecordingShell {
        fn new() -> Self {
            Self {
                commands: RefCell::new(Vec::new()),
            }
        }
    }

    impl ShellRunner for RecordingShell {
        fn shell(&self, command: &str) {
            self.commands.borrow_mut().push(command.to_string());
        }
    }

    fn touch(path: &Path) {
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn probe_selects_first_complete_pair() {
        let dir = tempfile::tempdir().unwrap();
        let first_bin = dir.path().join("local_sender");
        let first_cfg = dir.path().join("local_agentd.conf");
        let second_bin = dir.path().join("sender");
        let second_cfg = dir.path().join("agentd.conf");
        touch(&first_bin);
        touch(&first_cfg);
        touch(&second_bin);
        touch(&second_cfg);

        let candidates = vec![(first_bin.clone(), first_cfg), (second_bin, second_cfg)];
        let found = TrapSender::probe(&candidates);
        assert_eq!(found.map(|s| s.sender), Some(first_bin));
    }

    #[test]
    fn probe_skips_incomplete_pairs() {
        let dir = tempfile::tempdir().unwrap();
        let first_bin = dir.path().join("local_sender");
        let second_bin = dir.path().join("sender");
        let second_cfg = dir.path().join("agentd.conf");
        touch(&first_bin);
        touch(&second_bin);
        touch(&second_cfg);

        let candidates = vec![
            (first_bin, dir.path().join("missing.conf")),
            (second_bin.clone(), second_cfg),
        ];
        let found = TrapSender::probe(&candidates);
        assert_eq!(found.map(|s| s.sender), Some(second_bin));
    }

    #[test]
    fn probe_reports_nothing_when_no_pair_exists() {
        let dir = tempfile::tempdir().unwrap();
        let candidates = vec![(dir.path().join("absent"), dir.path().join("absent.conf"))];
        assert!(TrapSender::probe(&candidates).is_none());
    }

    #[test]
    fn send_builds_expected_command() {
        let sender = TrapSender {
            sender: PathBuf::from("/usr/bin/zabbix_sender"),
            config: PathBuf::from("/etc/zabbix/zabbix_agentd.conf"),
        };
        let shell = RecordingShell::new();
        sender.send(&shell, TrapLevel::High, "SALT:\nname: n\ncomment: c");

        let commands = shell.commands.borrow();
        assert_eq!(commands.len(), 1);
        assert_eq!(
            commands[0],
            "/usr/bin/zabbix_sender -c /etc/zabbix/zabbix_agentd.conf \
             -k salt.trap.high -o \"SALT:\nname: n\ncomment: c\""
        );
    }
}
