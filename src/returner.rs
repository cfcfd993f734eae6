//! Classification of finished jobs into traps.
//!
//! Zabbix side expects three trapper items, one per [`TrapLevel`] key. Every
//! failed item raises a high trap and every changed item a warning trap; a
//! job with neither sends a single "OK" info trap. A mixed job therefore
//! produces both a high and a warning trap and no info trap.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::dispatch::{ShellRunner, truthy};
use crate::sender::TrapSender;
use crate::types::TrapLevel;

/// One finished job as handed over by the agent.
#[derive(Clone, Debug, Deserialize)]
pub struct JobResult {
    /// Target (minion) identifier.
    pub id: String,
    /// Per-item result mapping for state runs; arbitrary data otherwise.
    #[serde(rename = "return", default)]
    pub ret: Value,
}

/// Forwards job results as traps through a [`TrapSender`].
pub struct Returner<S> {
    sender: TrapSender,
    shell: S,
}

impl<S: ShellRunner> Returner<S> {
    pub const fn new(sender: TrapSender, shell: S) -> Self {
        Self { sender, shell }
    }

    /// Inspect every item of the job and push the matching traps.
    ///
    /// Items are visited in the mapping's iteration order; each item triggers
    /// at most one trap (failure wins over change), but items are classified
    /// independently of each other.
    pub fn process(&self, job: &JobResult) {
        let mut changes = false;
        let mut errors = false;

        if let Value::Object(items) = &job.ret {
            for entry in items.values() {
                let Some(item) = entry.as_object() else {
                    continue;
                };
                let named = item.contains_key("comment") && item.contains_key("name");
                if named && item.get("result") == Some(&Value::Bool(false)) {
                    errors = true;
                    self.send_item(TrapLevel::High, item);
                } else if named && item.get("changes").is_some_and(truthy) {
                    changes = true;
                    self.send_item(TrapLevel::Warning, item);
                }
            }
        }

        if !changes && !errors {
            debug!(job = %job.id, "job clean, sending OK trap");
            self.sender
                .send(&self.shell, TrapLevel::Info, &format!("SALT {} OK", job.id));
        }
    }

    fn send_item(&self, level: TrapLevel, item: &Map<String, Value>) {
        let output = format!(
            "SALT:\nname: {}\ncomment: {}",
            render(item.get("name")),
            render(item.get("comment")),
        );
        self.sender.send(&self.shell, level, &output);
    }
}

fn render(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
