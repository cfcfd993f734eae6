#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::rc::Rc;

use serde_json::{Map, Value, json};
use tempfile::TempDir;

use zbx_bridge::dispatch::{Dispatch, ShellRunner};
use zbx_bridge::error::DispatchError;
use zbx_bridge::returner::{JobResult, Returner};
use zbx_bridge::sender::TrapSender;
use zbx_bridge::state::{Reconciler, action};

/// Zabbix double with no objects: every get query answers nothing, every
/// mutating query succeeds, substitution is the identity.
struct EmptyZabbix {
    queries: RefCell<Vec<(String, Value)>>,
}

impl EmptyZabbix {
    fn new() -> Self {
        Self {
            queries: RefCell::new(Vec::new()),
        }
    }
}

impl Dispatch for EmptyZabbix {
    fn zabbix_id_mapper(&self) -> Result<BTreeMap<String, String>, DispatchError> {
        let mut mapper = BTreeMap::new();
        mapper.insert("action".to_string(), "actionid".to_string());
        mapper.insert("valuemap".to_string(), "valuemapid".to_string());
        Ok(mapper)
    }

    fn substitute_params(&self, definition: Value) -> Result<Value, DispatchError> {
        Ok(definition)
    }

    fn run_query(&self, method: &str, params: Value) -> Result<Option<Value>, DispatchError> {
        self.queries
            .borrow_mut()
            .push((method.to_string(), params));
        if method.ends_with(".get") {
            Ok(None)
        } else {
            Ok(Some(json!(true)))
        }
    }

    fn compare_params(
        &self,
        _defined: &Value,
        _existing: &Value,
        _id_field: &str,
    ) -> Result<Map<String, Value>, DispatchError> {
        Ok(Map::new())
    }

    fn object_id_by_params(
        &self,
        _object: &str,
        _name: &str,
    ) -> Result<Option<String>, DispatchError> {
        Ok(None)
    }
}

#[derive(Clone)]
struct RecordingShell {
    commands: Rc<RefCell<Vec<String>>>,
}

impl RecordingShell {
    fn new() -> Self {
        Self {
            commands: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl ShellRunner for RecordingShell {
    fn shell(&self, command: &str) {
        self.commands.borrow_mut().push(command.to_string());
    }
}

fn sender_fixture() -> (TempDir, TrapSender) {
    let dir = tempfile::tempdir().unwrap();
    let bin = dir.path().join("zabbix_sender");
    let cfg = dir.path().join("zabbix_agentd.conf");
    fs::write(&bin, b"").unwrap();
    fs::write(&cfg, b"").unwrap();
    let sender = TrapSender::new(bin, cfg).unwrap();
    (dir, sender)
}

#[test]
fn present_against_empty_server_creates_the_action() {
    let name = "Auto registration Databases";
    let params = json!({
        "status": "0",
        "eventsource": "2",
        "filter": {
            "evaltype": "2",
            "conditions": [
                { "operator": "2", "conditiontype": "24", "value": "database" }
            ],
        },
        "operations": [
            { "opgroup": [{ "groupid": "6" }], "operationtype": "4" }
        ],
    })
    .as_object()
    .cloned()
    .unwrap();

    let zabbix = EmptyZabbix::new();
    let result = Reconciler::new(&zabbix, false).present(&action::ACTION, name, params);

    assert!(result.result);
    assert_eq!(result.comment, format!("Zabbix Action \"{name}\" created."));
    assert_eq!(
        result.changes.get(name).and_then(|c| c.get("old")),
        Some(&json!(format!("Zabbix Action \"{name}\" did not exist.")))
    );
    assert_eq!(
        result.changes.get(name).and_then(|c| c.get("new")),
        Some(&json!(format!(
            "Zabbix Action \"{name}\" created according definition."
        )))
    );

    let queries = zabbix.queries.borrow();
    let creates: Vec<_> = queries.iter().filter(|(m, _)| m == "action.create").collect();
    assert_eq!(creates.len(), 1);
    assert_eq!(creates[0].1.get("name"), Some(&json!(name)));
}

#[test]
fn present_twice_against_empty_server_issues_one_create_per_call() {
    let zabbix = EmptyZabbix::new();
    let reconciler = Reconciler::new(&zabbix, false);
    reconciler.present(&action::ACTION, "a", Map::new());
    reconciler.present(&action::ACTION, "a", Map::new());

    let queries = zabbix.queries.borrow();
    assert_eq!(
        queries.iter().filter(|(m, _)| m == "action.create").count(),
        2
    );
}

#[test]
fn failed_job_reaches_the_wire_as_one_high_trap() {
    let (_dir, sender) = sender_fixture();
    let shell = RecordingShell::new();
    let commands = Rc::clone(&shell.commands);
    let returner = Returner::new(sender, shell);

    let job: JobResult = serde_json::from_value(json!({
        "id": "minion1",
        "return": {
            "state1": { "name": "n", "comment": "c", "result": false, "changes": {} }
        }
    }))
    .unwrap();
    returner.process(&job);

    let commands = commands.borrow();
    assert_eq!(commands.len(), 1);
    assert!(commands[0].contains("-k salt.trap.high"));
    assert!(commands[0].contains("name: n\ncomment: c"));
}

#[test]
fn clean_job_reaches_the_wire_as_one_ok_trap() {
    let (_dir, sender) = sender_fixture();
    let shell = RecordingShell::new();
    let commands = Rc::clone(&shell.commands);
    let returner = Returner::new(sender, shell);

    let job: JobResult = serde_json::from_value(json!({
        "id": "minion1",
        "return": {
            "state1": { "name": "n", "comment": "c", "result": true, "changes": {} }
        }
    }))
    .unwrap();
    returner.process(&job);

    let commands = commands.borrow();
    assert_eq!(commands.len(), 1);
    assert!(commands[0].contains("-k salt.trap.info"));
    assert!(commands[0].contains("\"SALT minion1 OK\""));
}
