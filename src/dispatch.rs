//! Seams to the external execution module.
//!
//! All of the real Zabbix work (parameter substitution, API queries, diffing,
//! id mapping) lives behind [`Dispatch`]. The crate itself only decides what
//! to call and how to fold the answers into state records.

use std::collections::BTreeMap;
use std::process::Command;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::DispatchError;

/// Interface of the execution-module collaborator.
///
/// The trait mirrors the functions the reconciler needs from the execution
/// module, one method per remote function. Implementations may fan out to an
/// agent, an RPC layer, or a test double; the reconciler does not care.
///
/// # Errors
///
/// Every method reports collaborator-side failures as [`DispatchError`]; the
/// reconciler converts them into `result: false` state records instead of
/// propagating them.
pub trait Dispatch {
    /// Mapping from object type to its natural-key field, e.g.
    /// `action` → `actionid`.
    fn zabbix_id_mapper(&self) -> Result<BTreeMap<String, String>, DispatchError>;

    /// Resolve symbolic values inside a definition (group names to ids and
    /// the like). Lookup failures surface as `Err`.
    fn substitute_params(&self, definition: Value) -> Result<Value, DispatchError>;

    /// Run one API method. `None` means the API answered with nothing for
    /// this query.
    fn run_query(&self, method: &str, params: Value) -> Result<Option<Value>, DispatchError>;

    /// Field-by-field diff of a defined object against a live one, keyed by
    /// differing field. An empty map means the two are equal; this is the
    /// sole equality oracle the reconciler consults.
    fn compare_params(
        &self,
        defined: &Value,
        existing: &Value,
        id_field: &str,
    ) -> Result<Map<String, Value>, DispatchError>;

    /// Natural-key id of the named object, or `None` when it does not exist.
    fn object_id_by_params(
        &self,
        object: &str,
        name: &str,
    ) -> Result<Option<String>, DispatchError>;
}

/// Raw synchronous shell primitive consumed by the trap sender.
///
/// Deliberately returns nothing: trap transmission is fire-and-forget, and a
/// failed send has no channel back to the caller. Implementations may log.
pub trait ShellRunner {
    fn shell(&self, command: &str);
}

/// [`ShellRunner`] backed by `sh -c`.
///
/// Blocks until the child exits. Exit status and output are discarded apart
/// from logging; a hang in the child hangs the caller.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemShell;

impl ShellRunner for SystemShell {
    fn shell(&self, command: &str) {
        debug!(%command, "running shell command");
        match Command::new("sh").arg("-c").arg(command).status() {
            Ok(status) if status.success() => {}
            Ok(status) => warn!(%command, %status, "shell command exited nonzero"),
            Err(err) => warn!(%command, error = %err, "failed to spawn shell command"),
        }
    }
}

/// Truthiness as the collaborators report it: absent results come back as
/// `false`, empty collections count as nothing found.
#[must_use]
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
