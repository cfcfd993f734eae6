//! Present/absent reconciliation of Zabbix objects.
//!
//! The control flow is implemented once in [`Reconciler`] and parameterized
//! by an [`ObjectType`] descriptor; `action` and `valuemap` only differ in
//! their natural-key field, comment label, and the `select*` options their
//! get query needs. Comparison, substitution, and query execution are all
//! delegated to the [`Dispatch`] collaborator.

pub mod action;
pub mod valuemap;

use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::dispatch::{Dispatch, truthy};
use crate::error::DispatchError;

/// Per-type data threaded through the shared reconciliation control flow.
#[derive(Clone, Copy, Debug)]
pub struct ObjectType {
    /// API object name, also the method prefix (`action` → `action.get`).
    pub name: &'static str,
    /// Human-readable label used in comments.
    pub label: &'static str,
    /// `select*` query options needed for the get query to return a
    /// complete object.
    pub select: &'static [&'static str],
}

impl ObjectType {
    fn method(&self, op: &str) -> String {
        format!("{}.{op}", self.name)
    }
}

/// Structured record every reconciliation call resolves to.
///
/// `result` is true for every outcome, including "already exists"; it only
/// turns false when a collaborator reports a failure, in which case `comment`
/// carries the failure text.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StateResult {
    pub name: String,
    pub result: bool,
    pub comment: String,
    pub changes: Map<String, Value>,
}

impl StateResult {
    fn ok(name: &str, comment: String) -> Self {
        Self {
            name: name.to_string(),
            result: true,
            comment,
            changes: Map::new(),
        }
    }

    fn with_changes(name: &str, comment: String, old: String, new: String) -> Self {
        let mut changes = Map::new();
        changes.insert(name.to_string(), json!({ "old": old, "new": new }));
        Self {
            name: name.to_string(),
            result: true,
            comment,
            changes,
        }
    }

    fn failure(name: &str, comment: String) -> Self {
        Self {
            name: name.to_string(),
            result: false,
            comment,
            changes: Map::new(),
        }
    }
}

/// Drives present/absent decisions against a [`Dispatch`] collaborator.
///
/// With `dry_run` set, every mutating branch reports what it would do and
/// issues no create/update/delete query.
pub struct Reconciler<'a, D> {
    dispatch: &'a D,
    dry_run: bool,
}

impl<'a, D: Dispatch> Reconciler<'a, D> {
    pub const fn new(dispatch: &'a D, dry_run: bool) -> Self {
        Self { dispatch, dry_run }
    }

    /// Ensure an object with this name exists and matches `params`.
    ///
    /// Never returns an error: collaborator failures are folded into a
    /// `result: false` record.
    pub fn present(&self, object: &ObjectType, name: &str, params: Map<String, Value>) -> StateResult {
        match self.ensure_present(object, name, params) {
            Ok(result) => result,
            Err(err) => StateResult::failure(name, err.to_string()),
        }
    }

    /// Ensure no object with this name exists. Idempotent.
    pub fn absent(&self, object: &ObjectType, name: &str) -> StateResult {
        match self.ensure_absent(object, name) {
            Ok(result) => result,
            Err(err) => StateResult::failure(name, err.to_string()),
        }
    }

    fn ensure_present(
        &self,
        object: &ObjectType,
        name: &str,
        mut params: Map<String, Value>,
    ) -> Result<StateResult, DispatchError> {
        let label = object.label;
        let id_field = self.id_field(object)?;

        params.insert("name".to_string(), Value::String(name.to_string()));
        let defined = self.dispatch.substitute_params(Value::Object(params))?;

        let Some(existing) = self.query_existing(object, name, &defined, &id_field)? else {
            if self.dry_run {
                return Ok(StateResult::with_changes(
                    name,
                    format!("{label} \"{name}\" would be created."),
                    format!("{label} \"{name}\" does not exist."),
                    format!("{label} \"{name}\" would be created according definition."),
                ));
            }
            self.dispatch.run_query(&object.method("create"), defined)?;
            debug!(object = object.name, name, "object created");
            return Ok(StateResult::with_changes(
                name,
                format!("{label} \"{name}\" created."),
                format!("{label} \"{name}\" did not exist."),
                format!("{label} \"{name}\" created according definition."),
            ));
        };

        // More than one match is treated as "exists"; the first row stands
        // in for the object.
        let live = first_row(&existing);
        let diff = self.dispatch.compare_params(&defined, live, &id_field)?;
        if diff.is_empty() {
            return Ok(StateResult::ok(
                name,
                format!("{label} \"{name}\" already exists and corresponds to a definition."),
            ));
        }

        let rendered = render_diff(&diff);
        if self.dry_run {
            return Ok(StateResult::with_changes(
                name,
                format!(
                    "{label} \"{name}\" differed in following parameters: {rendered} and would be fixed."
                ),
                format!("{label} \"{name}\" differed in following parameters: {rendered}"),
                format!("{label} \"{name}\" would be fixed."),
            ));
        }

        let mut update = diff;
        if !update.contains_key(&id_field) {
            if let Some(id) = live.get(&id_field) {
                update.insert(id_field.clone(), id.clone());
            }
        }
        self.dispatch
            .run_query(&object.method("update"), Value::Object(update))?;
        debug!(object = object.name, name, "object updated");
        Ok(StateResult::with_changes(
            name,
            format!("{label} \"{name}\" updated."),
            format!("{label} \"{name}\" differed in following parameters: {rendered}"),
            format!("{label} \"{name}\" fixed."),
        ))
    }

    fn ensure_absent(&self, object: &ObjectType, name: &str) -> Result<StateResult, DispatchError> {
        let label = object.label;
        let Some(id) = self.dispatch.object_id_by_params(object.name, name)? else {
            return Ok(StateResult::ok(
                name,
                format!("{label} \"{name}\" does not exist."),
            ));
        };

        if self.dry_run {
            return Ok(StateResult::with_changes(
                name,
                format!("{label} \"{name}\" would be deleted."),
                format!("{label} \"{name}\" exists."),
                format!("{label} \"{name}\" would be deleted."),
            ));
        }

        self.dispatch.run_query(&object.method("delete"), json!([id]))?;
        debug!(object = object.name, name, "object deleted");
        Ok(StateResult::with_changes(
            name,
            format!("{label} \"{name}\" deleted."),
            format!("{label} \"{name}\" existed."),
            format!("{label} \"{name}\" deleted."),
        ))
    }

    fn id_field(&self, object: &ObjectType) -> Result<String, DispatchError> {
        let mapper = self.dispatch.zabbix_id_mapper()?;
        mapper
            .get(object.name)
            .cloned()
            .ok_or_else(|| DispatchError::UnknownObjectType {
                object: object.name.to_string(),
            })
    }

    /// Fetch the live object matching `name` (and the explicit natural-key
    /// id when the definition carries one), normalized through the same
    /// substitution pass as the definition. A falsy answer at either step
    /// means the object does not exist.
    fn query_existing(
        &self,
        object: &ObjectType,
        name: &str,
        defined: &Value,
        id_field: &str,
    ) -> Result<Option<Value>, DispatchError> {
        let mut query = json!({ "output": "extend", "filter": { "name": name } });
        for select in object.select {
            query[*select] = json!("extend");
        }
        if let Some(id) = defined.get(id_field) {
            query["filter"][id_field] = id.clone();
        }

        let Some(raw) = self.dispatch.run_query(&object.method("get"), query)? else {
            return Ok(None);
        };
        if !truthy(&raw) {
            return Ok(None);
        }
        let resolved = self.dispatch.substitute_params(raw)?;
        Ok(truthy(&resolved).then_some(resolved))
    }
}

fn first_row(existing: &Value) -> &Value {
    match existing {
        Value::Array(rows) => rows.first().unwrap_or(existing),
        other => other,
    }
}

fn render_diff(diff: &Map<String, Value>) -> String {
    Value::Object(diff.clone()).to_string()
}
