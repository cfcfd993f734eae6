//! Zabbix actions (trigger, discovery, and auto-registration handlers).

use super::ObjectType;

/// Reconciliation descriptor for Zabbix actions.
pub const ACTION: ObjectType = ObjectType {
    name: "action",
    label: "Zabbix Action",
    select: &["selectOperations", "selectFilter"],
};
