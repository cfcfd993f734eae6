//! Zabbix value maps (raw value to display value translations).

use super::ObjectType;

/// Reconciliation descriptor for Zabbix value maps.
pub const VALUEMAP: ObjectType = ObjectType {
    name: "valuemap",
    label: "Zabbix Value map",
    select: &["selectMappings"],
};
