//! Change events for state field writes
//!
//! Every `set` on the store broadcasts a `StateChange`, including writes that
//! leave the value unchanged. `changed` tells the two apart.

use std::time::Instant;

use alexa_types::{Namespace, StateSlice};
use serde_json::Value;

/// A write to one state field
#[derive(Debug, Clone)]
pub struct StateChange {
    /// Namespace that owns the field
    pub namespace: Namespace,

    /// Field name within the namespace
    pub field: String,

    /// Value after the write
    pub value: Value,

    /// Whether the value differs from what was stored before
    pub changed: bool,

    /// When the write happened
    pub timestamp: Instant,
}

impl StateChange {
    pub fn new(namespace: Namespace, field: impl Into<String>, value: Value, changed: bool) -> Self {
        Self {
            namespace,
            field: field.into(),
            value,
            changed,
            timestamp: Instant::now(),
        }
    }

    /// Single-field slice describing this write
    pub fn to_slice(&self) -> StateSlice {
        StateSlice::single(self.namespace, self.field.clone(), self.value.clone())
    }
}

impl PartialEq for StateChange {
    fn eq(&self, other: &Self) -> bool {
        // Timestamp is not part of equality
        self.namespace == other.namespace
            && self.field == other.field
            && self.value == other.value
            && self.changed == other.changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_equality_ignores_timestamp() {
        let a = StateChange::new(Namespace::Power, "powerState", json!("ON"), true);
        std::thread::sleep(std::time::Duration::from_millis(1));
        let b = StateChange::new(Namespace::Power, "powerState", json!("ON"), true);
        assert_eq!(a, b);
    }

    #[test]
    fn test_to_slice() {
        let change = StateChange::new(Namespace::Health, "connectivity", json!("OK"), false);
        assert_eq!(
            change.to_slice().get(Namespace::Health, "connectivity"),
            Some(&json!("OK"))
        );
    }
}
