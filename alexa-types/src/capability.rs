use serde_json::{json, Value};

use crate::directive::Key;

/// Fixed capability description published for a namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityDescriptor {
    /// State fields the namespace reports
    Properties(Vec<String>),
    /// Directive operations the namespace accepts
    Operations(Vec<String>),
    /// Keys accepted by the keypad
    Keys(Vec<Key>),
    /// Namespace is available, with no further description
    Enabled,
    /// MAC addresses that can be woken
    MacAddresses(Vec<String>),
    /// Namespace is not offered on this endpoint
    Withheld,
}

impl CapabilityDescriptor {
    pub fn properties(fields: &[&str]) -> Self {
        CapabilityDescriptor::Properties(fields.iter().map(|f| f.to_string()).collect())
    }

    pub fn operations(operations: &[&str]) -> Self {
        CapabilityDescriptor::Operations(operations.iter().map(|o| o.to_string()).collect())
    }

    pub fn is_offered(&self) -> bool {
        !matches!(self, CapabilityDescriptor::Withheld)
    }

    /// Shadow representation of the descriptor
    pub fn to_value(&self) -> Value {
        match self {
            CapabilityDescriptor::Properties(fields) => json!(fields),
            CapabilityDescriptor::Operations(operations) => json!(operations),
            CapabilityDescriptor::Keys(keys) => {
                Value::Array(keys.iter().map(|k| Value::from(k.as_str())).collect())
            }
            CapabilityDescriptor::Enabled => Value::Bool(true),
            CapabilityDescriptor::MacAddresses(macs) => json!(macs),
            CapabilityDescriptor::Withheld => Value::Null,
        }
    }
}
