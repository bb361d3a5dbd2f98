//! Annotated item model flowing between pipeline operators.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One data record flowing through a pipeline.
///
/// The payload is an opaque JSON value; operators that need to report
/// something about an item (for example the store-assigned key after a
/// successful upsert) do so through named attachments rather than by
/// rewriting the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    value: Value,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attachments: BTreeMap<String, Value>,
}

impl Item {
    /// Wrap a payload value with no attachments.
    pub fn new(value: Value) -> Self {
        Self {
            value,
            attachments: BTreeMap::new(),
        }
    }

    /// Borrow the payload.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Consume the item, discarding attachments.
    pub fn into_value(self) -> Value {
        self.value
    }

    /// Attach named metadata, replacing any previous attachment of the same name.
    pub fn set_attachment(&mut self, name: impl Into<String>, value: Value) {
        self.attachments.insert(name.into(), value);
    }

    /// Look up named metadata.
    pub fn attachment(&self, name: &str) -> Option<&Value> {
        self.attachments.get(name)
    }
}

impl From<Value> for Item {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::Item;

    #[test]
    fn attachments_are_separate_from_payload() {
        let mut item = Item::new(json!({"name": "beer"}));
        assert!(item.attachment("meta").is_none());

        item.set_attachment("meta", json!({"id": "k001"}));
        assert_eq!(item.attachment("meta"), Some(&json!({"id": "k001"})));
        assert_eq!(item.value(), &json!({"name": "beer"}));
    }

    #[test]
    fn attachments_survive_clone_and_replacement_overwrites() {
        let mut item = Item::new(json!(1));
        item.set_attachment("meta", json!({"id": "a"}));

        let copied = item.clone();
        item.set_attachment("meta", json!({"id": "b"}));

        assert_eq!(copied.attachment("meta"), Some(&json!({"id": "a"})));
        assert_eq!(item.attachment("meta"), Some(&json!({"id": "b"})));
    }
}
