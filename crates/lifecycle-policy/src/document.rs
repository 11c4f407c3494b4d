//! The policy document type
//!
//! A `PolicyDocument` wraps the raw JSON object of a bucket lifecycle
//! configuration. Rules live under the top-level `Rules` key; every other
//! field, and every rule field besides `ID` and `Status`, is opaque payload
//! that is carried through verbatim.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// The top-level key holding the rule array
pub const RULES_KEY: &str = "Rules";

/// The rule field holding the unique identifier
pub const ID_KEY: &str = "ID";

/// The rule field holding the Enabled/Disabled status
pub const STATUS_KEY: &str = "Status";

/// A lifecycle configuration document
///
/// The absence of a document (`Option::<PolicyDocument>::None`) means "no
/// policy configured" on the bucket and is a distinct value from a document
/// whose `Rules` array is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyDocument(Value);

impl PolicyDocument {
    /// Wrap a JSON value as a policy document
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a JSON object. All deeper
    /// structural checks belong to [`crate::validate`].
    pub fn from_value(value: Value) -> Result<Self> {
        if value.is_object() {
            Ok(Self(value))
        } else {
            Err(Error::NotAnObject {
                found: json_type_name(&value),
            })
        }
    }

    /// Borrow the underlying JSON value
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consume the document, yielding the underlying JSON value
    pub fn into_value(self) -> Value {
        self.0
    }

    /// The document's rules, in declaration order
    ///
    /// Returns an empty slice when the `Rules` key is absent or not an
    /// array.
    pub fn rules(&self) -> &[Value] {
        self.0
            .get(RULES_KEY)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether the document declares any rules
    pub fn has_rules(&self) -> bool {
        !self.rules().is_empty()
    }

    /// Produce a copy of this document with its `Rules` array replaced
    ///
    /// All non-`Rules` top-level fields are preserved. Used by the merger,
    /// which treats the local document as the structural template.
    pub fn with_rules(&self, rules: Vec<Value>) -> Self {
        let mut value = self.0.clone();
        if let Some(map) = value.as_object_mut() {
            map.insert(RULES_KEY.to_string(), Value::Array(rules));
        }
        Self(value)
    }
}

/// The `ID` of a rule, when it carries one as a string
pub fn rule_id(rule: &Value) -> Option<&str> {
    rule.get(ID_KEY).and_then(Value::as_str)
}

/// Human-readable name of a JSON value's type, for diagnostics
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
