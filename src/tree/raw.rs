//! Generic node tree handed over by the front end.
//!
//! Every node carries a kind tag, an optional literal value, an optional
//! declared-type string and its ordered children. The JSON form is
//!
//! ```json
//! {"kind": "Binary", "value": "+", "children": [{"kind": "Identifier", "value": "x"},
//!                                               {"kind": "Number", "value": 1}]}
//! ```
//!
//! The builder methods ([`RawNode::new`], [`RawNode::with_value`], ...) are the
//! programmatic way to assemble the same shape.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(
        default,
        rename = "type",
        alias = "declaredType",
        alias = "declared_type",
        skip_serializing_if = "Option::is_none"
    )]
    pub declared_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RawNode>,
}

/// Failure to turn a node tree into a program
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TreeError {
    #[error("invalid tree JSON: {0}")]
    Json(String),
    #[error("unknown node kind `{0}`")]
    UnknownKind(String),
    #[error("`{kind}` node expects {expected}, found {found} children")]
    Arity {
        kind: String,
        expected: &'static str,
        found: usize,
    },
    #[error("`{kind}` node is missing its {what}")]
    MissingValue { kind: String, what: &'static str },
    #[error("`{kind}` node has invalid value `{value}`")]
    InvalidValue { kind: String, value: String },
    #[error("{found} is not allowed where {expected} is expected")]
    Misplaced {
        expected: &'static str,
        found: String,
    },
}

impl RawNode {
    pub fn new(kind: impl Into<String>) -> Self {
        RawNode {
            kind: kind.into(),
            value: None,
            declared_type: None,
            children: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<serde_json::Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_type(mut self, declared_type: impl Into<String>) -> Self {
        self.declared_type = Some(declared_type.into());
        self
    }

    pub fn with_child(mut self, child: RawNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = RawNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn from_json(text: &str) -> Result<RawNode, TreeError> {
        serde_json::from_str(text).map_err(|e| TreeError::Json(e.to_string()))
    }

    /// The literal value as text, accepting both JSON strings and numbers
    pub fn text(&self) -> Option<String> {
        match self.value.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}
