// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use core::fmt;

use thiserror::Error;

/// The accepted shapes of an expression's `Terms` field.
pub const TERMS_SHAPES: &str =
    r#"{"Value": ..., "Type": ...} or [{"Value": ..., "Type": ...}, ...]"#;

/// JSON type observed while decoding, `Absent` when the field is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonType {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
    Absent,
}

impl JsonType {
    pub fn of(value: Option<&serde_json::Value>) -> Self {
        match value {
            None => JsonType::Absent,
            Some(serde_json::Value::Null) => JsonType::Null,
            Some(serde_json::Value::Bool(_)) => JsonType::Boolean,
            Some(serde_json::Value::Number(_)) => JsonType::Number,
            Some(serde_json::Value::String(_)) => JsonType::String,
            Some(serde_json::Value::Array(_)) => JsonType::Array,
            Some(serde_json::Value::Object(_)) => JsonType::Object,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            JsonType::Null => "null",
            JsonType::Boolean => "boolean",
            JsonType::Number => "number",
            JsonType::String => "string",
            JsonType::Array => "array",
            JsonType::Object => "object",
            JsonType::Absent => "absent",
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons a wire record was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("ast: unable to unmarshal Negated field with type: {actual} (expected true or false)")]
    Negated { actual: JsonType },

    #[error("ast: unable to unmarshal Terms field with type: {actual} (expected {shapes})", shapes = TERMS_SHAPES)]
    Terms { actual: JsonType },

    #[error("ast: unable to unmarshal Index field with type: {actual} (expected integer)")]
    Index { actual: JsonType },

    /// A tagged term record is malformed. `path` locates it, e.g. `Terms[0].Value[1]`.
    #[error("ast: unable to unmarshal term{}: {reason}", at(.path))]
    Term { path: String, reason: String },

    #[error("ast: unable to unmarshal {field} field with type: {actual} (expected {expected})")]
    Field {
        field: &'static str,
        actual: JsonType,
        expected: &'static str,
    },

    #[error("ast: unable to unmarshal {node} from type: {actual} (expected object)")]
    Node {
        node: &'static str,
        actual: JsonType,
    },

    #[error("ast: unable to unmarshal JSON: {0}")]
    Json(String),
}

fn at(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!(" at {path}")
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(error: serde_json::Error) -> Self {
        CodecError::Json(error.to_string())
    }
}
