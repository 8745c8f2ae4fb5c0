//! Tagged value model for generation.
//!
//! GML data structures can hold strings, numbers, maps, and lists; nothing
//! else. Instead of inspecting `serde_json::Value` variants all over the
//! emitter, we convert once into this four-way enum and let booleans and
//! nulls fail loudly at the conversion boundary, with a document path in
//! the error.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum DsValue {
    String(String),
    Number(serde_json::Number),
    Array(Vec<DsValue>),
    /// Key/value pairs in document order (serde_json is built with
    /// `preserve_order`, so the parser hands us insertion order already).
    Object(Vec<(String, DsValue)>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

#[derive(Debug, thiserror::Error)]
pub enum GenError {
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Booleans and nulls have no ds_map/ds_list representation here.
    #[error("unsupported {kind} value at {path}")]
    Unsupported { kind: ValueKind, path: String },

    #[error("root value must be an object, found {0}")]
    NonObjectRoot(ValueKind),
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "boolean",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        };
        f.write_str(name)
    }
}

impl DsValue {
    pub fn from_json(value: &Value) -> Result<DsValue, GenError> {
        convert_at(value, &mut Vec::new())
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            DsValue::String(_) => ValueKind::String,
            DsValue::Number(_) => ValueKind::Number,
            DsValue::Array(_) => ValueKind::Array,
            DsValue::Object(_) => ValueKind::Object,
        }
    }
}

fn convert_at(value: &Value, path: &mut Vec<String>) -> Result<DsValue, GenError> {
    match value {
        Value::String(s) => Ok(DsValue::String(s.clone())),
        Value::Number(n) => Ok(DsValue::Number(n.clone())),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                path.push(index.to_string());
                out.push(convert_at(item, path)?);
                path.pop();
            }
            Ok(DsValue::Array(out))
        }
        Value::Object(fields) => {
            let mut out = Vec::with_capacity(fields.len());
            for (key, field) in fields {
                path.push(key.clone());
                out.push((key.clone(), convert_at(field, path)?));
                path.pop();
            }
            Ok(DsValue::Object(out))
        }
        Value::Null | Value::Bool(_) => Err(GenError::Unsupported {
            kind: ValueKind::of(value),
            path: render_path(path),
        }),
    }
}

fn render_path(path: &[String]) -> String {
    if path.is_empty() {
        "the document root".to_string()
    } else {
        format!("/{}", path.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_keys_keep_document_order() {
        let parsed: Value =
            serde_json::from_str(r#"{"zebra": 1, "apple": 2, "mango": 3}"#).unwrap();
        let DsValue::Object(fields) = DsValue::from_json(&parsed).unwrap() else {
            panic!("expected an object");
        };
        let keys: Vec<&str> = fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["zebra", "apple", "mango"]);
    }

    #[test]
    fn boolean_reports_its_document_path() {
        let parsed: Value =
            serde_json::from_str(r#"{"player": {"flags": [1, true]}}"#).unwrap();
        let err = DsValue::from_json(&parsed).unwrap_err();
        match err {
            GenError::Unsupported { kind, path } => {
                assert_eq!(kind, ValueKind::Bool);
                assert_eq!(path, "/player/flags/1");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn null_at_the_root_is_unsupported() {
        let err = DsValue::from_json(&Value::Null).unwrap_err();
        match err {
            GenError::Unsupported { kind, path } => {
                assert_eq!(kind, ValueKind::Null);
                assert_eq!(path, "the document root");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
