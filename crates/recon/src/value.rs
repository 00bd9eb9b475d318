//! Closed value model for desired and observed standard settings.
//!
//! Template settings and scan results arrive as loosely-typed JSON. They are
//! converted once, at the boundary, into [`Value`]; everything downstream
//! matches on the variants exhaustively instead of probing shapes.

use std::collections::BTreeMap;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A setting value as declared by a template or recorded by a scan.
///
/// Equality is structural: mapping keys are order-insensitive (they are
/// stored sorted), numbers compare by numeric value, and labeled values
/// compare on both `value` and `label`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Scalar(Scalar),
    List(Vec<Value>),
    Structured(BTreeMap<String, Value>),
    /// A `{value, label}` display object as emitted by select inputs.
    Labeled { value: Box<Value>, label: String },
}

#[derive(Debug, Clone)]
pub enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => numbers_equal(a, b),
            _ => false,
        }
    }
}

fn numbers_equal(a: &serde_json::Number, b: &serde_json::Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    a.as_f64() == b.as_f64()
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Scalar(Scalar::Text(s.into()))
    }

    pub fn number(n: impl Into<serde_json::Number>) -> Self {
        Self::Scalar(Scalar::Number(n.into()))
    }

    pub fn structured<K: Into<String>>(fields: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self::Structured(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn labeled(value: Value, label: impl Into<String>) -> Self {
        Self::Labeled {
            value: Box::new(value),
            label: label.into(),
        }
    }

    pub fn as_structured(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Structured(fields) => Some(fields),
            _ => None,
        }
    }

    /// An empty mapping: the template declares the standard but sets nothing.
    pub fn is_empty_settings(&self) -> bool {
        matches!(self, Self::Structured(fields) if fields.is_empty())
    }

    /// Short shape name, used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Scalar(Scalar::Text(_)) => "text",
            Self::Scalar(Scalar::Number(_)) => "number",
            Self::List(_) => "list",
            Self::Structured(_) => "structured",
            Self::Labeled { .. } => "labeled",
        }
    }

    /// Compact JSON with sorted mapping keys and normalized numbers. Two
    /// values are equal exactly when their canonical forms are equal.
    pub fn canonical_json(&self) -> String {
        // Serializing this type cannot fail: every key is a string and
        // non-finite floats are unrepresentable in serde_json::Number.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Human-readable rendering for side-by-side reports.
    pub fn display_text(&self) -> String {
        match self {
            Self::Bool(true) => "Enabled".into(),
            Self::Bool(false) => "Disabled".into(),
            Self::Labeled { label, .. } => label.clone(),
            Self::Scalar(Scalar::Text(s)) => s.clone(),
            Self::Scalar(Scalar::Number(n)) => n.to_string(),
            Self::Null => "null".into(),
            Self::List(_) | Self::Structured(_) => self.canonical_json(),
        }
    }
}

// ---------------------------------------------------------------------------
// JSON boundary
// ---------------------------------------------------------------------------

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Scalar(Scalar::Number(n)),
            serde_json::Value::String(s) => Self::Scalar(Scalar::Text(s)),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(mut fields) => {
                let is_label_object = fields.len() == 2
                    && fields.contains_key("value")
                    && matches!(fields.get("label"), Some(serde_json::Value::String(_)));
                if is_label_object {
                    let label = match fields.remove("label") {
                        Some(serde_json::Value::String(label)) => label,
                        _ => String::new(),
                    };
                    let value = fields.remove("value").map(Value::from).unwrap_or(Value::Null);
                    return Self::labeled(value, label);
                }
                Self::Structured(fields.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Scalar(Scalar::Text(s)) => serializer.serialize_str(s),
            Self::Scalar(Scalar::Number(n)) => serialize_number(n, serializer),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Structured(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (k, v) in fields {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Self::Labeled { value, label } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("label", label)?;
                map.serialize_entry("value", value)?;
                map.end()
            }
        }
    }
}

/// Integral floats are written as integers so `14` and `14.0` share one form.
fn serialize_number<S: Serializer>(n: &serde_json::Number, serializer: S) -> Result<S::Ok, S::Error> {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

    if let Some(i) = n.as_i64() {
        return serializer.serialize_i64(i);
    }
    if let Some(u) = n.as_u64() {
        return serializer.serialize_u64(u);
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < MAX_EXACT => serializer.serialize_i64(f as i64),
        Some(f) => serializer.serialize_f64(f),
        None => serializer.serialize_unit(),
    }
}
