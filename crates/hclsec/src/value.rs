//! value representation
//!
//! An attribute resolves to one of three states:
//! - [Value::Known]: the literal is fully determined by the static configuration
//! - [Value::Unknown]: the value depends on something only available at apply time
//!   (data sources, computed resource attributes, function calls, reference cycles, ...)
//! - [Value::Absent]: nothing was declared (or it was explicitly set to `null`)
//!
//! The literal model contains the following data types
//! - null (only nested inside lists or maps, a top-level `null` is [Value::Absent])
//! - boolean (true/false)
//! - integer (signed, i64)
//! - decimal (f64)
//! - string (utf-8)
//! - array ("list" of literals)
//! - object (order-preserving "map"/"dictionary", where the key is of type string)
//!
//! Typed accessors only ever answer for [Value::Known]. Everything else is "cannot decide" and
//! every predicate returns `false`.
use serde::{
    ser::{SerializeMap, SerializeSeq},
    Serializer,
};

/// Resolution state of an attribute
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    Known(Literal),
    Unknown,
    #[default]
    Absent,
}

impl Value {
    pub fn is_known(&self) -> bool {
        matches!(self, Value::Known(_))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown)
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Value::Known(literal) => Some(literal),
            Value::Unknown | Value::Absent => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self.as_literal()? {
            Literal::String(value) => Some(value),
            _ => None,
        }
    }

    /// Boolean view of the value
    ///
    /// The strings `"true"` and `"false"` are converted the same way terraform converts them.
    pub fn as_bool(&self) -> Option<bool> {
        match self.as_literal()? {
            Literal::Boolean(value) => Some(*value),
            Literal::String(value) if value == "true" => Some(true),
            Literal::String(value) if value == "false" => Some(false),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self.as_literal()? {
            Literal::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.as_literal()? {
            Literal::Integer(value) => Some(*value as f64),
            Literal::Decimal(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Literal]> {
        match self.as_literal()? {
            Literal::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&indexmap::IndexMap<String, Literal>> {
        match self.as_literal()? {
            Literal::Object(values) => Some(values),
            _ => None,
        }
    }
}

impl From<Literal> for Value {
    fn from(value: Literal) -> Self {
        Value::Known(value)
    }
}

impl From<hcl::Value> for Value {
    fn from(value: hcl::Value) -> Self {
        match value {
            hcl::Value::Null => Value::Absent,
            other => Value::Known(other.into()),
        }
    }
}

/// All possible literal types
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i64),
    Decimal(f64),
    String(String),
    Array(Vec<Literal>),
    Object(indexmap::IndexMap<String, Literal>),
}

impl Literal {
    pub fn is_empty(&self) -> bool {
        match self {
            Literal::Null => true,
            Literal::String(value) => value.is_empty(),
            Literal::Array(values) => values.is_empty(),
            Literal::Object(values) => values.is_empty(),
            Literal::Boolean(_) | Literal::Integer(_) | Literal::Decimal(_) => false,
        }
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::String(value)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::String(value.to_string())
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

impl From<hcl::Number> for Literal {
    fn from(value: hcl::Number) -> Self {
        if let Some(int) = value.as_i64() {
            return Literal::Integer(int);
        }

        // u64 beyond i64::MAX ends up here as well
        Literal::Decimal(value.as_f64().unwrap_or(f64::NAN))
    }
}

impl<T: Into<Literal>> From<Vec<T>> for Literal {
    fn from(value: Vec<T>) -> Self {
        Literal::Array(value.into_iter().map(Into::into).collect())
    }
}

impl<K: ToString, V: Into<Literal>> From<hcl::value::Map<K, V>> for Literal {
    fn from(value: hcl::value::Map<K, V>) -> Self {
        Literal::Object(
            value
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.into()))
                .collect(),
        )
    }
}

impl From<hcl::Value> for Literal {
    fn from(value: hcl::Value) -> Literal {
        match value {
            hcl::Value::Null => Literal::Null,
            hcl::Value::Bool(b) => b.into(),
            hcl::Value::Number(n) => n.into(),
            hcl::Value::String(s) => s.into(),
            hcl::Value::Array(a) => a.into(),
            hcl::Value::Object(o) => o.into(),
        }
    }
}

/// Turn a literal back into an expression so it can be substituted into a traversal
impl From<Literal> for hcl::Expression {
    fn from(value: Literal) -> Self {
        use hcl::Expression;

        match value {
            Literal::Null => Expression::Null,
            Literal::Boolean(b) => Expression::Bool(b),
            Literal::Integer(i) => Expression::Number(i.into()),
            Literal::Decimal(f) => hcl::Number::from_f64(f)
                .map(Expression::Number)
                .unwrap_or(Expression::Null),
            Literal::String(s) => Expression::String(s),
            Literal::Array(a) => Expression::Array(a.into_iter().map(Into::into).collect()),
            Literal::Object(o) => Expression::Object(
                o.into_iter()
                    .map(|(k, v)| {
                        (
                            hcl::ObjectKey::Expression(Expression::String(k)),
                            Expression::from(v),
                        )
                    })
                    .collect(),
            ),
        }
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered = serde_json::to_string(self).map_err(|_| std::fmt::Error)?;
        f.write_str(&rendered)
    }
}

impl serde::ser::Serialize for Literal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Literal::Null => serializer.serialize_unit(),
            Literal::Boolean(value) => serializer.serialize_bool(*value),
            Literal::Integer(value) => serializer.serialize_i64(*value),
            Literal::Decimal(value) => serializer.serialize_f64(*value),
            Literal::String(value) => serializer.serialize_str(value),
            Literal::Array(value) => {
                let mut ser = serializer.serialize_seq(Some(value.len()))?;
                for element in value {
                    ser.serialize_element(element)?;
                }
                ser.end()
            }
            Literal::Object(value) => {
                let mut ser = serializer.serialize_map(Some(value.len()))?;
                for (element_key, element_value) in value {
                    ser.serialize_entry(element_key, element_value)?;
                }
                ser.end()
            }
        }
    }
}

/// `Unknown` is rendered as a marker string, `Absent` as `null`
impl serde::ser::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Known(literal) => literal.serialize(serializer),
            Value::Unknown => serializer.serialize_str("(unknown)"),
            Value::Absent => serializer.serialize_unit(),
        }
    }
}
