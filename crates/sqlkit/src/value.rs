//! Bound values and ordered property maps.

use crate::condition::Condition;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use uuid::Uuid;

/// A value bound into a statement.
///
/// Depending on the builder's binding policy a value is either written inline
/// as a literal or replaced by a placeholder and recorded as a parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    Uuid(Uuid),
    Json(serde_json::Value),
    /// A nested condition or expression, rendered in place of a literal.
    Condition(Box<Condition>),
    /// Deferred binding: emits a bare placeholder and records no parameter.
    Placeholder,
}

impl Value {
    /// Wrap a raw expression (`NOW()`, `count + 1`, ...) that is emitted verbatim.
    pub fn expr(text: impl Into<String>) -> Self {
        Value::Condition(Box::new(Condition::expr(text)))
    }

    /// Check if this value is the placeholder marker.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Value::Placeholder)
    }

    /// Write this value as a dialect literal.
    ///
    /// Conditions and placeholders are not literals and are handled by the
    /// renderer before reaching this point.
    pub(crate) fn write_literal(&self, out: &mut String) {
        match self {
            Value::Null => out.push_str("null"),
            Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Int(i) => {
                let _ = write!(out, "{i}");
            }
            Value::Float(f) => {
                let _ = write!(out, "{f}");
            }
            Value::Text(s) => push_quoted(out, s),
            Value::Date(d) => {
                let _ = write!(out, "'{}'", d.format("%Y-%m-%d"));
            }
            Value::Timestamp(ts) => {
                let _ = write!(out, "'{}'", ts.format("%Y-%m-%d %H:%M:%S%.f"));
            }
            Value::TimestampTz(ts) => {
                let _ = write!(out, "'{}'", ts.format("%Y-%m-%d %H:%M:%S%.f%:z"));
            }
            Value::Uuid(u) => {
                let _ = write!(out, "'{u}'");
            }
            Value::Json(j) => push_quoted(out, &j.to_string()),
            Value::Condition(c) => {
                // Only expressions can be written without a render context.
                if let Condition::Expression(text) = c.as_ref() {
                    out.push_str(text);
                }
            }
            Value::Placeholder => out.push('?'),
        }
    }
}

fn push_quoted(out: &mut String, s: &str) {
    out.push('\'');
    for ch in s.chars() {
        if ch == '\'' {
            out.push('\'');
        }
        out.push(ch);
    }
    out.push('\'');
}

macro_rules! value_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(v as i64)
            }
        })*
    };
}

value_from_int!(i8, i16, i32, i64, u8, u16, u32, isize);

// Out-of-range integers keep their exact digits as text.
macro_rules! value_from_wide_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                match i64::try_from(v) {
                    Ok(i) => Value::Int(i),
                    Err(_) => Value::Text(v.to_string()),
                }
            }
        })*
    };
}

value_from_wide_int!(u64, i128, u128);

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::from(v as u64)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::TimestampTz(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl From<Condition> for Value {
    fn from(v: Condition) -> Self {
        Value::Condition(Box::new(v))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

/// An ordered property → value map.
///
/// Insertion order is kept so rendered column lists are deterministic.
/// Setting an existing property replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Props {
    entries: Vec<(String, Value)>,
}

impl Props {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property (chainable).
    pub fn set(mut self, prop: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(prop, value);
        self
    }

    /// Set a property in place.
    pub fn insert(&mut self, prop: impl Into<String>, value: impl Into<Value>) {
        let prop = prop.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == prop) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((prop, value)),
        }
    }

    /// Look up a property value.
    pub fn get(&self, prop: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == prop).map(|(_, v)| v)
    }

    /// Property names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Props
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut props = Props::new();
        for (k, v) in iter {
            props.insert(k, v);
        }
        props
    }
}

impl IntoIterator for Props {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(v: impl Into<Value>) -> String {
        let mut out = String::new();
        v.into().write_literal(&mut out);
        out
    }

    #[test]
    fn literals_quote_text_and_dates() {
        assert_eq!(literal(42), "42");
        assert_eq!(literal(true), "true");
        assert_eq!(literal("O'Brien"), "'O''Brien'");
        assert_eq!(literal(Option::<i32>::None), "null");

        let d = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(literal(d), "'2024-02-29'");
        let ts = d.and_hms_opt(13, 5, 9).unwrap();
        assert_eq!(literal(ts), "'2024-02-29 13:05:09'");
    }

    #[test]
    fn literal_expression_is_verbatim() {
        assert_eq!(literal(Value::expr("NOW()")), "NOW()");
    }

    #[test]
    fn props_keep_insertion_order_and_replace_in_place() {
        let props = Props::new()
            .set("lastName", "Doe")
            .set("firstName", "Jane")
            .set("lastName", "Roe");

        assert_eq!(props.keys().collect::<Vec<_>>(), vec!["lastName", "firstName"]);
        assert_eq!(props.get("lastName"), Some(&Value::Text("Roe".into())));
        assert_eq!(props.len(), 2);
    }

    #[test]
    fn large_unsigned_falls_back_to_text() {
        assert_eq!(Value::from(u64::MAX), Value::Text(u64::MAX.to_string()));
        assert_eq!(Value::from(7u64), Value::Int(7));
    }

    #[test]
    fn wide_integers_fit_or_fall_back_to_text() {
        assert_eq!(Value::from(-5i128), Value::Int(-5));
        assert_eq!(Value::from(42u128), Value::Int(42));
        assert_eq!(Value::from(i128::MIN), Value::Text(i128::MIN.to_string()));
        assert_eq!(Value::from(u128::MAX), Value::Text(u128::MAX.to_string()));
    }
}
