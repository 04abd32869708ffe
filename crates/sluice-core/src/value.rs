//! The stored-value sum type.
//!
//! Record cells arrive as arbitrary JSON. Before they reach a column they are
//! classified into one of a handful of storage shapes; composite values
//! (arrays and objects) are carried as their compact JSON text.

use serde_json::Number;

/// A single record cell, in the shape it will be stored.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  Null,
  Bool(bool),
  Int(i64),
  Float(f64),
  Text(String),
  Bytes(Vec<u8>),
  /// An array or object, serialized as compact JSON.
  Composite(String),
}

impl From<&serde_json::Value> for Value {
  fn from(v: &serde_json::Value) -> Self {
    match v {
      serde_json::Value::Null => Value::Null,
      serde_json::Value::Bool(b) => Value::Bool(*b),
      serde_json::Value::Number(n) => from_number(n),
      serde_json::Value::String(s) => Value::Text(s.clone()),
      serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
        Value::Composite(v.to_string())
      }
    }
  }
}

/// Integers outside the `i64` range are coerced to floating point; the
/// record's raw JSON keeps the exact digits.
fn from_number(n: &Number) -> Value {
  if let Some(i) = n.as_i64() {
    Value::Int(i)
  } else if let Some(f) = n.as_f64() {
    Value::Float(f)
  } else {
    Value::Text(n.to_string())
  }
}
