//! Value kinds observed inside embedded JSON.
//!
//! Distinct from [`Affinity`](crate::Affinity): kinds describe what a parsed
//! JSON document contains, not how a column is stored.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Display,
  EnumString,
  Serialize,
  Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
  Null,
  Boolean,
  Integer,
  Real,
  String,
  Object,
  Array,
  /// Not produced by the JSON parser; accepted when reading schema JSON
  /// written by other tools.
  Other,
}

pub fn value_kind(value: &serde_json::Value) -> ValueKind {
  match value {
    serde_json::Value::Null => ValueKind::Null,
    serde_json::Value::Bool(_) => ValueKind::Boolean,
    serde_json::Value::Number(n) if n.is_f64() => ValueKind::Real,
    serde_json::Value::Number(_) => ValueKind::Integer,
    serde_json::Value::String(_) => ValueKind::String,
    serde_json::Value::Array(_) => ValueKind::Array,
    serde_json::Value::Object(_) => ValueKind::Object,
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn classifies_json_values() {
    assert_eq!(value_kind(&json!(null)), ValueKind::Null);
    assert_eq!(value_kind(&json!(false)), ValueKind::Boolean);
    assert_eq!(value_kind(&json!(12)), ValueKind::Integer);
    assert_eq!(value_kind(&json!(u64::MAX)), ValueKind::Integer);
    assert_eq!(value_kind(&json!(1.0)), ValueKind::Real);
    assert_eq!(value_kind(&json!("s")), ValueKind::String);
    assert_eq!(value_kind(&json!([])), ValueKind::Array);
    assert_eq!(value_kind(&json!({})), ValueKind::Object);
  }

  #[test]
  fn kind_names_round_trip() {
    assert_eq!(ValueKind::Boolean.to_string(), "boolean");
    assert_eq!("other".parse::<ValueKind>().unwrap(), ValueKind::Other);
    assert_eq!(
      serde_json::to_string(&ValueKind::Real).unwrap(),
      "\"real\""
    );
  }
}
