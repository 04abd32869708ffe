//! Storage affinities and their escalation order.
//!
//! Affinities form a join-semilattice `INTEGER < REAL < TEXT`: a column's
//! affinity is the join over every value observed for it.

use strum::{Display, IntoStaticStr};

use crate::value::Value;

/// Declared storage type of an inferred column.
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
  IntoStaticStr,
)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Affinity {
  Integer,
  Real,
  Text,
}

impl Affinity {
  /// Least affinity able to hold values of both `self` and `other`.
  ///
  /// Variant order is the escalation order, so the join is the maximum.
  pub fn merge(self, other: Affinity) -> Affinity { self.max(other) }

  pub fn as_sql(self) -> &'static str { self.into() }
}

/// Affinity of a single value.
///
/// Nulls start at the bottom of the lattice so they never force escalation;
/// booleans are stored as `0`/`1`.
pub fn affinity_of(value: &Value) -> Affinity {
  match value {
    Value::Null | Value::Bool(_) | Value::Int(_) => Affinity::Integer,
    Value::Float(_) => Affinity::Real,
    Value::Text(_) | Value::Bytes(_) | Value::Composite(_) => Affinity::Text,
  }
}

pub fn merge(a: Affinity, b: Affinity) -> Affinity { a.merge(b) }
