//! Core types and algorithms for sluice.
//!
//! Maps schemaless JSON records onto relational columns and describes the
//! resulting schema back to schema-driven clients. This crate has no database
//! dependency; storage backends (e.g. `sluice-store-sqlite`) implement
//! [`store::RecordStore`] on top of it.

pub mod affinity;
pub mod analyze;
pub mod error;
pub mod format;
pub mod kind;
pub mod record;
pub mod schema;
pub mod shape;
pub mod store;
pub mod value;

pub use affinity::Affinity;
pub use error::{Error, Result};
pub use kind::ValueKind;
pub use value::Value;
