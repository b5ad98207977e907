//! # molset-core
//!
//! Core types for turning atomic structures into training records.
//!
//! This crate provides:
//! - [`DType`] — field element types (f16 … f64, u8, u32, i32, i64)
//! - [`Shape`] / [`SymbolicShape`] — concrete shapes and schema shape patterns
//!   with wildcard and named per-record dimensions
//! - [`Value`] / [`Record`] — tagged numeric arrays and the records built from them
//! - [`Schema`] — declared field set, [`default_schema`], JSON descriptors,
//!   record validation and dtype coercion
//! - [`element`] — symbol ↔ atomic number lookup
//! - [`Error`] — the single error type shared by all molset crates

pub mod dtype;
pub mod dynamic_shape;
pub mod element;
pub mod error;
pub mod record;
pub mod schema;
pub mod shape;
pub mod value;

pub use dtype::{DType, WithDType};
pub use dynamic_shape::{ShapeEnv, SymDim, SymbolicShape};
pub use error::{Error, Result, SchemaProblem};
pub use record::Record;
pub use schema::{default_schema, FieldSpec, Schema, ATOMS, CELL, COORD, E_DATA, ELEMS, F_DATA};
pub use shape::Shape;
pub use value::{Data, Value};
