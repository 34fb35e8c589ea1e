//! Data model for the DGII e-CF document builders.
//!
//! An input row is an insertion-ordered mapping from spreadsheet column
//! names to loosely-typed [`CellValue`]s. This crate centralizes the schema
//! forgiveness the builders rely on: sentinel "empty" markers, whitespace
//! variants of column headers, case-insensitive lookup, and bracket-indexed
//! repeating groups (`NumeroLinea[3]`, `MontoSubDescuento[2][1]`).

pub mod cell;
pub mod doc_type;
pub mod error;
pub mod row;

pub use cell::{CellValue, EMPTY_MARKERS};
pub use doc_type::DocumentType;
pub use error::{BuildError, Result};
pub use row::{Row, collect_indexed, indexed, indexed2};
