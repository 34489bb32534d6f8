pub mod bundled;
pub mod document;
pub mod schema;

pub use document::{Document, Section};
pub use schema::{CellKind, Field, FieldValue, RowAddress, RowDescriptor};
