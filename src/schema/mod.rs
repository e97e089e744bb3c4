//! Index schema definition.
//!
//! Fields are added by name with a boxed [`FieldType`]; the schema keeps
//! them in insertion order, which is the order sent to `FT.CREATE`.

pub mod field;
#[allow(clippy::module_inception)]
pub mod schema;

pub use field::{FieldType, GeoField, NumericField, PhoneticMatcher, TagField, TextField};
pub use schema::{IndexDefinition, IndexOptions, Schema, SchemaBuilder};
