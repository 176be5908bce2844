mod definition;
mod types;

pub use definition::{FieldDef, Schema, SchemaRegistry};
pub use types::{FieldType, ScalarType, ScalarValue};
