pub mod buffer;
pub mod builder;
pub mod config;
pub mod error;
pub mod events;
pub mod schema;
pub mod table;
pub mod types;
pub mod value;
pub mod view;

pub use builder::FlatBuilder;
pub use config::BuilderOptions;
pub use error::{FlatError, SchemaError};
pub use events::{ImageReceivedEvent, ImageReceivedEventArgs, ImageReceivedEventBuilder};
pub use schema::{FieldDef, FieldType, ScalarType, ScalarValue, Schema, SchemaRegistry};
pub use table::{Table, root_table};
pub use types::Offset;
pub use view::{FieldValue, TableView};
