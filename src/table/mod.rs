mod read_op;
#[allow(clippy::module_inception)]
mod table;
mod vector;

pub use table::{buffer_has_identifier, root_table, size_prefixed_root_table, Table, VTable};
pub use vector::{Vector, VectorIter};
