#[allow(clippy::module_inception)]
mod builder;
mod object_op;
pub mod vtable_cache;
mod write_op;

pub use builder::FlatBuilder;
pub use vtable_cache::VTableCache;
