mod decode;
mod encode;
mod sink;
mod source;

pub use decode::{decode_table, decode_table_with_depth, decode_to_cbor, decode_to_json, decode_value};
pub use encode::{encode_cbor_bytes, encode_json_str, encode_table, encode_value};
pub use sink::FieldSink;
pub use source::FieldSource;

#[cfg(test)]
mod tests;
