use super::sink::FieldSink;
use crate::config::BuilderOptions;
use crate::error::{FlatError, SchemaError};
use crate::schema::{ScalarType, SchemaRegistry};
use crate::view::{FieldValue, TableView};

// ─── Decode ─────────────────────────────────────────────────────────────────

/// Rebuild a dynamic object from a table view.
///
/// Absent scalars come out as their default, absent strings, vectors and
/// tables are omitted. Deprecated fields are skipped. Table chains deeper
/// than the default `max_depth` fail with `FlatError::Nesting`.
pub fn decode_table<V: FieldSink>(view: &TableView<'_>) -> Result<V, SchemaError> {
    decode_table_at(view, 0, BuilderOptions::default().max_depth)
}

/// Like [`decode_table`] with an explicit nesting limit.
pub fn decode_table_with_depth<V: FieldSink>(view: &TableView<'_>, max_depth: usize) -> Result<V, SchemaError> {
    decode_table_at(view, 0, max_depth)
}

fn decode_table_at<V: FieldSink>(view: &TableView<'_>, depth: usize, max_depth: usize) -> Result<V, SchemaError> {
    if depth >= max_depth {
        return Err(FlatError::Nesting("table nesting exceeds max_depth").into());
    }
    let schema = view.schema();
    let mut entries = Vec::with_capacity(schema.fields().len());
    for field in schema.fields() {
        if field.deprecated {
            continue;
        }
        let Some(value) = view.get_field(field)? else {
            continue;
        };
        let out = match value {
            FieldValue::Scalar(v) => V::from_scalar(v),
            FieldValue::Str(s) => V::from_str(s),
            FieldValue::Vector(v) if v.elem_type() == ScalarType::UByte => V::from_bytes(v.as_bytes()),
            FieldValue::Vector(v) => V::from_array(v.iter().map(V::from_scalar).collect()),
            FieldValue::Table(t) => decode_table_at(&t, depth + 1, max_depth)?,
        };
        entries.push((field.name.as_str(), out));
    }
    Ok(V::from_object(entries))
}

/// Decode the root table of `buf` as type `name`.
pub fn decode_value<V: FieldSink>(buf: &[u8], registry: &SchemaRegistry, name: &str) -> Result<V, SchemaError> {
    let view = TableView::root(buf, registry, name)?;
    decode_table(&view)
}

/// Decode the root table of `buf` to JSON text.
pub fn decode_to_json(buf: &[u8], registry: &SchemaRegistry, name: &str) -> Result<String, SchemaError> {
    let value: serde_json::Value = decode_value(buf, registry, name)?;
    Ok(serde_json::to_string(&value)?)
}

/// Decode the root table of `buf` to CBOR bytes.
pub fn decode_to_cbor(buf: &[u8], registry: &SchemaRegistry, name: &str) -> Result<Vec<u8>, SchemaError> {
    let value: cbor4ii::core::Value = decode_value(buf, registry, name)?;
    let mut out = Vec::new();
    cbor4ii::serde::to_writer(&mut out, &value).map_err(|e| SchemaError::CborError(e.to_string()))?;
    Ok(out)
}
