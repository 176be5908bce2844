use super::source::FieldSource;
use crate::builder::FlatBuilder;
use crate::error::{FlatError, SchemaError};
use crate::schema::{FieldDef, FieldType, ScalarType, ScalarValue, Schema, SchemaRegistry};
use crate::types::{Offset, TableMarker};
use log::warn;

// ─── Scalar dispatch ────────────────────────────────────────────────────────

/// Add a coerced scalar as the concrete type `ty` names.
fn add_scalar(
    b: &mut FlatBuilder,
    slot: u16,
    ty: ScalarType,
    value: ScalarValue,
    default: ScalarValue,
) -> Result<(), FlatError> {
    match ty {
        ScalarType::Bool => b.add_field(slot, value.as_bool(), default.as_bool()),
        ScalarType::Byte => b.add_field(slot, value.as_i64() as i8, default.as_i64() as i8),
        ScalarType::UByte => b.add_field(slot, value.as_u64() as u8, default.as_u64() as u8),
        ScalarType::Short => b.add_field(slot, value.as_i64() as i16, default.as_i64() as i16),
        ScalarType::UShort => b.add_field(slot, value.as_u64() as u16, default.as_u64() as u16),
        ScalarType::Int => b.add_field(slot, value.as_i64() as i32, default.as_i64() as i32),
        ScalarType::UInt => b.add_field(slot, value.as_u64() as u32, default.as_u64() as u32),
        ScalarType::Long => b.add_field(slot, value.as_i64(), default.as_i64()),
        ScalarType::ULong => b.add_field(slot, value.as_u64(), default.as_u64()),
        ScalarType::Float => b.add_field(slot, value.as_f64() as f32, default.as_f64() as f32),
        ScalarType::Double => b.add_field(slot, value.as_f64(), default.as_f64()),
    }
}

macro_rules! typed_vector {
    ($b:expr, $values:expr, $t:ty, $conv:ident) => {{
        let items: Vec<$t> = $values.iter().map(|v| v.$conv() as $t).collect();
        $b.create_vector(&items)?.as_untyped()
    }};
}

fn create_scalar_vector(
    b: &mut FlatBuilder,
    elem: ScalarType,
    values: &[ScalarValue],
) -> Result<Offset<()>, FlatError> {
    Ok(match elem {
        ScalarType::Bool => {
            let items: Vec<bool> = values.iter().map(|v| v.as_bool()).collect();
            b.create_vector(&items)?.as_untyped()
        }
        ScalarType::Byte => typed_vector!(b, values, i8, as_i64),
        ScalarType::UByte => typed_vector!(b, values, u8, as_u64),
        ScalarType::Short => typed_vector!(b, values, i16, as_i64),
        ScalarType::UShort => typed_vector!(b, values, u16, as_u64),
        ScalarType::Int => typed_vector!(b, values, i32, as_i64),
        ScalarType::UInt => typed_vector!(b, values, u32, as_u64),
        ScalarType::Long => typed_vector!(b, values, i64, as_i64),
        ScalarType::ULong => typed_vector!(b, values, u64, as_u64),
        ScalarType::Float => typed_vector!(b, values, f32, as_f64),
        ScalarType::Double => typed_vector!(b, values, f64, as_f64),
    })
}

/// Read `item` as a value of `ty`, range checked.
fn coerce_scalar<V: FieldSource>(field: &FieldDef, ty: ScalarType, item: &V) -> Result<ScalarValue, SchemaError> {
    let mismatch = || SchemaError::TypeMismatch {
        field: field.name.clone(),
        expected: ty.name(),
    };
    let raw = item.as_scalar().ok_or_else(mismatch)?;
    if matches!(raw, ScalarValue::Bool(_)) != (ty == ScalarType::Bool) {
        return Err(mismatch());
    }
    ty.coerce(raw)
        .ok_or_else(|| SchemaError::ValueOutOfRange(field.name.clone()))
}

fn encode_vector<V: FieldSource>(
    b: &mut FlatBuilder,
    field: &FieldDef,
    elem: ScalarType,
    item: &V,
) -> Result<Offset<()>, SchemaError> {
    if elem == ScalarType::UByte {
        if let Some(bytes) = item.as_bytes() {
            return Ok(b.create_byte_vector(bytes)?.as_untyped());
        }
    }
    let items = item.as_array().ok_or_else(|| SchemaError::TypeMismatch {
        field: field.name.clone(),
        expected: "array",
    })?;
    let values = items
        .iter()
        .map(|i| coerce_scalar(field, elem, i))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(create_scalar_vector(b, elem, &values)?)
}

// ─── Encode ─────────────────────────────────────────────────────────────────

/// Write `value` as a table of type `schema` and return its offset.
///
/// Strings, vectors and nested tables are written first, then the table
/// itself. Scalars equal to their default are left out.
pub fn encode_table<V: FieldSource>(
    b: &mut FlatBuilder,
    registry: &SchemaRegistry,
    schema: &Schema,
    value: &V,
) -> Result<Offset<TableMarker>, SchemaError> {
    encode_table_at(b, registry, schema, value, 0)
}

fn encode_table_at<V: FieldSource>(
    b: &mut FlatBuilder,
    registry: &SchemaRegistry,
    schema: &Schema,
    value: &V,
    depth: usize,
) -> Result<Offset<TableMarker>, SchemaError> {
    if depth >= b.options().max_depth {
        return Err(FlatError::Nesting("object nesting exceeds max_depth").into());
    }
    let entries = value.object_entries().ok_or_else(|| SchemaError::TypeMismatch {
        field: schema.name.clone(),
        expected: "object",
    })?;

    let mut offsets: Vec<(u16, Offset<()>)> = Vec::new();
    let mut scalars: Vec<(u16, ScalarType, ScalarValue, ScalarValue)> = Vec::new();
    let mut seen: Vec<u16> = Vec::with_capacity(entries.len());

    // 1. Children
    for (key, item) in entries {
        let field = schema.field(key).ok_or_else(|| SchemaError::UnknownField {
            table: schema.name.clone(),
            field: key.into(),
        })?;
        // CBOR maps may repeat a key; each field is written at most once.
        if seen.contains(&field.slot()) {
            return Err(SchemaError::DuplicateField {
                table: schema.name.clone(),
                field: field.name.clone(),
            });
        }
        seen.push(field.slot());
        if item.is_null() {
            continue;
        }
        if field.deprecated {
            warn!("{}.{} is deprecated, value not written", schema.name, field.name);
            continue;
        }
        let slot = field.slot();
        match &field.ty {
            FieldType::Scalar(ty) => {
                let value = coerce_scalar(field, *ty, item)?;
                let default = field.default_scalar().unwrap_or_else(|| ty.zero());
                scalars.push((slot, *ty, value, default));
            }
            FieldType::String => {
                let text = item.as_str().ok_or_else(|| SchemaError::TypeMismatch {
                    field: field.name.clone(),
                    expected: "string",
                })?;
                offsets.push((slot, b.create_string(text)?.as_untyped()));
            }
            FieldType::Vector(elem) => {
                offsets.push((slot, encode_vector(b, field, *elem, item)?));
            }
            FieldType::Table(name) => {
                let child = registry.get(name)?;
                let off = encode_table_at(b, registry, child, item, depth + 1)?;
                offsets.push((slot, off.as_untyped()));
            }
        }
    }

    for field in schema.fields().iter().filter(|f| f.required) {
        if !offsets.iter().any(|(slot, _)| *slot == field.slot()) {
            return Err(SchemaError::MissingRequired(field.name.clone()));
        }
    }

    // 2. The table: 8-byte scalars, offsets, then narrower scalars.
    scalars.sort_by(|x, y| y.1.size().cmp(&x.1.size()));
    b.start_object(schema.slot_count())?;
    let (wide, narrow): (Vec<_>, Vec<_>) = scalars.into_iter().partition(|s| s.1.size() == 8);
    for (slot, ty, value, default) in wide {
        add_scalar(b, slot, ty, value, default)?;
    }
    for (slot, off) in offsets {
        b.add_offset_field(slot, off)?;
    }
    for (slot, ty, value, default) in narrow {
        add_scalar(b, slot, ty, value, default)?;
    }
    Ok(b.end_object()?)
}

/// Encode `value` as the root table of type `name` and finish the buffer,
/// with the schema's file identifier when it declares one.
pub fn encode_value<V: FieldSource>(
    b: &mut FlatBuilder,
    registry: &SchemaRegistry,
    name: &str,
    value: &V,
) -> Result<(), SchemaError> {
    let schema = registry.get(name)?;
    let root = encode_table(b, registry, schema, value)?;
    match schema.identifier_bytes() {
        Some(ident) => b.finish_with_identifier(root, &ident)?,
        None => b.finish(root)?,
    }
    Ok(())
}

/// Parse JSON text and encode it into a fresh buffer.
pub fn encode_json_str(registry: &SchemaRegistry, name: &str, json: &str) -> Result<Vec<u8>, SchemaError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let mut b = FlatBuilder::new();
    encode_value(&mut b, registry, name, &value)?;
    Ok(b.into_bytes()?)
}

/// Parse CBOR bytes and encode them into a fresh buffer.
pub fn encode_cbor_bytes(registry: &SchemaRegistry, name: &str, cbor: &[u8]) -> Result<Vec<u8>, SchemaError> {
    let value: cbor4ii::core::Value =
        cbor4ii::serde::from_slice(cbor).map_err(|e| SchemaError::CborError(e.to_string()))?;
    let mut b = FlatBuilder::new();
    encode_value(&mut b, registry, name, &value)?;
    Ok(b.into_bytes()?)
}
