use crate::schema::ScalarValue;

// ─── FieldSink Trait ────────────────────────────────────────────────────────

/// Trait for dynamic value types a table can be decoded into.
pub trait FieldSink: Sized {
    fn from_bool(b: bool) -> Self;

    fn from_i64(v: i64) -> Self;

    fn from_u64(v: u64) -> Self;

    fn from_f64(v: f64) -> Self;

    fn from_str(s: &str) -> Self;

    fn from_array(items: Vec<Self>) -> Self;

    fn from_object(entries: Vec<(&str, Self)>) -> Self;

    /// A `ubyte` vector. Formats without a byte string type get an array.
    fn from_bytes(bytes: &[u8]) -> Self {
        Self::from_array(bytes.iter().map(|b| Self::from_u64(*b as u64)).collect())
    }

    #[inline]
    fn from_scalar(v: ScalarValue) -> Self {
        match v {
            ScalarValue::Bool(b) => Self::from_bool(b),
            ScalarValue::Int(i) => Self::from_i64(i),
            ScalarValue::UInt(u) => Self::from_u64(u),
            ScalarValue::Float(f) => Self::from_f64(f),
        }
    }
}

// ─── FieldSink for serde_json::Value ────────────────────────────────────────

impl FieldSink for serde_json::Value {
    #[inline]
    fn from_bool(b: bool) -> Self {
        serde_json::Value::Bool(b)
    }

    #[inline]
    fn from_i64(v: i64) -> Self {
        serde_json::Value::Number(v.into())
    }

    #[inline]
    fn from_u64(v: u64) -> Self {
        serde_json::Value::Number(v.into())
    }

    /// NaN and infinities have no JSON form and become null.
    #[inline]
    fn from_f64(v: f64) -> Self {
        serde_json::Number::from_f64(v)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }

    #[inline]
    fn from_str(s: &str) -> Self {
        serde_json::Value::String(s.to_string())
    }

    #[inline]
    fn from_array(items: Vec<Self>) -> Self {
        serde_json::Value::Array(items)
    }

    fn from_object(entries: Vec<(&str, Self)>) -> Self {
        serde_json::Value::Object(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }
}

// ─── FieldSink for cbor4ii::core::Value ─────────────────────────────────────

impl FieldSink for cbor4ii::core::Value {
    #[inline]
    fn from_bool(b: bool) -> Self {
        cbor4ii::core::Value::Bool(b)
    }

    #[inline]
    fn from_i64(v: i64) -> Self {
        cbor4ii::core::Value::Integer(v as i128)
    }

    #[inline]
    fn from_u64(v: u64) -> Self {
        cbor4ii::core::Value::Integer(v as i128)
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        cbor4ii::core::Value::Float(v)
    }

    #[inline]
    fn from_str(s: &str) -> Self {
        cbor4ii::core::Value::Text(s.to_string())
    }

    #[inline]
    fn from_bytes(bytes: &[u8]) -> Self {
        cbor4ii::core::Value::Bytes(bytes.to_vec())
    }

    #[inline]
    fn from_array(items: Vec<Self>) -> Self {
        cbor4ii::core::Value::Array(items)
    }

    fn from_object(entries: Vec<(&str, Self)>) -> Self {
        cbor4ii::core::Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (cbor4ii::core::Value::Text(k.to_string()), v))
                .collect(),
        )
    }
}
