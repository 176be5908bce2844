use crate::schema::ScalarValue;

// ─── FieldSource Trait ──────────────────────────────────────────────────────

/// Trait for dynamic value types that can be encoded into a table.
///
/// Abstracts over serde_json::Value and cbor4ii::core::Value so both go
/// through the same schema-driven encoder.
pub trait FieldSource: Sized {
    /// Null members are treated as absent.
    fn is_null(&self) -> bool;

    fn as_bool(&self) -> Option<bool>;

    fn as_i64(&self) -> Option<i64>;

    fn as_u64(&self) -> Option<u64>;

    fn as_f64(&self) -> Option<f64>;

    fn as_str(&self) -> Option<&str>;

    /// Raw bytes, for formats that have a byte string type.
    #[inline]
    fn as_bytes(&self) -> Option<&[u8]> {
        None
    }

    fn as_array(&self) -> Option<&[Self]>;

    /// Members of an object, in input order. `None` if this is not an
    /// object or has non-string keys.
    fn object_entries(&self) -> Option<Vec<(&str, &Self)>>;

    /// The value as a scalar, preferring the narrowest representation.
    fn as_scalar(&self) -> Option<ScalarValue> {
        if let Some(b) = self.as_bool() {
            return Some(ScalarValue::Bool(b));
        }
        if let Some(u) = self.as_u64() {
            return Some(ScalarValue::UInt(u));
        }
        if let Some(i) = self.as_i64() {
            return Some(ScalarValue::Int(i));
        }
        self.as_f64().map(ScalarValue::Float)
    }
}

// ─── FieldSource for serde_json::Value ──────────────────────────────────────

impl FieldSource for serde_json::Value {
    #[inline]
    fn is_null(&self) -> bool {
        matches!(self, serde_json::Value::Null)
    }

    #[inline]
    fn as_bool(&self) -> Option<bool> {
        self.as_bool()
    }

    #[inline]
    fn as_i64(&self) -> Option<i64> {
        self.as_i64()
    }

    #[inline]
    fn as_u64(&self) -> Option<u64> {
        self.as_u64()
    }

    #[inline]
    fn as_f64(&self) -> Option<f64> {
        self.as_f64()
    }

    #[inline]
    fn as_str(&self) -> Option<&str> {
        self.as_str()
    }

    #[inline]
    fn as_array(&self) -> Option<&[Self]> {
        serde_json::Value::as_array(self).map(Vec::as_slice)
    }

    fn object_entries(&self) -> Option<Vec<(&str, &Self)>> {
        let map = self.as_object()?;
        Some(map.iter().map(|(k, v)| (k.as_str(), v)).collect())
    }
}

// ─── FieldSource for cbor4ii::core::Value ───────────────────────────────────

impl FieldSource for cbor4ii::core::Value {
    #[inline]
    fn is_null(&self) -> bool {
        matches!(self, cbor4ii::core::Value::Null)
    }

    #[inline]
    fn as_bool(&self) -> Option<bool> {
        match self {
            cbor4ii::core::Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    fn as_i64(&self) -> Option<i64> {
        match self {
            cbor4ii::core::Value::Integer(i) => i64::try_from(*i).ok(),
            _ => None,
        }
    }

    #[inline]
    fn as_u64(&self) -> Option<u64> {
        match self {
            cbor4ii::core::Value::Integer(i) => u64::try_from(*i).ok(),
            _ => None,
        }
    }

    #[inline]
    fn as_f64(&self) -> Option<f64> {
        match self {
            cbor4ii::core::Value::Float(f) => Some(*f),
            cbor4ii::core::Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[inline]
    fn as_str(&self) -> Option<&str> {
        match self {
            cbor4ii::core::Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    #[inline]
    fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            cbor4ii::core::Value::Bytes(b) => Some(b.as_slice()),
            _ => None,
        }
    }

    #[inline]
    fn as_array(&self) -> Option<&[Self]> {
        match self {
            cbor4ii::core::Value::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    fn object_entries(&self) -> Option<Vec<(&str, &Self)>> {
        let cbor4ii::core::Value::Map(map) = self else {
            return None;
        };
        map.iter()
            .map(|(k, v)| match k {
                cbor4ii::core::Value::Text(s) => Some((s.as_str(), v)),
                _ => None,
            })
            .collect()
    }
}
