use crate::buffer::read_scalar_at;
use crate::error::FlatError;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

// ─── ScalarType ─────────────────────────────────────────────────────────────

/// Inline value types, named the way schema files name them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Bool,
    Byte,
    UByte,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
}

impl ScalarType {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "bool" => Self::Bool,
            "byte" | "int8" => Self::Byte,
            "ubyte" | "uint8" => Self::UByte,
            "short" | "int16" => Self::Short,
            "ushort" | "uint16" => Self::UShort,
            "int" | "int32" => Self::Int,
            "uint" | "uint32" => Self::UInt,
            "long" | "int64" => Self::Long,
            "ulong" | "uint64" => Self::ULong,
            "float" | "float32" => Self::Float,
            "double" | "float64" => Self::Double,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Byte => "byte",
            Self::UByte => "ubyte",
            Self::Short => "short",
            Self::UShort => "ushort",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Long => "long",
            Self::ULong => "ulong",
            Self::Float => "float",
            Self::Double => "double",
        }
    }

    /// Encoded width in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::Bool | Self::Byte | Self::UByte => 1,
            Self::Short | Self::UShort => 2,
            Self::Int | Self::UInt | Self::Float => 4,
            Self::Long | Self::ULong | Self::Double => 8,
        }
    }

    pub fn zero(self) -> ScalarValue {
        match self {
            Self::Bool => ScalarValue::Bool(false),
            Self::Byte | Self::Short | Self::Int | Self::Long => ScalarValue::Int(0),
            Self::UByte | Self::UShort | Self::UInt | Self::ULong => ScalarValue::UInt(0),
            Self::Float | Self::Double => ScalarValue::Float(0.0),
        }
    }

    fn signed_range(self) -> Option<(i64, i64)> {
        Some(match self {
            Self::Byte => (i8::MIN as i64, i8::MAX as i64),
            Self::Short => (i16::MIN as i64, i16::MAX as i64),
            Self::Int => (i32::MIN as i64, i32::MAX as i64),
            Self::Long => (i64::MIN, i64::MAX),
            _ => return None,
        })
    }

    fn unsigned_max(self) -> Option<u64> {
        Some(match self {
            Self::UByte => u8::MAX as u64,
            Self::UShort => u16::MAX as u64,
            Self::UInt => u32::MAX as u64,
            Self::ULong => u64::MAX,
            _ => return None,
        })
    }

    /// Normalize `value` for this type: `Bool` for bool, `Int` for signed,
    /// `UInt` for unsigned and `Float` for floating point types.
    /// `None` when the value does not fit.
    pub fn coerce(self, value: ScalarValue) -> Option<ScalarValue> {
        if self == Self::Bool {
            return match value {
                ScalarValue::Bool(b) => Some(ScalarValue::Bool(b)),
                _ => None,
            };
        }
        if matches!(self, Self::Float | Self::Double) {
            return match value {
                ScalarValue::Bool(_) => None,
                ScalarValue::Int(i) => Some(ScalarValue::Float(i as f64)),
                ScalarValue::UInt(u) => Some(ScalarValue::Float(u as f64)),
                ScalarValue::Float(f) if self == Self::Float && f.is_finite() && f.abs() > f32::MAX as f64 => None,
                ScalarValue::Float(f) => Some(ScalarValue::Float(f)),
            };
        }
        if let Some((min, max)) = self.signed_range() {
            let i = match value {
                ScalarValue::Bool(_) => return None,
                ScalarValue::Int(i) => i,
                ScalarValue::UInt(u) => i64::try_from(u).ok()?,
                ScalarValue::Float(f) => integral_f64(f, min as f64, max as f64 + 1.0)? as i64,
            };
            return (min..=max).contains(&i).then_some(ScalarValue::Int(i));
        }
        let max = self.unsigned_max()?;
        let u = match value {
            ScalarValue::Bool(_) => return None,
            ScalarValue::UInt(u) => u,
            ScalarValue::Int(i) => u64::try_from(i).ok()?,
            ScalarValue::Float(f) => integral_f64(f, 0.0, max as f64 + 1.0)? as u64,
        };
        (u <= max).then_some(ScalarValue::UInt(u))
    }

    /// Read one value of this type at `pos`.
    pub fn read(self, buf: &[u8], pos: usize) -> Result<ScalarValue, FlatError> {
        Ok(match self {
            Self::Bool => ScalarValue::Bool(read_scalar_at::<bool>(buf, pos)?),
            Self::Byte => ScalarValue::Int(read_scalar_at::<i8>(buf, pos)? as i64),
            Self::UByte => ScalarValue::UInt(read_scalar_at::<u8>(buf, pos)? as u64),
            Self::Short => ScalarValue::Int(read_scalar_at::<i16>(buf, pos)? as i64),
            Self::UShort => ScalarValue::UInt(read_scalar_at::<u16>(buf, pos)? as u64),
            Self::Int => ScalarValue::Int(read_scalar_at::<i32>(buf, pos)? as i64),
            Self::UInt => ScalarValue::UInt(read_scalar_at::<u32>(buf, pos)? as u64),
            Self::Long => ScalarValue::Int(read_scalar_at::<i64>(buf, pos)?),
            Self::ULong => ScalarValue::UInt(read_scalar_at::<u64>(buf, pos)?),
            Self::Float => ScalarValue::Float(read_scalar_at::<f32>(buf, pos)? as f64),
            Self::Double => ScalarValue::Float(read_scalar_at::<f64>(buf, pos)?),
        })
    }
}

/// `f` when it is a whole number in `[min, end)`. The exclusive end keeps
/// 2^63 and 2^64 out, since `i64::MAX as f64` rounds up to them.
#[inline]
fn integral_f64(f: f64, min: f64, end: f64) -> Option<f64> {
    (f.fract() == 0.0 && f >= min && f < end).then_some(f)
}

// ─── ScalarValue ────────────────────────────────────────────────────────────

/// A scalar independent of its encoded width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    UInt(u64),
    Int(i64),
    Float(f64),
}

impl ScalarValue {
    pub fn as_bool(self) -> bool {
        match self {
            Self::Bool(b) => b,
            Self::UInt(u) => u != 0,
            Self::Int(i) => i != 0,
            Self::Float(f) => f != 0.0,
        }
    }

    pub fn as_i64(self) -> i64 {
        match self {
            Self::Bool(b) => b as i64,
            Self::UInt(u) => u as i64,
            Self::Int(i) => i,
            Self::Float(f) => f as i64,
        }
    }

    pub fn as_u64(self) -> u64 {
        match self {
            Self::Bool(b) => b as u64,
            Self::UInt(u) => u,
            Self::Int(i) => i as u64,
            Self::Float(f) => f as u64,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Self::Bool(b) => b as u8 as f64,
            Self::UInt(u) => u as f64,
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }
}

impl From<bool> for ScalarValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for ScalarValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<u64> for ScalarValue {
    fn from(u: u64) -> Self {
        Self::UInt(u)
    }
}

impl From<f64> for ScalarValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

// ─── FieldType ──────────────────────────────────────────────────────────────

/// Type of a schema field.
///
/// In JSON a scalar or string is written by name (`"int"`, `"string"`), a
/// vector as `{"vector": "ubyte"}` and a nested table as `{"table": "Name"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FieldTypeRepr", into = "FieldTypeRepr")]
pub enum FieldType {
    Scalar(ScalarType),
    String,
    Vector(ScalarType),
    Table(SmolStr),
}

impl FieldType {
    #[inline]
    pub fn as_scalar(&self) -> Option<ScalarType> {
        match self {
            Self::Scalar(ty) => Some(*ty),
            _ => None,
        }
    }

    /// Stored out of line behind a u32 offset.
    #[inline]
    pub fn is_offset(&self) -> bool {
        !matches!(self, Self::Scalar(_))
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum FieldTypeRepr {
    Name(SmolStr),
    Vector { vector: SmolStr },
    Table { table: SmolStr },
}

impl TryFrom<FieldTypeRepr> for FieldType {
    type Error = String;

    fn try_from(repr: FieldTypeRepr) -> Result<Self, Self::Error> {
        Ok(match repr {
            FieldTypeRepr::Name(name) if name == "string" => Self::String,
            FieldTypeRepr::Name(name) => ScalarType::from_name(&name)
                .map(Self::Scalar)
                .ok_or_else(|| format!("unknown field type {name:?}"))?,
            FieldTypeRepr::Vector { vector } => ScalarType::from_name(&vector)
                .map(Self::Vector)
                .ok_or_else(|| format!("unknown vector element type {vector:?}"))?,
            FieldTypeRepr::Table { table } => Self::Table(table),
        })
    }
}

impl From<FieldType> for FieldTypeRepr {
    fn from(ty: FieldType) -> Self {
        match ty {
            FieldType::Scalar(s) => Self::Name(SmolStr::new_static(s.name())),
            FieldType::String => Self::Name(SmolStr::new_static("string")),
            FieldType::Vector(elem) => Self::Vector {
                vector: SmolStr::new_static(elem.name()),
            },
            FieldType::Table(table) => Self::Table { table },
        }
    }
}
