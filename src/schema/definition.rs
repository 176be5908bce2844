use super::types::{FieldType, ScalarType, ScalarValue};
use crate::error::SchemaError;
use crate::types::{FILE_IDENTIFIER_LENGTH, FastMap};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

// ─── FieldDef ───────────────────────────────────────────────────────────────

/// One declared field: name, type, slot index and default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: SmolStr,
    #[serde(rename = "type")]
    pub ty: FieldType,
    /// Slot index; defaults to the declaration position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<u16>,
    /// Scalar default; zero of the type when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ScalarValue>,
    /// Only valid for strings, vectors and tables.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    /// Kept in the layout so slots stay stable, but no longer written.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
}

impl FieldDef {
    pub fn new(name: impl Into<SmolStr>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            slot: None,
            default: None,
            required: false,
            deprecated: false,
        }
    }

    pub fn scalar(name: impl Into<SmolStr>, ty: ScalarType) -> Self {
        Self::new(name, FieldType::Scalar(ty))
    }

    pub fn string(name: impl Into<SmolStr>) -> Self {
        Self::new(name, FieldType::String)
    }

    pub fn vector(name: impl Into<SmolStr>, elem: ScalarType) -> Self {
        Self::new(name, FieldType::Vector(elem))
    }

    pub fn table(name: impl Into<SmolStr>, table: impl Into<SmolStr>) -> Self {
        Self::new(name, FieldType::Table(table.into()))
    }

    pub fn with_slot(mut self, slot: u16) -> Self {
        self.slot = Some(slot);
        self
    }

    pub fn with_default(mut self, default: impl Into<ScalarValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    /// Slot index. Always set once the owning schema is resolved.
    #[inline]
    pub fn slot(&self) -> u16 {
        self.slot.unwrap_or_default()
    }

    /// The normalized default for scalar fields.
    #[inline]
    pub fn default_scalar(&self) -> Option<ScalarValue> {
        let ty = self.ty.as_scalar()?;
        Some(self.default.unwrap_or_else(|| ty.zero()))
    }
}

// ─── Schema ─────────────────────────────────────────────────────────────────

/// Field layout of one table type.
///
/// Slots only grow: new fields get new slots at the end, old ones are
/// deprecated rather than removed. Buffers written with an older layout read
/// defaults for the new slots; readers with an older layout ignore them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    pub name: SmolStr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_identifier: Option<SmolStr>,
    pub fields: Vec<FieldDef>,
    #[serde(skip)]
    by_name: FastMap<SmolStr, usize>,
    #[serde(skip)]
    slot_count: u16,
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.file_identifier == other.file_identifier && self.fields == other.fields
    }
}

impl Schema {
    pub fn new(name: impl Into<SmolStr>, fields: Vec<FieldDef>) -> Result<Self, SchemaError> {
        let mut schema = Self {
            name: name.into(),
            file_identifier: None,
            fields,
            by_name: FastMap::default(),
            slot_count: 0,
        };
        schema.resolve()?;
        Ok(schema)
    }

    pub fn with_file_identifier(mut self, ident: impl Into<SmolStr>) -> Result<Self, SchemaError> {
        self.file_identifier = Some(ident.into());
        self.resolve()?;
        Ok(self)
    }

    /// Parse and resolve a single schema from JSON.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let mut schema: Schema = serde_json::from_str(json)?;
        schema.resolve()?;
        Ok(schema)
    }

    pub fn to_json(&self) -> Result<String, SchemaError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Assign implicit slots, normalize defaults and build the name index.
    fn resolve(&mut self) -> Result<(), SchemaError> {
        if let Some(ident) = &self.file_identifier {
            if ident.len() != FILE_IDENTIFIER_LENGTH {
                return Err(SchemaError::BadIdentifier(ident.clone()));
            }
        }

        self.by_name.clear();
        let mut seen_slots: Vec<u16> = Vec::with_capacity(self.fields.len());
        for (i, field) in self.fields.iter_mut().enumerate() {
            let slot = match field.slot {
                Some(slot) => slot,
                None => u16::try_from(i).map_err(|_| SchemaError::DuplicateSlot {
                    table: self.name.clone(),
                    slot: u16::MAX,
                })?,
            };
            if seen_slots.contains(&slot) {
                return Err(SchemaError::DuplicateSlot {
                    table: self.name.clone(),
                    slot,
                });
            }
            seen_slots.push(slot);
            field.slot = Some(slot);

            match field.ty.as_scalar() {
                Some(ty) => {
                    if field.required {
                        return Err(SchemaError::TypeMismatch {
                            field: field.name.clone(),
                            expected: "required only on strings, vectors and tables",
                        });
                    }
                    let default = field.default.unwrap_or_else(|| ty.zero());
                    let default = ty
                        .coerce(default)
                        .ok_or_else(|| SchemaError::ValueOutOfRange(field.name.clone()))?;
                    field.default = Some(default);
                }
                None => {
                    if field.default.is_some() {
                        return Err(SchemaError::TypeMismatch {
                            field: field.name.clone(),
                            expected: "no default on strings, vectors and tables",
                        });
                    }
                }
            }

            if self.by_name.insert(field.name.clone(), i).is_some() {
                return Err(SchemaError::DuplicateField {
                    table: self.name.clone(),
                    field: field.name.clone(),
                });
            }
        }
        self.slot_count = seen_slots.iter().map(|s| s.saturating_add(1)).max().unwrap_or(0);
        Ok(())
    }

    #[inline]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.by_name.get(name).map(|&i| &self.fields[i])
    }

    #[inline]
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Number of vtable slots a table of this type needs.
    #[inline]
    pub fn slot_count(&self) -> u16 {
        self.slot_count
    }

    /// The file identifier as raw bytes, if the schema declares one.
    pub fn identifier_bytes(&self) -> Option<[u8; FILE_IDENTIFIER_LENGTH]> {
        let ident = self.file_identifier.as_ref()?;
        ident.as_bytes().try_into().ok()
    }
}

// ─── SchemaRegistry ─────────────────────────────────────────────────────────

/// All table types that can appear in one family of buffers, by name.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: FastMap<SmolStr, Schema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON array of schemas.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let defs: Vec<Schema> = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for mut schema in defs {
            schema.resolve()?;
            registry.register(schema);
        }
        Ok(registry)
    }

    /// Add or replace a schema.
    pub fn register(&mut self, schema: Schema) -> &mut Self {
        self.schemas.insert(schema.name.clone(), schema);
        self
    }

    pub fn get(&self, name: &str) -> Result<&Schema, SchemaError> {
        self.schemas
            .get(name)
            .ok_or_else(|| SchemaError::UnknownTable(SmolStr::from(name)))
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
