use crate::error::SchemaError;
use crate::schema::{FieldDef, FieldType, Schema, ScalarType, ScalarValue, SchemaRegistry};
use crate::table::{Table, buffer_has_identifier, root_table};
use smol_str::SmolStr;

// ─── FieldValue ─────────────────────────────────────────────────────────────

/// A field read through a schema. Strings and vectors borrow the buffer.
#[derive(Debug, Clone, Copy)]
pub enum FieldValue<'a> {
    Scalar(ScalarValue),
    Str(&'a str),
    Vector(ScalarVector<'a>),
    Table(TableView<'a>),
}

impl<'a> FieldValue<'a> {
    pub fn as_scalar(&self) -> Option<ScalarValue> {
        match self {
            Self::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Self::Str(s) => Some(*s),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<ScalarVector<'a>> {
        match self {
            Self::Vector(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<TableView<'a>> {
        match self {
            Self::Table(t) => Some(*t),
            _ => None,
        }
    }
}

/// A scalar vector whose element type is only known from the schema.
#[derive(Debug, Clone, Copy)]
pub struct ScalarVector<'a> {
    data: &'a [u8],
    len: usize,
    elem: ScalarType,
}

impl<'a> ScalarVector<'a> {
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn elem_type(&self) -> ScalarType {
        self.elem
    }

    /// Raw little-endian payload.
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    pub fn get(&self, i: usize) -> Option<ScalarValue> {
        if i >= self.len {
            return None;
        }
        self.elem.read(self.data, i * self.elem.size()).ok()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = ScalarValue> + 'a {
        let this = *self;
        (0..this.len).map(move |i| this.get(i).unwrap_or_else(|| this.elem.zero()))
    }
}

// ─── TableView ──────────────────────────────────────────────────────────────

/// Zero-copy table view that resolves fields by name through its schema.
#[derive(Debug, Clone, Copy)]
pub struct TableView<'a> {
    table: Table<'a>,
    schema: &'a Schema,
    registry: &'a SchemaRegistry,
}

impl<'a> TableView<'a> {
    pub fn new(table: Table<'a>, schema: &'a Schema, registry: &'a SchemaRegistry) -> Self {
        Self {
            table,
            schema,
            registry,
        }
    }

    /// View the root of `buf` as a table of type `name`. A file identifier
    /// declared by the schema must be present in the buffer.
    pub fn root(buf: &'a [u8], registry: &'a SchemaRegistry, name: &str) -> Result<Self, SchemaError> {
        let schema = registry.get(name)?;
        if let Some(ident) = schema.identifier_bytes() {
            if !buffer_has_identifier(buf, &ident, false) {
                let expected = schema.file_identifier.clone().unwrap_or_default();
                return Err(SchemaError::IdentifierMismatch(expected));
            }
        }
        Ok(Self::new(root_table(buf)?, schema, registry))
    }

    #[inline]
    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    #[inline]
    pub fn table(&self) -> Table<'a> {
        self.table
    }

    /// Read a field by name.
    ///
    /// Absent scalars yield their default, absent strings, vectors and
    /// tables yield `None` unless the field is required.
    pub fn get(&self, name: &str) -> Result<Option<FieldValue<'a>>, SchemaError> {
        let field = self.schema.field(name).ok_or_else(|| SchemaError::UnknownField {
            table: self.schema.name.clone(),
            field: SmolStr::from(name),
        })?;
        self.get_field(field)
    }

    pub fn get_field(&self, field: &FieldDef) -> Result<Option<FieldValue<'a>>, SchemaError> {
        let slot = field.slot();
        let value = match &field.ty {
            FieldType::Scalar(ty) => {
                let value = match self.table.field_offset(slot)? {
                    0 => field.default_scalar().unwrap_or_else(|| ty.zero()),
                    off => ty.read(self.table.buf(), self.table.loc() + off as usize)?,
                };
                return Ok(Some(FieldValue::Scalar(value)));
            }
            FieldType::String => self.table.get_str(slot)?.map(FieldValue::Str),
            FieldType::Vector(elem) => self
                .table
                .get_vector_raw(slot, elem.size())?
                .map(|(data, len)| FieldValue::Vector(ScalarVector { data, len, elem: *elem })),
            FieldType::Table(name) => {
                let schema = self.registry.get(name)?;
                self.table
                    .get_table(slot)?
                    .map(|table| FieldValue::Table(TableView::new(table, schema, self.registry)))
            }
        };
        if value.is_none() && field.required {
            return Err(SchemaError::MissingRequired(field.name.clone()));
        }
        Ok(value)
    }

    /// Whether the field was written to the buffer.
    pub fn is_present(&self, name: &str) -> Result<bool, SchemaError> {
        let field = self.schema.field(name).ok_or_else(|| SchemaError::UnknownField {
            table: self.schema.name.clone(),
            field: SmolStr::from(name),
        })?;
        Ok(self.table.has_field(field.slot())?)
    }
}
