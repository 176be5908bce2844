use crate::builder::FlatBuilder;
use crate::buffer::read_scalar_at;
use crate::error::{FlatError, SchemaError};
use crate::schema::{FieldDef, Schema};
use crate::table::{Table, root_table};
use crate::types::{Offset, StrMarker, TableMarker};

// ─── ImageReceivedEvent ─────────────────────────────────────────────────────

/// Typed view of an `ImageReceivedEvent` table: two optional strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageReceivedEvent<'a> {
    table: Table<'a>,
}

impl<'a> ImageReceivedEvent<'a> {
    pub const NAME: &'static str = "ImageReceivedEvent";
    pub const SLOT_EVENT_CREATE_TS: u16 = 0;
    pub const SLOT_IMAGE_UUID: u16 = 1;
    pub const FIELD_COUNT: u16 = 2;

    #[inline]
    pub fn init(table: Table<'a>) -> Self {
        Self { table }
    }

    /// The event stored as the root of `buf`.
    pub fn root(buf: &'a [u8]) -> Result<Self, FlatError> {
        Ok(Self::init(root_table(buf)?))
    }

    /// The root of a buffer embedded at `offset` inside `buf`.
    pub fn root_at(buf: &'a [u8], offset: usize) -> Result<Self, FlatError> {
        let rel: u32 = read_scalar_at(buf, offset)?;
        Ok(Self::init(Table::new(buf, offset + rel as usize)))
    }

    #[inline]
    pub fn table(&self) -> Table<'a> {
        self.table
    }

    #[inline]
    pub fn event_create_ts(&self) -> Result<Option<&'a str>, FlatError> {
        self.table.get_str(Self::SLOT_EVENT_CREATE_TS)
    }

    #[inline]
    pub fn image_uuid(&self) -> Result<Option<&'a str>, FlatError> {
        self.table.get_str(Self::SLOT_IMAGE_UUID)
    }

    /// Write a complete event from `args`; strings first, then the table.
    pub fn create(b: &mut FlatBuilder, args: &ImageReceivedEventArgs<'_>) -> Result<Offset<TableMarker>, FlatError> {
        let event_create_ts = args.event_create_ts.map(|s| b.create_string(s)).transpose()?;
        let image_uuid = args.image_uuid.map(|s| b.create_string(s)).transpose()?;

        let mut eb = ImageReceivedEventBuilder::start(b)?;
        if let Some(off) = image_uuid {
            eb.add_image_uuid(off)?;
        }
        if let Some(off) = event_create_ts {
            eb.add_event_create_ts(off)?;
        }
        eb.finish()
    }

    /// Descriptor for the schema-driven layer.
    pub fn schema() -> Result<Schema, SchemaError> {
        Schema::new(
            Self::NAME,
            vec![
                FieldDef::string("EventCreateTs").with_slot(Self::SLOT_EVENT_CREATE_TS),
                FieldDef::string("ImageUuid").with_slot(Self::SLOT_IMAGE_UUID),
            ],
        )
    }
}

// ─── Args ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageReceivedEventArgs<'s> {
    pub event_create_ts: Option<&'s str>,
    pub image_uuid: Option<&'s str>,
}

impl ImageReceivedEventArgs<'_> {
    /// Encode into a fresh finished buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>, FlatError> {
        let mut b = FlatBuilder::new();
        let root = ImageReceivedEvent::create(&mut b, self)?;
        b.finish(root)?;
        b.into_bytes()
    }
}

// ─── Builder ────────────────────────────────────────────────────────────────

/// Incremental writer for one event. Strings must be created on the
/// builder before `start`.
pub struct ImageReceivedEventBuilder<'b> {
    b: &'b mut FlatBuilder,
}

impl<'b> ImageReceivedEventBuilder<'b> {
    pub fn start(b: &'b mut FlatBuilder) -> Result<Self, FlatError> {
        b.start_object(ImageReceivedEvent::FIELD_COUNT)?;
        Ok(Self { b })
    }

    #[inline]
    pub fn add_event_create_ts(&mut self, value: Offset<StrMarker>) -> Result<(), FlatError> {
        self.b
            .add_offset_field(ImageReceivedEvent::SLOT_EVENT_CREATE_TS, value)
    }

    #[inline]
    pub fn add_image_uuid(&mut self, value: Offset<StrMarker>) -> Result<(), FlatError> {
        self.b.add_offset_field(ImageReceivedEvent::SLOT_IMAGE_UUID, value)
    }

    pub fn finish(self) -> Result<Offset<TableMarker>, FlatError> {
        self.b.end_object()
    }
}
