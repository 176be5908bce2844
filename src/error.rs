// ─── Error ──────────────────────────────────────────────────────────────────
use smol_str::SmolStr;
use thiserror::Error;

/// Errors raised by the buffer, the builder and the table views.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlatError {
    #[error("buffer would grow to {requested} bytes, limit is {max}")]
    Capacity { requested: usize, max: usize },
    #[error("invalid nesting: {0}")]
    Nesting(&'static str),
    #[error("invalid build order: {0}")]
    Ordering(&'static str),
    #[error("end_object called without a matching start_object")]
    IncompleteObject,
    #[error("buffer is finished and can no longer be mutated")]
    Finalized,
    #[error("buffer is not finished yet")]
    NotFinished,
    #[error("slot {slot} out of range for an object with {field_count} fields")]
    SlotOutOfRange { slot: u16, field_count: u16 },
    #[error("vector declared {declared} elements but {pushed} were pushed")]
    VectorLength { declared: usize, pushed: usize },
    #[error("read of {len} bytes at {pos} is out of bounds (buffer is {buf_len} bytes)")]
    Bounds { pos: usize, len: usize, buf_len: usize },
    #[error("string at {0} is not valid UTF-8")]
    InvalidUtf8(usize),
}

/// Errors raised by the schema-driven layer (descriptors, views, dynamic values).
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error(transparent)]
    Flat(#[from] FlatError),
    #[error("schema json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown table type: {0}")]
    UnknownTable(SmolStr),
    #[error("{table} has no field named {field}")]
    UnknownField { table: SmolStr, field: SmolStr },
    #[error("field {field} appears twice in {table}")]
    DuplicateField { table: SmolStr, field: SmolStr },
    #[error("{table} assigns slot {slot} twice")]
    DuplicateSlot { table: SmolStr, slot: u16 },
    #[error("required field {0} is missing")]
    MissingRequired(SmolStr),
    #[error("field {field}: expected {expected}")]
    TypeMismatch { field: SmolStr, expected: &'static str },
    #[error("field {0}: value out of range for its type")]
    ValueOutOfRange(SmolStr),
    #[error("file identifier must be 4 bytes, got {0:?}")]
    BadIdentifier(SmolStr),
    #[error("buffer does not carry file identifier {0}")]
    IdentifierMismatch(SmolStr),
    #[error("CBOR error: {0}")]
    CborError(String),
}
