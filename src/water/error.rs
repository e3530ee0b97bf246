use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("truncated varint at byte {offset}")]
    TruncatedVarint { offset: usize },
    #[error("varint overflow at byte {offset}")]
    VarintOverflow { offset: usize },
    #[error("field at byte {offset} needs {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: u64,
        available: usize,
    },
    #[error("invalid field number 0 at byte {offset}")]
    InvalidFieldNumber { offset: usize },
    #[error("unsupported wire type {wire_type} at byte {offset}")]
    UnsupportedWireType { offset: usize, wire_type: u8 },
    #[error("field {field} at byte {offset} has wire type {found}, expected {expected}")]
    WireTypeMismatch {
        offset: usize,
        field: u32,
        expected: u8,
        found: u8,
    },
}
