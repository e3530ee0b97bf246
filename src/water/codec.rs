//! Wire codec for current datasets.
//!
//! The buffer is a protobuf message of the shape
//!
//! ```text
//! GeoData { repeated Current currents = 1; }
//! Current { float lat = 1; float lon = 2; float speed = 3; float direction = 4; }
//! ```
//!
//! Only the subset of the protobuf wire format this message needs is handled:
//! varint keys, fixed32 floats, length-delimited records, and skipping of
//! unknown varint/fixed64/length-delimited/fixed32 fields.

use log::debug;

use super::error::DecodeError;
use super::types::{VectorDataset, VectorReading};

const WIRE_VARINT: u8 = 0;
const WIRE_FIXED64: u8 = 1;
const WIRE_LEN: u8 = 2;
const WIRE_FIXED32: u8 = 5;

const FIELD_CURRENT: u32 = 1;
const FIELD_LAT: u32 = 1;
const FIELD_LON: u32 = 2;
const FIELD_SPEED: u32 = 3;
const FIELD_DIRECTION: u32 = 4;

const MAX_VARINT_LEN: usize = 10;

/// Decode a dataset buffer. Either the whole buffer decodes or nothing does.
pub fn decode(buf: &[u8]) -> Result<VectorDataset, DecodeError> {
    let mut reader = WireReader::new(buf, 0);
    let mut readings = Vec::new();

    while let Some(key) = reader.next_key()? {
        match key.field {
            FIELD_CURRENT => {
                key.expect(WIRE_LEN)?;
                let record = reader.read_len_delimited()?;
                readings.push(decode_reading(record)?);
            }
            _ => reader.skip(&key)?,
        }
    }

    debug!("decoded {} readings from {} bytes", readings.len(), buf.len());
    Ok(VectorDataset::new(readings))
}

fn decode_reading(mut reader: WireReader<'_>) -> Result<VectorReading, DecodeError> {
    let mut reading = VectorReading::default();

    while let Some(key) = reader.next_key()? {
        let slot = match key.field {
            FIELD_LAT => &mut reading.latitude,
            FIELD_LON => &mut reading.longitude,
            FIELD_SPEED => &mut reading.magnitude,
            FIELD_DIRECTION => &mut reading.direction_deg,
            _ => {
                reader.skip(&key)?;
                continue;
            }
        };
        key.expect(WIRE_FIXED32)?;
        *slot = reader.read_f32()?;
    }

    Ok(reading)
}

/// Encode a dataset in the format [`decode`] reads. Zero-valued fields are
/// omitted, as proto3 writers do.
pub fn encode(dataset: &VectorDataset) -> Vec<u8> {
    let mut out = Vec::with_capacity(dataset.len() * 22);
    let mut record = Vec::with_capacity(20);

    for reading in dataset.readings() {
        record.clear();
        let fields = [
            (FIELD_LAT, reading.latitude),
            (FIELD_LON, reading.longitude),
            (FIELD_SPEED, reading.magnitude),
            (FIELD_DIRECTION, reading.direction_deg),
        ];
        for (field, value) in fields {
            if value != 0.0 {
                put_key(&mut record, field, WIRE_FIXED32);
                record.extend_from_slice(&value.to_le_bytes());
            }
        }

        put_key(&mut out, FIELD_CURRENT, WIRE_LEN);
        put_varint(&mut out, record.len() as u64);
        out.extend_from_slice(&record);
    }

    out
}

fn put_key(out: &mut Vec<u8>, field: u32, wire_type: u8) {
    put_varint(out, (u64::from(field) << 3) | u64::from(wire_type));
}

fn put_varint(out: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        out.push((value as u8) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

struct Key {
    field: u32,
    wire_type: u8,
    offset: usize,
}

impl Key {
    fn expect(&self, wire_type: u8) -> Result<(), DecodeError> {
        if self.wire_type == wire_type {
            Ok(())
        } else {
            Err(DecodeError::WireTypeMismatch {
                offset: self.offset,
                field: self.field,
                expected: wire_type,
                found: self.wire_type,
            })
        }
    }
}

/// Cursor over a (sub)buffer. `base` is the absolute offset of `buf` in the
/// outermost buffer so errors point at the right byte.
struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> WireReader<'a> {
    fn new(buf: &'a [u8], base: usize) -> Self {
        Self { buf, pos: 0, base }
    }

    fn offset(&self) -> usize {
        self.base + self.pos
    }

    fn next_key(&mut self) -> Result<Option<Key>, DecodeError> {
        if self.pos >= self.buf.len() {
            return Ok(None);
        }

        let offset = self.offset();
        let raw = self.read_varint()?;
        let field = u32::try_from(raw >> 3)
            .ok()
            .filter(|f| *f != 0)
            .ok_or(DecodeError::InvalidFieldNumber { offset })?;

        Ok(Some(Key {
            field,
            wire_type: (raw & 0x7) as u8,
            offset,
        }))
    }

    fn read_varint(&mut self) -> Result<u64, DecodeError> {
        let start = self.offset();
        let mut value = 0u64;

        for i in 0..MAX_VARINT_LEN {
            let byte = *self
                .buf
                .get(self.pos)
                .ok_or(DecodeError::TruncatedVarint { offset: start })?;
            self.pos += 1;

            if i == MAX_VARINT_LEN - 1 && byte > 1 {
                return Err(DecodeError::VarintOverflow { offset: start });
            }
            value |= u64::from(byte & 0x7f) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }

        Err(DecodeError::VarintOverflow { offset: start })
    }

    fn take(&mut self, len: u64) -> Result<WireReader<'a>, DecodeError> {
        let available = self.buf.len() - self.pos;
        let offset = self.offset();
        let len = usize::try_from(len)
            .ok()
            .filter(|l| *l <= available)
            .ok_or(DecodeError::Truncated {
                offset,
                needed: len,
                available,
            })?;

        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(WireReader::new(slice, offset))
    }

    fn read_len_delimited(&mut self) -> Result<WireReader<'a>, DecodeError> {
        let len = self.read_varint()?;
        self.take(len)
    }

    fn read_f32(&mut self) -> Result<f32, DecodeError> {
        let raw = self.take(4)?.buf;
        Ok(f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    fn skip(&mut self, key: &Key) -> Result<(), DecodeError> {
        match key.wire_type {
            WIRE_VARINT => self.read_varint().map(drop),
            WIRE_FIXED64 => self.take(8).map(drop),
            WIRE_LEN => self.read_len_delimited().map(drop),
            WIRE_FIXED32 => self.take(4).map(drop),
            wire_type => Err(DecodeError::UnsupportedWireType {
                offset: key.offset,
                wire_type,
            }),
        }
    }
}
