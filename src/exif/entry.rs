use byteorder::ByteOrder;

use crate::error::DecodeError;
use crate::value::{Rational, Value};

pub const ENTRY_LEN: usize = 12;

/// raw 12-byte IFD entry; `raw` holds the value when it fits, else an offset
#[derive(Debug)]
pub struct EntryHeader {
    pub tag: u16,
    pub format: u16,
    pub count: u32,
    pub raw: [u8; 4],
}

impl EntryHeader {
    /// `entry` must be ENTRY_LEN bytes
    pub fn decode<B: ByteOrder>(entry: &[u8]) -> Self {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&entry[8..12]);
        EntryHeader {
            tag: B::read_u16(&entry[0..2]),
            format: B::read_u16(&entry[2..4]),
            count: B::read_u32(&entry[4..8]),
            raw,
        }
    }

    fn datatype_sz(dt: u16) -> Option<usize> {
        match dt {
            1 /*Byte*/ | 2 /*Ascii*/ | 6 /*SignedByte*/ | 7 /*Undef*/ => Some(1),
            3 /*UShort*/ | 8 /*SShort*/ => Some(2),
            4 /*ULong*/ | 9 /*SLong*/ | 11 /*Float32*/ => Some(4),
            5 /*URational*/ | 10 /*SRational*/ | 12 /*Float64*/ => Some(8),
            _ => None,
        }
    }

    /// the value-or-offset field read as an offset
    pub fn offset<B: ByteOrder>(&self) -> usize {
        B::read_u32(&self.raw) as usize
    }

    /// bytes holding the value, inline or from the TIFF payload
    fn data<'a, B: ByteOrder>(&'a self, tiff: &'a [u8]) -> Result<&'a [u8], DecodeError> {
        let sz = Self::datatype_sz(self.format).ok_or(DecodeError::UnknownFieldType {
            tag: self.tag,
            field_type: self.format,
        })?;
        let len = sz
            .checked_mul(self.count as usize)
            .ok_or(DecodeError::CountOverflow { tag: self.tag, count: self.count })?;

        if len <= 4 {
            return Ok(&self.raw[..len]);
        }

        let offset = self.offset::<B>();
        match offset.checked_add(len) {
            Some(end) if end <= tiff.len() => Ok(&tiff[offset..end]),
            _ => Err(DecodeError::OffsetOutOfRange { tag: self.tag, offset, len }),
        }
    }

    /// decode the entry into a typed value
    pub fn value<B: ByteOrder>(&self, tiff: &[u8]) -> Result<Value, DecodeError> {
        let d = self.data::<B>(tiff)?;

        let v = match self.format {
            1 => ints(d.iter().map(|&b| b as i64).collect()),
            2 => ascii(d),
            3 => ints(d.chunks_exact(2).map(|c| B::read_u16(c) as i64).collect()),
            4 => ints(d.chunks_exact(4).map(|c| B::read_u32(c) as i64).collect()),
            5 => rationals(
                d.chunks_exact(8)
                    .map(|c| Rational::new(B::read_u32(&c[..4]) as i64, B::read_u32(&c[4..]) as i64))
                    .collect(),
            ),
            6 => ints(d.iter().map(|&b| b as i8 as i64).collect()),
            7 => Value::Bytes(d.to_vec()),
            8 => ints(d.chunks_exact(2).map(|c| B::read_i16(c) as i64).collect()),
            9 => ints(d.chunks_exact(4).map(|c| B::read_i32(c) as i64).collect()),
            10 => rationals(
                d.chunks_exact(8)
                    .map(|c| Rational::new(B::read_i32(&c[..4]) as i64, B::read_i32(&c[4..]) as i64))
                    .collect(),
            ),
            11 => floats(d.chunks_exact(4).map(|c| B::read_f32(c) as f64).collect()),
            12 => floats(d.chunks_exact(8).map(B::read_f64).collect()),
            // datatype_sz already rejected anything else
            v => return Err(DecodeError::UnknownFieldType { tag: self.tag, field_type: v }),
        };
        Ok(v)
    }
}

fn ints(mut v: Vec<i64>) -> Value {
    if v.len() == 1 {
        Value::Int(v.remove(0))
    } else {
        Value::IntArray(v)
    }
}

fn rationals(mut v: Vec<Rational>) -> Value {
    if v.len() == 1 {
        Value::Rational(v.remove(0))
    } else {
        Value::RationalArray(v)
    }
}

fn floats(mut v: Vec<f64>) -> Value {
    if v.len() == 1 {
        Value::Float(v.remove(0))
    } else {
        Value::FloatArray(v)
    }
}

/// NUL-terminated text; embedded NULs separate several strings
fn ascii(d: &[u8]) -> Value {
    let end = d.iter().rposition(|&c| c != 0).map_or(0, |p| p + 1);
    let mut parts: Vec<String> = d[..end]
        .split(|&c| c == 0)
        .map(|s| String::from_utf8_lossy(s).into_owned())
        .collect();
    if parts.len() == 1 {
        Value::String(parts.remove(0))
    } else {
        Value::StringArray(parts)
    }
}
