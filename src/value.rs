use std::fmt;

use chrono::{FixedOffset, NaiveDateTime};

/// EXIF date/time layout, e.g. `2011:01:13 14:33:39`
const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// exact TIFF rational; conversion to float is left to consumers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rational {
    pub num: i64,
    pub den: i64,
}

impl Rational {
    pub fn new(num: i64, den: i64) -> Self {
        Rational { num, den }
    }

    /// `None` for a zero denominator
    pub fn to_f64(self) -> Option<f64> {
        if self.den == 0 {
            None
        } else {
            Some(self.num as f64 / self.den as f64)
        }
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// A wall-clock capture time as recorded by the camera.
///
/// EXIF stores date-times without a zone. When the `OffsetTime*` companion
/// tag is present the offset is attached, otherwise the value stays local.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExifDateTime {
    pub local: NaiveDateTime,
    pub offset: Option<FixedOffset>,
}

impl ExifDateTime {
    /// parse the `YYYY:MM:DD HH:MM:SS` form
    pub fn parse(s: &str) -> Option<Self> {
        let local = NaiveDateTime::parse_from_str(s.trim(), EXIF_DATETIME_FORMAT).ok()?;
        Some(ExifDateTime { local, offset: None })
    }

    /// attach an `OffsetTime*` value such as `+09:00`; unparseable or
    /// out-of-range offsets are ignored
    pub fn with_offset(mut self, offset: &str) -> Self {
        self.offset = offset.trim().parse::<FixedOffset>().ok();
        self
    }
}

impl fmt::Display for ExifDateTime {
    /// ISO-8601, with the offset only when one is known
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.local.format("%Y-%m-%dT%H:%M:%S"))?;
        if let Some(offset) = self.offset {
            write!(f, "{offset}")?;
        }
        Ok(())
    }
}

/// typed tag value produced by the decoders
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Rational(Rational),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    DateTime(ExifDateTime),
    IntArray(Vec<i64>),
    RationalArray(Vec<Rational>),
    FloatArray(Vec<f64>),
    StringArray(Vec<String>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match *self {
            Value::String(ref s) => Some(s),
            _ => None,
        }
    }

    /// single integer, including one-element arrays
    pub fn as_int(&self) -> Option<i64> {
        match *self {
            Value::Int(v) => Some(v),
            Value::IntArray(ref v) if v.len() == 1 => Some(v[0]),
            _ => None,
        }
    }

    pub fn as_rationals(&self) -> Option<&[Rational]> {
        match *self {
            Value::RationalArray(ref v) => Some(v),
            Value::Rational(ref r) => Some(std::slice::from_ref(r)),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<ExifDateTime> {
        match *self {
            Value::DateTime(dt) => Some(dt),
            Value::String(ref s) => ExifDateTime::parse(s),
            _ => None,
        }
    }
}
