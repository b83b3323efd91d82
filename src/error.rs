use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// errors that abort a transform and surface to the caller
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("malformed jpeg: {0}")]
    MalformedJpeg(String),

    #[error("transform failed: {0}")]
    TransformFailure(#[from] DecodeError),
}

impl Error {
    pub(crate) fn unreadable(err: io::Error) -> Self {
        Error::InvalidInput(format!("unable to read input stream: {err}"))
    }
}

/// Decoder-level failures.
///
/// These are recorded against the directory being decoded and only flip the
/// `errors` marker of the output document. `Internal` is the exception: it is
/// raised by the serializer and surfaces as [`Error::TransformFailure`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid TIFF header: {0}")]
    BadTiffHeader(&'static str),

    #[error("IFD at offset {offset} declares {entries} entries but the payload ends first")]
    TruncatedIfd { offset: usize, entries: u16 },

    #[error("tag 0x{tag:04x} points outside the payload (offset {offset}, {len} bytes)")]
    OffsetOutOfRange { tag: u16, offset: usize, len: usize },

    #[error("tag 0x{tag:04x} has unknown field type {field_type}")]
    UnknownFieldType { tag: u16, field_type: u16 },

    #[error("tag 0x{tag:04x} has an oversized count {count}")]
    CountOverflow { tag: u16, count: u32 },

    #[error("invalid IPTC tag marker 0x{found:02x} at offset {offset}")]
    InvalidIptcMarker { offset: usize, found: u8 },

    #[error("IPTC record {record}:{dataset} runs past the end of the data")]
    TruncatedIptcRecord { record: u8, dataset: u8 },

    #[error("internal error: {0}")]
    Internal(String),
}
