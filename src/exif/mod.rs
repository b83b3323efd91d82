//! EXIF (TIFF structured) decoding.
//!
//! The TIFF stream carried in APP1 is walked from IFD0, following the
//! ExifSubIFD and GPS pointers, and the next-IFD link to the thumbnail IFD.
//! Damage is contained as narrowly as possible: a bad entry drops the entry,
//! a bad IFD drops the directory, a bad header drops all of EXIF.

mod entry;

use std::marker::PhantomData;

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use log::{debug, warn};

use self::entry::{EntryHeader, ENTRY_LEN};
use crate::directory::{Directory, DirectoryKind, Metadata};
use crate::error::DecodeError;
use crate::tag;
use crate::value::Value;

const HEADER_LEN: usize = 8;
const TIFF_MAGIC: u16 = 0x002A;

/// decode a TIFF payload (the bytes following the `Exif\0\0` signature)
pub fn decode(tiff: &[u8]) -> Metadata {
    let big_endian = match tiff.get(0..2) {
        Some(b"MM") => true,
        Some(b"II") => false,
        _ => {
            let mut meta = Metadata::default();
            fail(&mut meta.errors, DecodeError::BadTiffHeader("invalid endianness marker"));
            return meta;
        }
    };

    if big_endian {
        Decoder::<BigEndian>::new(tiff).run()
    } else {
        Decoder::<LittleEndian>::new(tiff).run()
    }
}

fn fail(errors: &mut Vec<DecodeError>, err: DecodeError) {
    warn!("exif: {err}");
    errors.push(err);
}

/// an IFD as read, before sub-IFD pointers are followed
struct RawIfd {
    directory: Directory,
    pointers: Vec<(u16, usize)>,
    next: usize,
}

struct Decoder<'a, B> {
    tiff: &'a [u8],
    visited: Vec<usize>,
    meta: Metadata,
    order: PhantomData<B>,
}

impl<'a, B: ByteOrder> Decoder<'a, B> {
    fn new(tiff: &'a [u8]) -> Self {
        Decoder { tiff, visited: vec![], meta: Metadata::default(), order: PhantomData }
    }

    fn run(mut self) -> Metadata {
        if self.tiff.len() < HEADER_LEN {
            fail(&mut self.meta.errors, DecodeError::BadTiffHeader("header shorter than 8 bytes"));
            return self.meta;
        }
        if B::read_u16(&self.tiff[2..4]) != TIFF_MAGIC {
            fail(&mut self.meta.errors, DecodeError::BadTiffHeader("missing TIFF magic 0x002a"));
            return self.meta;
        }
        let offset_to_ifd = B::read_u32(&self.tiff[4..8]) as usize;

        let Some(ifd0) = self.read_ifd(DirectoryKind::Ifd0, offset_to_ifd) else {
            return self.meta;
        };
        self.meta.directories.push(ifd0.directory);

        // follow known pointers to generate SubIFDs
        for (ptr, offset) in ifd0.pointers {
            let kind = match ptr {
                tag::EXIF_IFD_POINTER => DirectoryKind::SubIfd,
                tag::GPS_INFO_IFD_POINTER => DirectoryKind::Gps,
                _ => continue,
            };
            if self.meta.directory(kind).is_some() {
                debug!("exif: duplicate {kind} pointer ignored");
                continue;
            }
            if let Some(ifd) = self.read_ifd(kind, offset) {
                self.meta.directories.push(ifd.directory);
            }
        }

        if ifd0.next != 0 {
            if let Some(ifd) = self.read_ifd(DirectoryKind::Thumbnail, ifd0.next) {
                self.meta.thumbnail = self.extract_thumbnail(&ifd.directory);
                self.meta.directories.push(ifd.directory);
            }
        }

        resolve_datetimes(&mut self.meta.directories);
        self.meta
    }

    fn read_ifd(&mut self, kind: DirectoryKind, offset: usize) -> Option<RawIfd> {
        let tiff = self.tiff;
        if self.visited.contains(&offset) {
            warn!("exif: {kind} at offset {offset} was already read, skipping");
            return None;
        }
        self.visited.push(offset);

        let Some(count_bytes) = tiff.get(offset..offset.saturating_add(2)) else {
            fail(&mut self.meta.errors, DecodeError::TruncatedIfd { offset, entries: 0 });
            return None;
        };
        let num_entries = B::read_u16(count_bytes);

        // headers are contiguous, followed by offset_to_next_ifd
        let table_start = offset + 2;
        let table_end = table_start + num_entries as usize * ENTRY_LEN;
        if table_end > tiff.len() {
            fail(&mut self.meta.errors, DecodeError::TruncatedIfd { offset, entries: num_entries });
            return None;
        }

        let mut directory = Directory::new(kind);
        let mut pointers = vec![];
        for raw in tiff[table_start..table_end].chunks_exact(ENTRY_LEN) {
            let h = EntryHeader::decode::<B>(raw);
            match h.tag {
                tag::EXIF_IFD_POINTER | tag::GPS_INFO_IFD_POINTER if kind == DirectoryKind::Ifd0 => {
                    pointers.push((h.tag, h.offset::<B>()));
                }
                tag::INTEROPERABILITY_IFD_POINTER if kind == DirectoryKind::SubIfd => {}
                _ => match h.value::<B>(tiff) {
                    Ok(v) => directory.insert(h.tag, v),
                    Err(e) => fail(&mut self.meta.errors, e),
                },
            }
        }

        // a missing next-IFD link is common enough to treat as "none"
        let next = tiff
            .get(table_end..table_end + 4)
            .map_or(0, |b| B::read_u32(b) as usize);

        debug!("exif: {kind} at offset {offset}, {} of {num_entries} entries kept", directory.len());
        Some(RawIfd { directory, pointers, next })
    }

    fn extract_thumbnail(&mut self, ifd: &Directory) -> Option<Vec<u8>> {
        let offset = ifd.get(tag::thumbnail::JPEG_INTERCHANGE_FORMAT)?.as_int()?;
        let len = ifd.get(tag::thumbnail::JPEG_INTERCHANGE_FORMAT_LENGTH)?.as_int()?;
        if len <= 0 || offset < 0 {
            return None;
        }
        let (offset, len) = (offset as usize, len as usize);
        match self.tiff.get(offset..offset.saturating_add(len)) {
            Some(data) => Some(data.to_vec()),
            None => {
                let err = DecodeError::OffsetOutOfRange {
                    tag: tag::thumbnail::JPEG_INTERCHANGE_FORMAT,
                    offset,
                    len,
                };
                fail(&mut self.meta.errors, err);
                None
            }
        }
    }
}

/// Turn the date/time strings into `Value::DateTime`, attaching the offset
/// from the matching `OffsetTime*` tag of the ExifSubIFD when present.
fn resolve_datetimes(directories: &mut [Directory]) {
    let offset_of = |tag: u16| {
        directories
            .iter()
            .find(|d| d.kind == DirectoryKind::SubIfd)
            .and_then(|d| d.get_str(tag))
            .map(str::to_owned)
    };
    let pairs = [
        (DirectoryKind::Ifd0, tag::ifd0::DATE_TIME, offset_of(tag::exif::OFFSET_TIME)),
        (
            DirectoryKind::SubIfd,
            tag::exif::DATE_TIME_ORIGINAL,
            offset_of(tag::exif::OFFSET_TIME_ORIGINAL),
        ),
        (
            DirectoryKind::SubIfd,
            tag::exif::DATE_TIME_DIGITIZED,
            offset_of(tag::exif::OFFSET_TIME_DIGITIZED),
        ),
    ];

    for (kind, tag, offset) in pairs {
        let Some(dir) = directories.iter_mut().find(|d| d.kind == kind) else {
            continue;
        };
        let Some(mut dt) = dir.get(tag).and_then(Value::as_datetime) else {
            if dir.contains(tag) {
                debug!("exif: {kind} tag 0x{tag:04x} is not an EXIF date/time, kept as text");
            }
            continue;
        };
        if let Some(offset) = offset {
            dt = dt.with_offset(&offset);
        }
        dir.insert(tag, Value::DateTime(dt));
    }
}
