// http://vip.sugovica.hu/Sardi/kepnezo/JPEG%20File%20Layout%20and%20Format.htm
// https://www.imperialviolet.org/binary/jpeg/
// http://dev.exiv2.org/projects/exiv2/wiki/The_Metadata_in_JPEG_files

use std::io;
use std::io::prelude::*;

use byteorder::{BigEndian, ReadBytesExt};
use log::debug;

use crate::error::{Error, Result};

pub const TEM: u8 = 0x01;
pub const SOI: u8 = 0xD8;
pub const EOI: u8 = 0xD9;
pub const SOS: u8 = 0xDA;
pub const APP1: u8 = 0xE1;
pub const APPD: u8 = 0xED;

pub const EXIF_SIGNATURE: &[u8] = b"Exif\0\0";
pub const XMP_SIGNATURE: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";
pub const PHOTOSHOP_SIGNATURE: &[u8] = b"Photoshop 3.0\0";

/// one APPn segment; the payload excludes the length prefix
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub marker: u8,
    pub payload: Vec<u8>,
}

/// APPn segments found before the first SOS, in file order
#[derive(Clone, Debug, Default)]
pub struct Segments {
    segments: Vec<Segment>,
}

impl Segments {
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// payloads of every segment with `marker`, repeated markers kept in order
    pub fn payloads(&self, marker: u8) -> impl Iterator<Item = &[u8]> {
        self.segments
            .iter()
            .filter(move |s| s.marker == marker)
            .map(|s| s.payload.as_slice())
    }

    pub fn concatenated(&self, marker: u8) -> Vec<u8> {
        self.payloads(marker).flat_map(|p| p.iter().copied()).collect()
    }

    /// TIFF payload of the first EXIF APP1, signature removed
    pub fn exif(&self) -> Option<&[u8]> {
        self.payloads(APP1).find_map(|p| p.strip_prefix(EXIF_SIGNATURE))
    }

    /// XMP packet of the first XMP APP1, signature removed
    pub fn xmp(&self) -> Option<&[u8]> {
        self.payloads(APP1).find_map(|p| p.strip_prefix(XMP_SIGNATURE))
    }

    /// Photoshop image resource stream.
    ///
    /// Large resource blocks are split over several APPD segments, each
    /// repeating the signature, so the bodies are joined.
    pub fn photoshop(&self) -> Option<Vec<u8>> {
        let mut found = false;
        let mut resources = vec![];
        for body in self
            .payloads(APPD)
            .filter_map(|p| p.strip_prefix(PHOTOSHOP_SIGNATURE))
        {
            found = true;
            resources.extend_from_slice(body);
        }
        if found {
            Some(resources)
        } else {
            None
        }
    }
}

fn is_app(marker: u8) -> bool {
    (0xE0..=0xEF).contains(&marker)
}

fn is_standalone(marker: u8) -> bool {
    matches!(marker, 0x00 | TEM | SOI | 0xD0..=0xD7)
}

fn truncated(err: io::Error) -> Error {
    Error::MalformedJpeg(format!("truncated segment: {err}"))
}

/// Collect the APPn segments of a JPEG stream.
///
/// Scanning stops at the first SOS (entropy coded data follows) or EOI, and
/// also at a clean end of stream between segments.
pub fn read_segments<R: Read>(rdr: &mut R) -> Result<Segments> {
    let mut soi = [0u8; 2];
    rdr.read_exact(&mut soi)
        .map_err(|_| Error::MalformedJpeg("stream too short for SOI marker".into()))?;
    if soi != [0xFF, SOI] {
        return Err(Error::MalformedJpeg(format!(
            "expected SOI marker, found {:02x} {:02x}",
            soi[0], soi[1]
        )));
    }

    let mut segments = vec![];
    loop {
        // find next segment marker
        let lead = match rdr.read_u8() {
            Ok(b) => b,
            Err(ref e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(truncated(e)),
        };
        if lead != 0xFF {
            return Err(Error::MalformedJpeg(format!(
                "expected segment marker, found 0x{lead:02x}"
            )));
        }

        let mut marker = rdr.read_u8().map_err(truncated)?;
        while marker == 0xFF {
            marker = rdr.read_u8().map_err(truncated)?;
        }

        match marker {
            SOS | EOI => break,
            m if is_standalone(m) => continue,
            _ => {}
        }

        let len = rdr.read_u16::<BigEndian>().map_err(truncated)?;
        if len < 2 {
            return Err(Error::MalformedJpeg(format!(
                "segment 0x{marker:02x} has invalid length {len}"
            )));
        }
        let len = (len - 2) as usize;

        if is_app(marker) {
            let mut payload = vec![0u8; len];
            rdr.read_exact(&mut payload).map_err(truncated)?;
            segments.push(Segment { marker, payload });
        } else {
            // skip segment
            let skipped = io::copy(&mut rdr.by_ref().take(len as u64), &mut io::sink())
                .map_err(truncated)?;
            if skipped < len as u64 {
                return Err(Error::MalformedJpeg(format!(
                    "segment 0x{marker:02x} ends after {skipped} of {len} bytes"
                )));
            }
            debug!("skipped segment 0x{marker:02x} ({len} bytes)");
        }
    }

    debug!("found {} application segments", segments.len());
    Ok(Segments { segments })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::JpegBuilder;
    use std::io::Cursor;

    fn read(bytes: &[u8]) -> Result<Segments> {
        read_segments(&mut Cursor::new(bytes))
    }

    #[test]
    fn rejects_missing_soi() {
        match read(b"{key=") {
            Err(Error::MalformedJpeg(_)) => {}
            other => panic!("expected MalformedJpeg, got {:?}", other),
        }
    }

    #[test]
    fn rejects_empty_stream() {
        assert!(matches!(read(&[]), Err(Error::MalformedJpeg(_))));
    }

    #[test]
    fn rejects_short_length() {
        let bytes = [0xFF, SOI, 0xFF, APP1, 0x00, 0x01];
        assert!(matches!(read(&bytes), Err(Error::MalformedJpeg(_))));
    }

    #[test]
    fn rejects_truncated_payload() {
        let bytes = [0xFF, SOI, 0xFF, APP1, 0x00, 0x10, b'E', b'x'];
        assert!(matches!(read(&bytes), Err(Error::MalformedJpeg(_))));
    }

    #[test]
    fn keeps_repeated_app1_in_order() {
        let jpeg = JpegBuilder::new()
            .segment(APP1, &[EXIF_SIGNATURE, &b"II*\0"[..]].concat())
            .segment(0xDB, &[0u8; 65])
            .segment(APP1, &[XMP_SIGNATURE, &b"<x:xmpmeta/>"[..]].concat())
            .build();

        let segments = read(&jpeg).expect("segments");
        assert_eq!(segments.len(), 2);
        assert_eq!(segments.payloads(APP1).count(), 2);
        assert_eq!(segments.exif(), Some(&b"II*\0"[..]));
        assert_eq!(segments.xmp(), Some(&b"<x:xmpmeta/>"[..]));
    }

    #[test]
    fn stops_at_start_of_scan() {
        let mut jpeg = JpegBuilder::new().segment(APP1, b"first").build_without_eoi();
        jpeg.extend_from_slice(&[0xFF, SOS, 0x00, 0x02, 0x12, 0x34]);
        // garbage after SOS must not be parsed as markers
        jpeg.extend_from_slice(&[0x00, 0x01, 0x02]);

        let segments = read(&jpeg).expect("segments");
        assert_eq!(segments.concatenated(APP1), b"first".to_vec());
    }

    #[test]
    fn skips_fill_bytes_and_standalone_markers() {
        let mut jpeg = vec![0xFF, SOI, 0xFF, 0xFF, 0xFF, 0xD3];
        jpeg.extend_from_slice(&[0xFF, APPD, 0x00, 0x05, b'a', b'b', b'c']);
        jpeg.extend_from_slice(&[0xFF, EOI]);

        let segments = read(&jpeg).expect("segments");
        assert_eq!(segments.concatenated(APPD), b"abc".to_vec());
    }

    #[test]
    fn joins_split_photoshop_blocks() {
        let jpeg = JpegBuilder::new()
            .segment(APPD, &[PHOTOSHOP_SIGNATURE, &b"8BIM"[..]].concat())
            .segment(APPD, b"not photoshop")
            .segment(APPD, &[PHOTOSHOP_SIGNATURE, &b"\x04\x04"[..]].concat())
            .build();

        let segments = read(&jpeg).expect("segments");
        assert_eq!(segments.photoshop(), Some(b"8BIM\x04\x04".to_vec()));
    }

    #[test]
    fn no_photoshop_block() {
        let jpeg = JpegBuilder::new().build();
        let segments = read(&jpeg).expect("segments");
        assert!(segments.is_empty());
        assert_eq!(segments.photoshop(), None);
        assert_eq!(segments.exif(), None);
    }
}
