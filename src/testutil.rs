//! Builders for synthetic JPEG, TIFF and IPTC byte streams used by the tests.
//!
//! ```ignore
//! let tiff = TiffBuilder::little_endian()
//!     .ifd0(0x010f, Field::Ascii("Apple"))
//!     .gps(0x0001, Field::Ascii("N"))
//!     .build();
//! let jpeg = JpegBuilder::new().exif(&tiff).build();
//! ```

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::jpeg::{APP1, APPD, EOI, EXIF_SIGNATURE, PHOTOSHOP_SIGNATURE, SOI};
use crate::tag;

// =========================================================================
// JPEG
// =========================================================================

pub struct JpegBuilder {
    bytes: Vec<u8>,
}

impl JpegBuilder {
    pub fn new() -> Self {
        JpegBuilder { bytes: vec![0xFF, SOI] }
    }

    pub fn segment(mut self, marker: u8, payload: &[u8]) -> Self {
        let len = u16::try_from(payload.len() + 2).expect("segment too large");
        self.bytes.extend_from_slice(&[0xFF, marker]);
        self.bytes.extend_from_slice(&len.to_be_bytes());
        self.bytes.extend_from_slice(payload);
        self
    }

    pub fn exif(self, tiff: &[u8]) -> Self {
        self.segment(APP1, &[EXIF_SIGNATURE, tiff].concat())
    }

    /// wrap IIM records in a Photoshop APPD segment
    pub fn iptc(self, iim: &[u8]) -> Self {
        let resources = photoshop_resource(0x0404, iim);
        self.segment(APPD, &[PHOTOSHOP_SIGNATURE, &resources[..]].concat())
    }

    pub fn build_without_eoi(self) -> Vec<u8> {
        self.bytes
    }

    /// terminates with a tiny scan so the reader has to stop at SOS
    pub fn build(mut self) -> Vec<u8> {
        self.bytes
            .extend_from_slice(&[0xFF, 0xDA, 0x00, 0x03, 0x01, 0xAB, 0xCD, 0xFF, EOI]);
        self.bytes
    }
}

// =========================================================================
// IPTC / Photoshop
// =========================================================================

/// one IIM dataset with a standard two byte length
pub fn iim(record: u8, dataset: u8, data: &[u8]) -> Vec<u8> {
    let len = u16::try_from(data.len()).expect("use iim_extended");
    let mut out = vec![0x1C, record, dataset];
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(data);
    out
}

/// one IIM dataset using the extended (four byte) length form
pub fn iim_extended(record: u8, dataset: u8, data: &[u8]) -> Vec<u8> {
    let mut out = vec![0x1C, record, dataset, 0x80, 0x04];
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(data);
    out
}

/// `8BIM` resource with an empty name, data padded to even length
pub fn photoshop_resource(id: u16, data: &[u8]) -> Vec<u8> {
    let mut out = b"8BIM".to_vec();
    out.extend_from_slice(&id.to_be_bytes());
    out.extend_from_slice(&[0, 0]);
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(data);
    if data.len() % 2 == 1 {
        out.push(0);
    }
    out
}

// =========================================================================
// TIFF
// =========================================================================

#[derive(Clone, Debug)]
pub enum Field {
    Byte(Vec<u8>),
    Ascii(&'static str),
    Short(Vec<u16>),
    Long(Vec<u32>),
    Rational(Vec<(u32, u32)>),
    SRational(Vec<(i32, i32)>),
    Undefined(Vec<u8>),
    Double(Vec<f64>),
    /// entry written verbatim: field type, count and the 4 value bytes
    Raw(u16, u32, [u8; 4]),
}

impl Field {
    fn field_type(&self) -> u16 {
        match *self {
            Field::Byte(_) => 1,
            Field::Ascii(_) => 2,
            Field::Short(_) => 3,
            Field::Long(_) => 4,
            Field::Rational(_) => 5,
            Field::Undefined(_) => 7,
            Field::SRational(_) => 10,
            Field::Double(_) => 12,
            Field::Raw(t, _, _) => t,
        }
    }

    fn count(&self) -> u32 {
        let n = match *self {
            Field::Byte(ref v) | Field::Undefined(ref v) => v.len(),
            Field::Ascii(s) => s.len() + 1,
            Field::Short(ref v) => v.len(),
            Field::Long(ref v) => v.len(),
            Field::Rational(ref v) => v.len(),
            Field::SRational(ref v) => v.len(),
            Field::Double(ref v) => v.len(),
            Field::Raw(_, n, _) => return n,
        };
        n as u32
    }

    fn encode<B: ByteOrder>(&self) -> Vec<u8> {
        let mut out = vec![];
        match *self {
            Field::Byte(ref v) | Field::Undefined(ref v) => out.extend_from_slice(v),
            Field::Ascii(s) => {
                out.extend_from_slice(s.as_bytes());
                out.push(0);
            }
            Field::Short(ref v) => v.iter().for_each(|&x| out.extend_from_slice(&u16_bytes::<B>(x))),
            Field::Long(ref v) => v.iter().for_each(|&x| out.extend_from_slice(&u32_bytes::<B>(x))),
            Field::Rational(ref v) => {
                for &(n, d) in v {
                    out.extend_from_slice(&u32_bytes::<B>(n));
                    out.extend_from_slice(&u32_bytes::<B>(d));
                }
            }
            Field::SRational(ref v) => {
                for &(n, d) in v {
                    out.extend_from_slice(&u32_bytes::<B>(n as u32));
                    out.extend_from_slice(&u32_bytes::<B>(d as u32));
                }
            }
            Field::Double(ref v) => {
                for &x in v {
                    let mut buf = [0u8; 8];
                    B::write_f64(&mut buf, x);
                    out.extend_from_slice(&buf);
                }
            }
            Field::Raw(_, _, raw) => out.extend_from_slice(&raw),
        }
        out
    }
}

fn u16_bytes<B: ByteOrder>(v: u16) -> [u8; 2] {
    let mut buf = [0u8; 2];
    B::write_u16(&mut buf, v);
    buf
}

fn u32_bytes<B: ByteOrder>(v: u32) -> [u8; 4] {
    let mut buf = [0u8; 4];
    B::write_u32(&mut buf, v);
    buf
}

type Entries = Vec<(u16, Field)>;

/// Lays out a TIFF stream: header, IFD0, ExifSubIFD, GPS IFD and an
/// optional thumbnail IFD chained after IFD0.
#[derive(Clone, Debug, Default)]
pub struct TiffBuilder {
    big_endian: bool,
    ifd0: Entries,
    sub_ifd: Option<Entries>,
    gps: Option<Entries>,
    thumbnail: Option<(Entries, Vec<u8>)>,
}

impl TiffBuilder {
    pub fn little_endian() -> Self {
        TiffBuilder::default()
    }

    pub fn big_endian() -> Self {
        TiffBuilder { big_endian: true, ..TiffBuilder::default() }
    }

    pub fn ifd0(mut self, tag: u16, field: Field) -> Self {
        self.ifd0.push((tag, field));
        self
    }

    pub fn sub_ifd(mut self, tag: u16, field: Field) -> Self {
        self.sub_ifd.get_or_insert_with(Vec::new).push((tag, field));
        self
    }

    pub fn gps(mut self, tag: u16, field: Field) -> Self {
        self.gps.get_or_insert_with(Vec::new).push((tag, field));
        self
    }

    /// thumbnail IFD whose JPEGInterchangeFormat points at `data`
    pub fn thumbnail(mut self, data: Vec<u8>) -> Self {
        self.thumbnail = Some((vec![], data));
        self
    }

    /// thumbnail IFD with the given entries and no thumbnail data
    pub fn thumbnail_ifd(mut self, entries: Entries) -> Self {
        self.thumbnail = Some((entries, vec![]));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        if self.big_endian {
            self.layout::<BigEndian>(b"MM")
        } else {
            self.layout::<LittleEndian>(b"II")
        }
    }

    fn layout<B: ByteOrder>(&self, marker: &[u8; 2]) -> Vec<u8> {
        let mut out = marker.to_vec();
        out.extend_from_slice(&u16_bytes::<B>(42));
        out.extend_from_slice(&u32_bytes::<B>(8));

        let mut ifd0 = self.ifd0.clone();
        if self.sub_ifd.is_some() {
            ifd0.push((tag::EXIF_IFD_POINTER, Field::Long(vec![0])));
        }
        if self.gps.is_some() {
            ifd0.push((tag::GPS_INFO_IFD_POINTER, Field::Long(vec![0])));
        }
        let ifd0 = write_ifd::<B>(&mut out, &ifd0);

        if let Some(ref entries) = self.sub_ifd {
            let offset = out.len() as u32;
            patch::<B>(&mut out, ifd0.value_pos(tag::EXIF_IFD_POINTER), offset);
            write_ifd::<B>(&mut out, entries);
        }
        if let Some(ref entries) = self.gps {
            let offset = out.len() as u32;
            patch::<B>(&mut out, ifd0.value_pos(tag::GPS_INFO_IFD_POINTER), offset);
            write_ifd::<B>(&mut out, entries);
        }
        if let Some((ref entries, ref data)) = self.thumbnail {
            let offset = out.len() as u32;
            patch::<B>(&mut out, ifd0.next_pos, offset);

            let mut entries = entries.clone();
            if !data.is_empty() {
                entries.push((tag::thumbnail::JPEG_INTERCHANGE_FORMAT, Field::Long(vec![0])));
                entries.push((
                    tag::thumbnail::JPEG_INTERCHANGE_FORMAT_LENGTH,
                    Field::Long(vec![data.len() as u32]),
                ));
            }
            let thumb = write_ifd::<B>(&mut out, &entries);
            if !data.is_empty() {
                let data_offset = out.len() as u32;
                out.extend_from_slice(data);
                patch::<B>(
                    &mut out,
                    thumb.value_pos(tag::thumbnail::JPEG_INTERCHANGE_FORMAT),
                    data_offset,
                );
            }
        }
        out
    }
}

struct IfdLayout {
    value_positions: Vec<(u16, usize)>,
    next_pos: usize,
}

impl IfdLayout {
    fn value_pos(&self, tag: u16) -> usize {
        self.value_positions
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, p)| *p)
            .unwrap_or_else(|| panic!("tag 0x{tag:04x} not laid out"))
    }
}

fn patch<B: ByteOrder>(out: &mut [u8], pos: usize, value: u32) {
    B::write_u32(&mut out[pos..pos + 4], value);
}

/// entry table, zero next-IFD pointer, then out-of-line values
fn write_ifd<B: ByteOrder>(out: &mut Vec<u8>, entries: &[(u16, Field)]) -> IfdLayout {
    let start = out.len();
    let mut data_offset = start + 2 + entries.len() * 12 + 4;
    let mut data = vec![];
    let mut value_positions = vec![];

    out.extend_from_slice(&u16_bytes::<B>(entries.len() as u16));
    for (tag, field) in entries {
        out.extend_from_slice(&u16_bytes::<B>(*tag));
        out.extend_from_slice(&u16_bytes::<B>(field.field_type()));
        out.extend_from_slice(&u32_bytes::<B>(field.count()));
        value_positions.push((*tag, out.len()));

        let encoded = field.encode::<B>();
        if encoded.len() <= 4 {
            let mut inline = [0u8; 4];
            inline[..encoded.len()].copy_from_slice(&encoded);
            out.extend_from_slice(&inline);
        } else {
            out.extend_from_slice(&u32_bytes::<B>(data_offset as u32));
            data_offset += encoded.len();
            data.extend_from_slice(&encoded);
        }
    }
    let next_pos = out.len();
    out.extend_from_slice(&[0u8; 4]);
    out.extend_from_slice(&data);

    IfdLayout { value_positions, next_pos }
}

/// stand-in for an embedded JPEG thumbnail of `len` bytes
pub fn fake_thumbnail(len: usize) -> Vec<u8> {
    let mut data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
    if len >= 4 {
        data[..2].copy_from_slice(&[0xFF, SOI]);
        data[len - 2..].copy_from_slice(&[0xFF, EOI]);
    }
    data
}
