use log::debug;

use super::{Document, Namespace};
use crate::directory::{Directory, DirectoryKind};
use crate::tag;
use crate::value::{ExifDateTime, Rational, Value};

/// how a mapped value is written
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropertyType {
    String,
    Int,
    Rational,
    DateTime,
}

/// one row of the mapping table
#[derive(Clone, Copy, Debug)]
pub struct Mapping {
    pub directory: DirectoryKind,
    pub tag: u16,
    pub namespace: Namespace,
    pub name: &'static str,
    pub kind: PropertyType,
}

const fn row(
    directory: DirectoryKind,
    tag: u16,
    namespace: Namespace,
    name: &'static str,
    kind: PropertyType,
) -> Mapping {
    Mapping { directory, tag, namespace, name, kind }
}

use self::PropertyType as T;
use crate::directory::DirectoryKind as D;
use crate::xmp::Namespace as N;

pub static MAPPINGS: &[Mapping] = &[
    row(D::Ifd0, tag::ifd0::MAKE, N::Tiff, "Make", T::String),
    row(D::Ifd0, tag::ifd0::MODEL, N::Tiff, "Model", T::String),
    row(D::Ifd0, tag::ifd0::IMAGE_DESCRIPTION, N::Dc, "description", T::String),
    row(D::Ifd0, tag::ifd0::SOFTWARE, N::Xmp, "CreatorTool", T::String),
    row(D::Ifd0, tag::ifd0::ARTIST, N::Dc, "creator", T::String),
    row(D::Ifd0, tag::ifd0::COPYRIGHT, N::Dc, "rights", T::String),
    row(D::Ifd0, tag::ifd0::DATE_TIME, N::Xmp, "ModifyDate", T::DateTime),
    row(D::SubIfd, tag::exif::SENSING_METHOD, N::Exif, "SensingMethod", T::Int),
    row(D::SubIfd, tag::exif::F_NUMBER, N::Exif, "FNumber", T::Rational),
    row(D::SubIfd, tag::exif::EXPOSURE_TIME, N::Exif, "ExposureTime", T::Rational),
    row(D::SubIfd, tag::exif::EXPOSURE_PROGRAM, N::Exif, "ExposureProgram", T::Rational),
    row(D::SubIfd, tag::exif::SAMPLES_PER_PIXEL, N::Tiff, "SamplesPerPixel", T::Int),
    row(D::SubIfd, tag::exif::EXIF_VERSION, N::Exif, "ExifVersion", T::String),
    row(D::SubIfd, tag::exif::FLASHPIX_VERSION, N::Exif, "FlashpixVersion", T::String),
    row(D::SubIfd, tag::exif::PIXEL_X_DIMENSION, N::Exif, "PixelXDimension", T::Int),
    row(D::SubIfd, tag::exif::PIXEL_Y_DIMENSION, N::Exif, "PixelYDimension", T::Int),
    row(D::SubIfd, tag::exif::DATE_TIME_ORIGINAL, N::Exif, "DateTimeOriginal", T::DateTime),
    row(D::SubIfd, tag::exif::DATE_TIME_DIGITIZED, N::Xmp, "CreateDate", T::DateTime),
    row(D::SubIfd, tag::exif::IMAGE_UNIQUE_ID, N::Exif, "ImageUniqueID", T::String),
    row(D::SubIfd, tag::exif::CAMERA_OWNER_NAME, N::ExifEx, "CameraOwnerName", T::String),
    row(D::Gps, tag::gps::VERSION_ID, N::Exif, "GPSVersionID", T::String),
    row(D::Iptc, tag::iptc::BY_LINE, N::Dc, "Creator", T::String),
    row(D::Iptc, tag::iptc::BY_LINE_TITLE, N::Photoshop, "AuthorsPosition", T::String),
];

pub fn lookup(directory: DirectoryKind, tag: u16) -> Option<&'static Mapping> {
    MAPPINGS.iter().find(|m| m.directory == directory && m.tag == tag)
}

/// Map every tag of `dir` that has a row, in directory order. Returns the
/// number of properties written.
pub fn map_directory(dir: &Directory, doc: &mut Document) -> usize {
    let mut mapped = 0;
    for (tag, value) in dir.iter() {
        let Some(m) = lookup(dir.kind, tag) else {
            continue;
        };
        match serialize_value(value, m.kind) {
            Some(s) => {
                doc.set(m.namespace, m.name, s);
                mapped += 1;
            }
            None => debug!(
                "xmp: {} tag 0x{tag:04x} cannot be written as {:?}: {value:?}",
                dir.kind, m.kind
            ),
        }
    }
    mapped
}

/// Render `value` as `kind`, or `None` if it cannot be coerced.
pub fn serialize_value(value: &Value, kind: PropertyType) -> Option<String> {
    match kind {
        PropertyType::String => as_text(value),
        PropertyType::Int => as_integer(value).map(|i| i.to_string()),
        PropertyType::Rational => as_rational(value).map(|r| r.to_string()),
        PropertyType::DateTime => value.as_datetime().as_ref().map(ExifDateTime::to_string),
    }
}

fn join<T: ToString>(items: &[T], sep: &str) -> String {
    items.iter().map(ToString::to_string).collect::<Vec<_>>().join(sep)
}

fn as_text(value: &Value) -> Option<String> {
    let s = match *value {
        Value::String(ref s) => s.clone(),
        Value::StringArray(ref v) => v.join("; "),
        Value::Int(i) => i.to_string(),
        Value::IntArray(ref v) => join(v, " "),
        Value::Rational(r) => r.to_string(),
        Value::RationalArray(ref v) => join(v, " "),
        Value::Float(f) => f.to_string(),
        Value::FloatArray(ref v) => join(v, " "),
        Value::DateTime(dt) => dt.to_string(),
        Value::Bytes(ref b) => {
            let end = b.iter().rposition(|&c| c != 0).map_or(0, |p| p + 1);
            String::from_utf8_lossy(&b[..end]).into_owned()
        }
    };
    Some(s)
}

fn as_integer(value: &Value) -> Option<i64> {
    match *value {
        Value::Rational(r) if r.den != 0 && r.num % r.den == 0 => Some(r.num / r.den),
        Value::String(ref s) => s.trim().parse().ok(),
        _ => value.as_int(),
    }
}

fn as_rational(value: &Value) -> Option<Rational> {
    match *value {
        Value::Rational(r) => Some(r),
        Value::RationalArray(ref v) if v.len() == 1 => Some(v[0]),
        _ => as_integer(value).map(|i| Rational::new(i, 1)),
    }
}
