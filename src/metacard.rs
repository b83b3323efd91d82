use log::debug;

use crate::directory::{DirectoryKind, Metadata};
use crate::error::Result;
use crate::geo::GeoLocation;
use crate::tag;
use crate::transformer::TransformOptions;
use crate::value::{ExifDateTime, Value};
use crate::xmp::{mapping, Document, Namespace};

pub const MIME_TYPE: &str = "image/jpeg";

/// catalog record produced for one image
#[derive(Clone, Debug, PartialEq)]
pub struct Metacard {
    pub id: Option<String>,
    /// always [`MIME_TYPE`]
    pub content_type: &'static str,
    pub created_date: Option<ExifDateTime>,
    /// WKT `POINT(lon lat)`
    pub location: Option<String>,
    pub thumbnail: Option<Vec<u8>>,
    pub title: Option<String>,
    /// serialized property document
    pub metadata: String,
    /// byte length of the input, when known
    pub resource_size: Option<u64>,
}

/// Preference order for the created date. The first source holding a valid
/// date/time wins.
const CREATED_DATE_SOURCES: [(DirectoryKind, u16); 3] = [
    (DirectoryKind::SubIfd, tag::exif::DATE_TIME_ORIGINAL),
    (DirectoryKind::SubIfd, tag::exif::DATE_TIME_DIGITIZED),
    (DirectoryKind::Ifd0, tag::ifd0::DATE_TIME),
];

const TITLE_SOURCES: [u16; 2] = [tag::iptc::HEADLINE, tag::iptc::CAPTION];

/// Compose a metacard from decoded metadata.
pub fn assemble(meta: &Metadata, id: Option<&str>, options: &TransformOptions) -> Result<Metacard> {
    let document = build_document(meta);
    let metadata = document.serialize(options.format, options.indent)?;

    Ok(Metacard {
        id: id.map(str::to_owned),
        content_type: MIME_TYPE,
        created_date: created_date(meta),
        location: location(meta),
        thumbnail: meta.thumbnail.clone(),
        title: title(meta),
        metadata,
        resource_size: None,
    })
}

/// every mapped tag in directory order, then the `errors` marker
pub fn build_document(meta: &Metadata) -> Document {
    let mut doc = Document::new();
    for dir in &meta.directories {
        let n = mapping::map_directory(dir, &mut doc);
        debug!("metacard: {n} of {} {} tags mapped", dir.len(), dir.kind);
    }
    let marker = if meta.has_errors() { "yes" } else { "no" };
    doc.set(Namespace::Xml, "errors", marker.to_owned());
    doc
}

fn created_date(meta: &Metadata) -> Option<ExifDateTime> {
    CREATED_DATE_SOURCES.iter().find_map(|&(kind, tag)| {
        meta.directory(kind)?.get(tag)?.as_datetime()
    })
}

fn location(meta: &Metadata) -> Option<String> {
    let gps = meta.directory(DirectoryKind::Gps)?;
    match GeoLocation::from_gps(gps) {
        Some(loc) => Some(loc.to_wkt()),
        None => {
            debug!("metacard: GPS directory without a usable position");
            None
        }
    }
}

fn title(meta: &Metadata) -> Option<String> {
    let iptc = meta.directory(DirectoryKind::Iptc)?;
    TITLE_SOURCES.iter().find_map(|&tag| {
        let text = match iptc.get(tag)? {
            Value::String(s) => s.as_str(),
            Value::StringArray(v) => v.first()?.as_str(),
            _ => return None,
        };
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_owned())
    })
}
