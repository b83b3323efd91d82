//! XMP-style property document: the tag mapping table and its serializer.

mod document;
pub mod mapping;

pub use self::document::{Document, DocumentFormat, Property};

/// Output namespaces, in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Namespace {
    Tiff,
    Exif,
    ExifEx,
    Xmp,
    Dc,
    Photoshop,
    /// predeclared by XML itself, never written as `xmlns:`
    Xml,
}

impl Namespace {
    pub fn prefix(self) -> &'static str {
        match self {
            Namespace::Tiff => "tiff",
            Namespace::Exif => "exif",
            Namespace::ExifEx => "exifEX",
            Namespace::Xmp => "xmp",
            Namespace::Dc => "dc",
            Namespace::Photoshop => "photoshop",
            Namespace::Xml => "xml",
        }
    }

    pub fn uri(self) -> &'static str {
        match self {
            Namespace::Tiff => "http://ns.adobe.com/tiff/1.0/",
            Namespace::Exif => "http://ns.adobe.com/exif/1.0/",
            Namespace::ExifEx => "http://cipa.jp/exif/1.0/",
            Namespace::Xmp => "http://ns.adobe.com/xap/1.0/",
            Namespace::Dc => "http://purl.org/dc/elements/1.1/",
            Namespace::Photoshop => "http://ns.adobe.com/photoshop/1.0/",
            Namespace::Xml => "http://www.w3.org/XML/1998/namespace",
        }
    }
}
