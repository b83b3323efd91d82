use std::fmt;
use std::io::Read;

use log::debug;
use serde::Deserialize;

use crate::directory::Metadata;
use crate::error::{Error, Result};
use crate::jpeg::{self, Segments};
use crate::metacard::{self, Metacard, MIME_TYPE};
use crate::xmp::DocumentFormat;
use crate::{exif, iptc};

/// Options for the metadata document.
///
/// Unset fields take their defaults, so `{}` is a valid configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    pub format: DocumentFormat,
    /// spaces per nesting level; 0 writes the document on one line
    pub indent: usize,
}

impl Default for TransformOptions {
    fn default() -> Self {
        TransformOptions { format: DocumentFormat::Xml, indent: 1 }
    }
}

impl TransformOptions {
    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| Error::InvalidInput(format!("bad transform options: {e}")))
    }
}

/// Turns JPEG streams into metacards.
#[derive(Clone, Debug, Default)]
pub struct JpegInputTransformer {
    options: TransformOptions,
}

impl JpegInputTransformer {
    pub const ID: &'static str = "jpeg";

    pub fn new(options: TransformOptions) -> Self {
        JpegInputTransformer { options }
    }

    /// Read the whole stream and build its metacard.
    pub fn transform<R: Read>(&self, input: Option<R>, id: Option<&str>) -> Result<Metacard> {
        let mut input = input.ok_or_else(|| Error::InvalidInput("cannot transform null input".into()))?;
        let mut bytes = vec![];
        input.read_to_end(&mut bytes).map_err(Error::unreadable)?;
        self.transform_bytes(&bytes, id)
    }

    pub fn transform_bytes(&self, bytes: &[u8], id: Option<&str>) -> Result<Metacard> {
        let segments = jpeg::read_segments(&mut &bytes[..])?;
        let meta = extract(&segments);
        debug!(
            "{} directories, {} decode errors",
            meta.directories.len(),
            meta.errors.len()
        );

        let mut card = metacard::assemble(&meta, id, &self.options)?;
        card.resource_size = Some(bytes.len() as u64);
        Ok(card)
    }
}

impl fmt::Display for JpegInputTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InputTransformer {{id={}, mime-type={}}}", Self::ID, MIME_TYPE)
    }
}

/// Run the EXIF and IPTC decoders over the application segments.
pub fn extract(segments: &Segments) -> Metadata {
    let mut meta = Metadata::default();

    match segments.exif() {
        Some(tiff) => meta.merge(exif::decode(tiff)),
        None => debug!("no EXIF segment"),
    }
    if let Some(packet) = segments.xmp() {
        debug!("XMP packet of {} bytes present, not merged", packet.len());
    }
    if let Some(resources) = segments.photoshop() {
        meta.merge(iptc::decode(&resources));
    }
    meta
}

/// [`JpegInputTransformer::transform_bytes`] with default options
pub fn transform(bytes: &[u8], id: Option<&str>) -> Result<Metacard> {
    JpegInputTransformer::default().transform_bytes(bytes, id)
}
