//! Metadata extraction for JPEG images.
//!
//! A JPEG stream is scanned for its application segments, the EXIF (TIFF)
//! and IPTC blocks are decoded into typed directories, and the result is
//! assembled into a [`Metacard`]: capture date, WKT location, embedded
//! thumbnail, title and an XMP-style property document.
//!
//! ```no_run
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let card = jpegmeta::transform(&bytes, Some("photo-1")).unwrap();
//! println!("{:?} {:?}", card.created_date, card.location);
//! ```

pub mod directory;
pub mod error;
pub mod exif;
pub mod geo;
pub mod iptc;
pub mod jpeg;
pub mod metacard;
pub mod tag;
pub mod transformer;
pub mod value;
pub mod xmp;

#[cfg(test)]
mod testutil;

pub use crate::error::{DecodeError, Error, Result};
pub use crate::metacard::{Metacard, MIME_TYPE};
pub use crate::transformer::{transform, JpegInputTransformer, TransformOptions};
pub use crate::xmp::DocumentFormat;
