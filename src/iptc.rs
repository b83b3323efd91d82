//! IPTC-IIM decoding from the Photoshop image resources of APPD.
//!
//! Resource layout: `8BIM`, resource id (u16), Pascal-string name padded to
//! an even length, data size (u32), data padded to an even length. The IIM
//! stream lives in resource `0x0404`.
//!
//! IIM dataset layout:
//!   Byte 0:    0x1C (tag marker)
//!   Byte 1:    record number
//!   Byte 2:    dataset number
//!   Bytes 3-4: data length (big-endian u16); with the high bit set the low
//!              15 bits give the width of an extended length that follows
//!   Bytes 5+:  data

use byteorder::{BigEndian, ByteOrder};
use log::{debug, warn};

use crate::directory::{Directory, DirectoryKind, Metadata};
use crate::error::DecodeError;
use crate::tag;
use crate::value::Value;

const BIM_MARKER: &[u8] = b"8BIM";
pub const IPTC_RESOURCE_ID: u16 = 0x0404;
const TAG_MARKER: u8 = 0x1C;
const UTF8_ESCAPE: &[u8] = b"\x1b%G";

/// Decode the IPTC directory from a Photoshop resource stream (the APPD
/// payload with its `Photoshop 3.0\0` signature removed).
pub fn decode(resources: &[u8]) -> Metadata {
    match find_resource(resources, IPTC_RESOURCE_ID) {
        Some(iim) => decode_iim(iim),
        None => {
            debug!("iptc: no IPTC resource in Photoshop block");
            Metadata::default()
        }
    }
}

/// Data of the first image resource with `id`.
pub fn find_resource(resources: &[u8], id: u16) -> Option<&[u8]> {
    let mut pos = 0;
    while pos + 12 <= resources.len() {
        if &resources[pos..pos + 4] != BIM_MARKER {
            debug!("iptc: resource stream ends at offset {pos} without 8BIM marker");
            return None;
        }
        let resource_id = BigEndian::read_u16(&resources[pos + 4..pos + 6]);
        pos += 6;

        // Pascal string: 1 byte length + string, padded to even
        let name_len = resources[pos] as usize;
        pos += (1 + name_len + 1) & !1;

        let size = BigEndian::read_u32(resources.get(pos..pos + 4)?) as usize;
        pos += 4;

        let data = resources.get(pos..pos.checked_add(size)?)?;
        if resource_id == id {
            return Some(data);
        }
        pos += size + (size & 1);
    }
    None
}

/// Decode a raw IIM stream into an IPTC directory.
pub fn decode_iim(data: &[u8]) -> Metadata {
    let mut meta = Metadata::default();
    let mut directory = Directory::new(DirectoryKind::Iptc);
    let mut utf8 = false;
    let mut resyncing = false;
    let mut pos = 0;

    while pos < data.len() {
        if data[pos] != TAG_MARKER {
            // zero padding after the last record is not damage
            if data[pos] != 0 && !resyncing {
                fail(&mut meta.errors, DecodeError::InvalidIptcMarker { offset: pos, found: data[pos] });
                resyncing = true;
            }
            pos += 1;
            continue;
        }
        resyncing = false;

        let Some(head) = data.get(pos + 1..pos + 5) else {
            let record = data.get(pos + 1).copied().unwrap_or(0);
            let dataset = data.get(pos + 2).copied().unwrap_or(0);
            fail(&mut meta.errors, DecodeError::TruncatedIptcRecord { record, dataset });
            break;
        };
        let (record, dataset) = (head[0], head[1]);
        let short_len = BigEndian::read_u16(&head[2..4]);
        pos += 5;

        let len = if short_len & 0x8000 != 0 {
            let width = (short_len & 0x7FFF) as usize;
            match data.get(pos..pos + width) {
                Some(b) if (1..=8).contains(&width) => {
                    pos += width;
                    BigEndian::read_uint(b, width) as usize
                }
                _ => {
                    fail(&mut meta.errors, DecodeError::TruncatedIptcRecord { record, dataset });
                    break;
                }
            }
        } else {
            short_len as usize
        };

        let Some(value) = pos.checked_add(len).and_then(|end| data.get(pos..end)) else {
            fail(&mut meta.errors, DecodeError::TruncatedIptcRecord { record, dataset });
            break;
        };
        pos += len;

        let key = tag::iptc::key(record, dataset);
        match key {
            _ if dataset == 0 && value.len() == 2 => {
                directory.insert(key, Value::Int(BigEndian::read_u16(value) as i64));
            }
            tag::iptc::CODED_CHARACTER_SET => {
                utf8 = value == UTF8_ESCAPE;
                directory.insert(key, Value::Bytes(value.to_vec()));
            }
            _ => directory.append_string(key, decode_text(value, utf8)),
        }
    }

    debug!("iptc: {} datasets decoded", directory.len());
    if !directory.is_empty() {
        meta.directories.push(directory);
    }
    meta
}

fn fail(errors: &mut Vec<DecodeError>, err: DecodeError) {
    warn!("iptc: {err}");
    errors.push(err);
}

/// UTF-8 when declared or valid, otherwise ISO-8859-1
fn decode_text(value: &[u8], utf8: bool) -> String {
    let value: &[u8] = match value.iter().rposition(|&c| c != 0) {
        Some(p) => &value[..=p],
        None => &[],
    };
    if utf8 {
        return String::from_utf8_lossy(value).into_owned();
    }
    match std::str::from_utf8(value) {
        Ok(s) => s.to_owned(),
        Err(_) => value.iter().map(|&b| b as char).collect(),
    }
}
