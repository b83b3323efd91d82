use std::fmt;

use crate::error::DecodeError;
use crate::value::Value;

/// the directories the decoders can produce
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DirectoryKind {
    Ifd0,
    SubIfd,
    Gps,
    Thumbnail,
    Iptc,
}

impl fmt::Display for DirectoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            DirectoryKind::Ifd0 => "IFD0",
            DirectoryKind::SubIfd => "ExifSubIFD",
            DirectoryKind::Gps => "GPS",
            DirectoryKind::Thumbnail => "Thumbnail",
            DirectoryKind::Iptc => "IPTC",
        };
        f.write_str(name)
    }
}

/// An ordered bag of tags.
///
/// Iteration follows insertion order, which is the order the tags were found
/// in the file.
#[derive(Clone, Debug, PartialEq)]
pub struct Directory {
    pub kind: DirectoryKind,
    entries: Vec<(u16, Value)>,
}

impl Directory {
    pub fn new(kind: DirectoryKind) -> Self {
        Directory { kind, entries: vec![] }
    }

    pub fn get(&self, tag: u16) -> Option<&Value> {
        self.entries.iter().find(|(t, _)| *t == tag).map(|(_, v)| v)
    }

    pub fn contains(&self, tag: u16) -> bool {
        self.get(tag).is_some()
    }

    /// string value of `tag`, if it holds one
    pub fn get_str(&self, tag: u16) -> Option<&str> {
        self.get(tag).and_then(Value::as_str)
    }

    /// insert or replace; a replaced tag keeps its original position
    pub fn insert(&mut self, tag: u16, value: Value) {
        match self.entries.iter_mut().find(|(t, _)| *t == tag) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((tag, value)),
        }
    }

    /// add a string to a repeatable tag, promoting it to a string array
    pub fn append_string(&mut self, tag: u16, s: String) {
        let Some(slot) = self.entries.iter_mut().find(|(t, _)| *t == tag) else {
            self.entries.push((tag, Value::String(s)));
            return;
        };
        let previous = std::mem::replace(&mut slot.1, Value::StringArray(vec![]));
        slot.1 = match previous {
            Value::StringArray(mut v) => {
                v.push(s);
                Value::StringArray(v)
            }
            Value::String(first) => Value::StringArray(vec![first, s]),
            _ => Value::String(s),
        };
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, &Value)> {
        self.entries.iter().map(|(t, v)| (*t, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// everything the decoders recovered from one image
#[derive(Clone, Debug, Default)]
pub struct Metadata {
    pub directories: Vec<Directory>,
    pub thumbnail: Option<Vec<u8>>,
    pub errors: Vec<DecodeError>,
}

impl Metadata {
    pub fn directory(&self, kind: DirectoryKind) -> Option<&Directory> {
        self.directories.iter().find(|d| d.kind == kind)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// fold another decoder's output into this one, keeping directory order
    pub fn merge(&mut self, other: Metadata) {
        self.directories.extend(other.directories);
        if self.thumbnail.is_none() {
            self.thumbnail = other.thumbnail;
        }
        self.errors.extend(other.errors);
    }
}
