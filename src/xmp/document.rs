use std::borrow::Cow;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use super::Namespace;
use crate::error::DecodeError;

const X_NS: &str = "adobe:ns:meta/";
const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

/// output encoding of the property document
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// XMP packet (RDF/XML)
    #[default]
    Xml,
    /// JSON object keyed by `{namespace}name`
    Json,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Property {
    pub namespace: Namespace,
    pub name: &'static str,
    pub value: String,
}

impl Property {
    /// `{namespace-uri}name`
    pub fn key(&self) -> String {
        format!("{{{}}}{}", self.namespace.uri(), self.name)
    }

    fn qualified_name(&self) -> String {
        format!("{}:{}", self.namespace.prefix(), self.name)
    }
}

/// namespaced properties in insertion order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    properties: Vec<Property>,
}

impl Document {
    pub fn new() -> Self {
        Document::default()
    }

    /// set a property; setting an existing one replaces its value in place
    pub fn set(&mut self, namespace: Namespace, name: &'static str, value: String) {
        match self
            .properties
            .iter_mut()
            .find(|p| p.namespace == namespace && p.name == name)
        {
            Some(p) => p.value = value,
            None => self.properties.push(Property { namespace, name, value }),
        }
    }

    pub fn get(&self, namespace: Namespace, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.namespace == namespace && p.name == name)
            .map(|p| p.value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// namespaces needing a declaration, in canonical order
    fn declared_namespaces(&self) -> Vec<Namespace> {
        let mut used: Vec<Namespace> = self
            .properties
            .iter()
            .map(|p| p.namespace)
            .filter(|ns| *ns != Namespace::Xml)
            .collect();
        used.sort();
        used.dedup();
        used
    }

    pub fn serialize(&self, format: DocumentFormat, indent: usize) -> Result<String, DecodeError> {
        match format {
            DocumentFormat::Xml => self.to_xml(indent),
            DocumentFormat::Json => self.to_json(indent > 0),
        }
    }

    /// XMP packet with a single `rdf:Description`; `indent` of 0 writes one line
    pub fn to_xml(&self, indent: usize) -> Result<String, DecodeError> {
        let mut writer = if indent > 0 {
            Writer::new_with_indent(Vec::new(), b' ', indent)
        } else {
            Writer::new(Vec::new())
        };

        let mut description = BytesStart::new("rdf:Description").with_attributes([("rdf:about", "")]);
        let declarations: Vec<(String, &str)> = self
            .declared_namespaces()
            .into_iter()
            .map(|ns| (format!("xmlns:{}", ns.prefix()), ns.uri()))
            .collect();
        for (attr, uri) in &declarations {
            description.push_attribute((attr.as_str(), *uri));
        }

        write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        write(&mut writer, Event::Start(BytesStart::new("x:xmpmeta").with_attributes([("xmlns:x", X_NS)])))?;
        write(&mut writer, Event::Start(BytesStart::new("rdf:RDF").with_attributes([("xmlns:rdf", RDF_NS)])))?;
        write(&mut writer, Event::Start(description))?;
        for p in &self.properties {
            let name = p.qualified_name();
            let text = xml_chars(&p.value);
            write(&mut writer, Event::Start(BytesStart::new(name.as_str())))?;
            write(&mut writer, Event::Text(BytesText::new(&text)))?;
            write(&mut writer, Event::End(BytesEnd::new(name.as_str())))?;
        }
        write(&mut writer, Event::End(BytesEnd::new("rdf:Description")))?;
        write(&mut writer, Event::End(BytesEnd::new("rdf:RDF")))?;
        write(&mut writer, Event::End(BytesEnd::new("x:xmpmeta")))?;

        String::from_utf8(writer.into_inner())
            .map_err(|e| DecodeError::Internal(format!("XMP is not UTF-8: {e}")))
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, DecodeError> {
        let json = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        json.map_err(|e| DecodeError::Internal(format!("writing JSON: {e}")))
    }
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), DecodeError> {
    writer
        .write_event(event)
        .map_err(|e| DecodeError::Internal(format!("writing XMP: {e}")))
}

/// drop characters outside the XML 1.0 `Char` production
fn xml_chars(s: &str) -> Cow<'_, str> {
    fn allowed(c: char) -> bool {
        matches!(c, '\t' | '\n' | '\r' | ' '..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
    }
    if s.chars().all(allowed) {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(s.chars().filter(|&c| allowed(c)).collect())
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.properties.len()))?;
        for p in &self.properties {
            map.serialize_entry(&p.key(), &p.value)?;
        }
        map.end()
    }
}
