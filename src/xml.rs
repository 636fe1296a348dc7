//! Generic XML to nested mapping decoding.
//!
//! NameSilo replies are small documents whose shape depends on the operation,
//! and some of them (prices, availability) use data as element names. Instead
//! of one serde struct per reply, documents are decoded into an [`XmlValue`]
//! tree and each operation picks out what it needs.
//!
//! Decoding rules:
//! - the document is a one-entry map `{root_name: value}`
//! - an element without attributes or children is `Null` when empty, `Text` otherwise
//! - attributes become `@name` keys, text next to attributes or children becomes `#text`
//! - an element name repeated under the same parent becomes a `List`

use crate::error::{NameSiloError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Key under which mixed text content is stored
pub const TEXT_KEY: &str = "#text";

/// A decoded XML node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum XmlValue {
    /// Empty element
    Null,
    /// Text-only element
    Text(String),
    /// Element with attributes and/or children
    Map(BTreeMap<String, XmlValue>),
    /// Repeated sibling elements, in document order
    List(Vec<XmlValue>),
}

/// Element being assembled while its end tag has not been read yet
struct Frame {
    name: String,
    entries: BTreeMap<String, XmlValue>,
    has_children: bool,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attribute.key.as_ref());
            let value = attribute.unescape_value()?;
            entries.insert(format!("@{}", key), XmlValue::Text(value.into_owned()));
        }

        Ok(Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            entries,
            has_children: false,
            text: String::new(),
        })
    }

    fn push_child(&mut self, name: String, value: XmlValue) {
        self.has_children = true;
        match self.entries.entry(name) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(mut slot) => {
                // an element never decodes to a List, so an existing List means repetition
                let existing = slot.get_mut();
                if let XmlValue::List(items) = existing {
                    items.push(value);
                } else {
                    let first = std::mem::replace(existing, XmlValue::Null);
                    *existing = XmlValue::List(vec![first, value]);
                }
            }
        }
    }

    fn close(self) -> (String, XmlValue) {
        let text = self.text.trim();
        let value = if self.entries.is_empty() && !self.has_children {
            if text.is_empty() {
                XmlValue::Null
            } else {
                XmlValue::Text(text.to_string())
            }
        } else {
            let mut entries = self.entries;
            if !text.is_empty() {
                entries.insert(TEXT_KEY.to_string(), XmlValue::Text(text.to_string()));
            }
            XmlValue::Map(entries)
        };
        (self.name, value)
    }
}

impl XmlValue {
    /// Decode an XML document
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Frame> = Vec::new();
        let mut root: Option<(String, XmlValue)> = None;

        loop {
            match reader.read_event()? {
                Event::Start(start) => stack.push(Frame::open(&start)?),
                Event::Empty(start) => {
                    let frame = Frame::open(&start)?;
                    attach(frame, &mut stack, &mut root)?;
                }
                Event::End(_) => {
                    let frame = stack.pop().ok_or_else(|| {
                        NameSiloError::unexpected_response("closing tag without an open element")
                    })?;
                    attach(frame, &mut stack, &mut root)?;
                }
                Event::Text(text) => {
                    if let Some(frame) = stack.last_mut() {
                        frame.text.push_str(&text.unescape()?);
                    }
                }
                Event::CData(data) => {
                    if let Some(frame) = stack.last_mut() {
                        frame.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(NameSiloError::unexpected_response(format!(
                "document ended inside <{}>",
                open.name
            )));
        }

        let (name, value) =
            root.ok_or_else(|| NameSiloError::unexpected_response("empty XML document"))?;
        Ok(XmlValue::Map(BTreeMap::from([(name, value)])))
    }

    /// Child entry of a map
    pub fn get(&self, key: &str) -> Option<&XmlValue> {
        match self {
            XmlValue::Map(entries) => entries.get(key),
            _ => None,
        }
    }

    /// Follow a sequence of keys
    pub fn path(&self, keys: &[&str]) -> Option<&XmlValue> {
        keys.iter().try_fold(self, |node, key| node.get(key))
    }

    /// Take a child entry out of a map
    pub fn into_child(self, key: &str) -> Option<XmlValue> {
        match self {
            XmlValue::Map(mut entries) => entries.remove(key),
            _ => None,
        }
    }

    /// Text content of a text element, or the `#text` of an element with attributes
    pub fn as_text(&self) -> Option<&str> {
        match self {
            XmlValue::Text(text) => Some(text),
            XmlValue::Map(entries) => entries.get(TEXT_KEY).and_then(XmlValue::as_text),
            _ => None,
        }
    }

    /// Non-empty text of a child element
    pub fn text_of(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(XmlValue::as_text)
            .filter(|text| !text.is_empty())
    }

    /// Attribute value of an element
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.get(&format!("@{}", name)).and_then(XmlValue::as_text)
    }

    /// Entries of a map
    pub fn as_map(&self) -> Option<&BTreeMap<String, XmlValue>> {
        match self {
            XmlValue::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Whether this is an empty element
    pub fn is_null(&self) -> bool {
        matches!(self, XmlValue::Null)
    }

    /// Iterate over an element that may occur zero, one or many times.
    ///
    /// A `List` yields its items, `Null` yields nothing and any other value
    /// yields itself.
    pub fn items(&self) -> std::slice::Iter<'_, XmlValue> {
        match self {
            XmlValue::List(items) => items.iter(),
            XmlValue::Null => {
                let empty: &[XmlValue] = &[];
                empty.iter()
            }
            single => std::slice::from_ref(single).iter(),
        }
    }
}

fn attach(
    frame: Frame,
    stack: &mut [Frame],
    root: &mut Option<(String, XmlValue)>,
) -> Result<()> {
    let (name, value) = frame.close();
    match stack.last_mut() {
        Some(parent) => parent.push_child(name, value),
        None if root.is_none() => *root = Some((name, value)),
        None => {
            return Err(NameSiloError::unexpected_response(format!(
                "second root element <{}>",
                name
            )))
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_root_is_mapping() {
        let doc = XmlValue::parse("<?xml version='1.0' encoding='UTF-8'?><example></example>")
            .unwrap();
        assert!(doc.as_map().is_some());
        assert!(doc.get("example").unwrap().is_null());
    }

    #[test]
    fn test_nested_text_and_attributes() {
        let doc = XmlValue::parse(
            r#"<namesilo>
                 <reply>
                   <code>300</code>
                   <detail>success</detail>
                   <available>
                     <domain price="8.99" premium="0">example.com</domain>
                   </available>
                 </reply>
               </namesilo>"#,
        )
        .unwrap();

        assert_eq!(
            doc.path(&["namesilo", "reply", "code"]).and_then(XmlValue::as_text),
            Some("300")
        );
        let domain = doc
            .path(&["namesilo", "reply", "available", "domain"])
            .unwrap();
        assert_eq!(domain.as_text(), Some("example.com"));
        assert_eq!(domain.attribute("price"), Some("8.99"));
        assert_eq!(domain.attribute("missing"), None);
    }

    #[test]
    fn test_repeated_elements_become_list() {
        let doc = XmlValue::parse(
            "<domains><domain>a.com</domain><domain>b.com</domain><domain>c.com</domain></domains>",
        )
        .unwrap();
        let domains: Vec<_> = doc
            .path(&["domains", "domain"])
            .unwrap()
            .items()
            .filter_map(XmlValue::as_text)
            .collect();
        assert_eq!(domains, vec!["a.com", "b.com", "c.com"]);
    }

    #[test]
    fn test_items_of_single_and_empty() {
        let doc = XmlValue::parse("<r><one><x>1</x></one><none/></r>").unwrap();
        assert_eq!(doc.path(&["r", "one"]).unwrap().items().count(), 1);
        assert_eq!(doc.path(&["r", "none"]).unwrap().items().count(), 0);
    }

    #[test]
    fn test_entities_and_cdata() {
        let doc =
            XmlValue::parse("<r><a>Smith &amp; Sons</a><b><![CDATA[<raw>]]></b></r>").unwrap();
        assert_eq!(doc.path(&["r"]).unwrap().text_of("a"), Some("Smith & Sons"));
        assert_eq!(doc.path(&["r"]).unwrap().text_of("b"), Some("<raw>"));
    }

    #[test]
    fn test_mixed_text_under_text_key() {
        let doc = XmlValue::parse("<r id=\"7\">hello<c/></r>").unwrap();
        let r = doc.get("r").unwrap();
        assert_eq!(r.attribute("id"), Some("7"));
        assert_eq!(r.as_text(), Some("hello"));
        assert!(r.get("c").unwrap().is_null());
    }

    #[test]
    fn test_malformed_documents() {
        assert!(XmlValue::parse("").is_err());
        assert!(XmlValue::parse("<a><b></a>").is_err());
        assert!(XmlValue::parse("<a>").is_err());
        assert!(XmlValue::parse("not xml at all").is_err());
    }

    #[test]
    fn test_into_child() {
        let doc = XmlValue::parse("<r><c>x</c></r>").unwrap();
        let r = doc.into_child("r").unwrap();
        assert_eq!(r.into_child("c"), Some(XmlValue::Text("x".to_string())));
    }
}
