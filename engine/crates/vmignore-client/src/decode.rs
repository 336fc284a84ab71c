//! XML response decoding
//!
//! Responses are decoded into a generic [`Value`] tree: element names become
//! map keys, repeated sibling elements become a [`Value::List`], attributes
//! are keyed `@name` and mixed text is keyed `#text`. Elements holding only
//! text decode to [`Value::Text`]; empty elements decode to [`Value::Null`].

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fmt;
use thiserror::Error;

/// Errors raised while decoding a response
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("malformed XML: {0}")]
    Malformed(String),

    #[error("unexpected response <{found}>, expected <{expected}>")]
    UnexpectedRoot { expected: String, found: String },

    #[error("response has no {0}")]
    MissingNode(String),

    #[error("API error {code}: {message}")]
    Upstream { code: String, message: String },
}

/// A decoded XML node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Text(String),
    Map(Vec<(String, Value)>),
    List(Vec<Value>),
}

impl Value {
    /// Child of a map node
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Node at a nested path of map keys
    pub fn at(&self, path: &[&str]) -> Option<&Value> {
        path.iter().try_fold(self, |node, key| node.get(key))
    }

    /// Take the node at a nested path, consuming the tree
    pub fn into_at(self, path: &[&str]) -> Option<Value> {
        path.iter().try_fold(self, |node, key| match node {
            Value::Map(entries) => entries.into_iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        })
    }

    /// Text content: a text node, an empty node, or a map's `#text`
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            Value::Null => Some(""),
            Value::Map(_) => self.get("#text").and_then(Value::as_text),
            Value::List(_) => None,
        }
    }

    /// Text of a child, or "" when the child is absent
    pub fn text(&self, key: &str) -> &str {
        self.get(key).and_then(Value::as_text).unwrap_or_default()
    }

    /// Repeated-element view: a list's items, nothing for an empty node,
    /// otherwise the node itself as a single item
    pub fn items(&self) -> &[Value] {
        match self {
            Value::List(items) => items,
            Value::Null => &[],
            other => std::slice::from_ref(other),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// Name of the single root element of a parsed document
    pub fn root_name(&self) -> Option<&str> {
        match self {
            Value::Map(entries) if entries.len() == 1 => Some(entries[0].0.as_str()),
            _ => None,
        }
    }
}

/// Response envelopes understood by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvelopeKind {
    /// `asset/host/` list
    HostList,
    /// `asset/host/vm/detection/` list
    HostDetectionList,
    /// `ignore_vuln` with action=ignore
    IgnoreResult,
    /// `ignore_vuln` with action=restore
    RestoreResult,
}

impl EnvelopeKind {
    /// Path from the document root to the meaningful payload
    pub fn path(&self) -> &'static [&'static str] {
        match self {
            EnvelopeKind::HostList => &["HOST_LIST_OUTPUT", "RESPONSE", "HOST_LIST", "HOST"],
            EnvelopeKind::HostDetectionList => &[
                "HOST_LIST_VM_DETECTION_OUTPUT",
                "RESPONSE",
                "HOST_LIST",
                "HOST",
            ],
            EnvelopeKind::IgnoreResult | EnvelopeKind::RestoreResult => {
                &["IGNORE_VULN_OUTPUT", "RESPONSE"]
            }
        }
    }

    /// Expected root element
    pub fn root(&self) -> &'static str {
        self.path()[0]
    }
}

impl fmt::Display for EnvelopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.root())
    }
}

/// Root element of generic API error responses
const SIMPLE_RETURN: &str = "SIMPLE_RETURN";

/// Parse `xml` and return the payload node for `kind`.
///
/// Generic API error documents are reported as [`DecodeError::Upstream`];
/// a document with the right root but no payload is
/// [`DecodeError::MissingNode`].
pub fn decode(xml: &str, kind: EnvelopeKind) -> Result<Value, DecodeError> {
    let document = parse(xml)?;

    match document.root_name() {
        Some(root) if root == kind.root() => {}
        Some(SIMPLE_RETURN) => return Err(upstream_error(&document)),
        found => {
            return Err(DecodeError::UnexpectedRoot {
                expected: kind.root().to_string(),
                found: found.unwrap_or_default().to_string(),
            })
        }
    }

    document
        .into_at(kind.path())
        .ok_or_else(|| DecodeError::MissingNode(kind.path().join("/")))
}

fn upstream_error(document: &Value) -> DecodeError {
    let response = document.at(&[SIMPLE_RETURN, "RESPONSE"]);
    DecodeError::Upstream {
        code: response.map(|r| r.text("CODE")).unwrap_or_default().to_string(),
        message: response.map(|r| r.text("TEXT")).unwrap_or_default().to_string(),
    }
}

/// Parse a whole XML document into a [`Value`] map keyed by its root element
pub fn parse(xml: &str) -> Result<Value, DecodeError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                stack.push(Element::open(&e)?);
            }
            Ok(Event::Empty(e)) => {
                let element = Element::open(&e)?;
                close(element, &mut stack, &mut root)?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| DecodeError::Malformed(String::from("unbalanced end tag")))?;
                close(element, &mut stack, &mut root)?;
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| DecodeError::Malformed(err.to_string()))?;
                match stack.last_mut() {
                    Some(element) => element.text.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => {
                        return Err(DecodeError::Malformed(String::from(
                            "text outside the root element",
                        )))
                    }
                }
            }
            Ok(Event::CData(e)) => {
                let bytes = e.into_inner();
                if let Some(element) = stack.last_mut() {
                    element.text.push_str(&String::from_utf8_lossy(&bytes));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(DecodeError::Malformed(format!(
                    "at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(DecodeError::Malformed(format!(
            "document ended inside <{}>",
            open.name
        )));
    }

    root.map(|(name, value)| Value::Map(vec![(name, value)]))
        .ok_or_else(|| DecodeError::Malformed(String::from("no root element")))
}

fn close(
    element: Element,
    stack: &mut [Element],
    root: &mut Option<(String, Value)>,
) -> Result<(), DecodeError> {
    let (name, value) = element.finish();
    match stack.last_mut() {
        Some(parent) => parent.push_child(name, value),
        None if root.is_none() => *root = Some((name, value)),
        None => {
            return Err(DecodeError::Malformed(String::from(
                "multiple root elements",
            )))
        }
    }
    Ok(())
}

/// An element being built
struct Element {
    name: String,
    attributes: Vec<(String, Value)>,
    children: Vec<(String, Value)>,
    text: String,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> Result<Self, DecodeError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).to_string();

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| DecodeError::Malformed(e.to_string()))?;
            let key = format!("@{}", String::from_utf8_lossy(attr.key.as_ref()));
            let value = attr
                .unescape_value()
                .map_err(|e| DecodeError::Malformed(e.to_string()))?;
            attributes.push((key, Value::Text(value.to_string())));
        }

        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
            text: String::new(),
        })
    }

    fn push_child(&mut self, name: String, value: Value) {
        match self.children.iter_mut().find(|(k, _)| *k == name) {
            Some((_, Value::List(items))) => items.push(value),
            Some((_, existing)) => {
                let first = std::mem::replace(existing, Value::Null);
                *existing = Value::List(vec![first, value]);
            }
            None => self.children.push((name, value)),
        }
    }

    fn finish(self) -> (String, Value) {
        if self.attributes.is_empty() && self.children.is_empty() {
            let value = if self.text.is_empty() {
                Value::Null
            } else {
                Value::Text(self.text)
            };
            return (self.name, value);
        }

        let mut entries = self.attributes;
        entries.extend(self.children);
        if !self.text.is_empty() {
            entries.push((String::from("#text"), Value::Text(self.text)));
        }
        (self.name, Value::Map(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_elements() {
        let doc = parse("<A><B><C>hello</C></B></A>").unwrap();
        assert_eq!(doc.root_name(), Some("A"));
        assert_eq!(doc.at(&["A", "B", "C"]).and_then(Value::as_text), Some("hello"));
    }

    #[test]
    fn test_repeated_siblings_become_list() {
        let doc = parse("<L><I>1</I><I>2</I><I>3</I><X/></L>").unwrap();
        let items = doc.at(&["L", "I"]).unwrap();
        assert!(items.is_list());
        let texts: Vec<&str> = items.items().iter().filter_map(Value::as_text).collect();
        assert_eq!(texts, vec!["1", "2", "3"]);
        assert_eq!(doc.at(&["L", "X"]), Some(&Value::Null));
    }

    #[test]
    fn test_single_element_is_one_item() {
        let doc = parse("<L><I>only</I></L>").unwrap();
        let item = doc.at(&["L", "I"]).unwrap();
        assert!(!item.is_list());
        assert_eq!(item.items().len(), 1);
    }

    #[test]
    fn test_attributes_and_text() {
        let doc = parse(r#"<R status="SUCCESS" number="42">done &amp; dusted</R>"#).unwrap();
        let r = doc.get("R").unwrap();
        assert_eq!(r.text("@status"), "SUCCESS");
        assert_eq!(r.text("@number"), "42");
        assert_eq!(r.as_text(), Some("done & dusted"));
    }

    #[test]
    fn test_cdata_and_doctype() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" ?>
<!DOCTYPE A SYSTEM "https://example.com/a.dtd">
<A><RESULTS><![CDATA[Port 443 <TLSv1.0>]]></RESULTS></A>"#;
        let doc = parse(xml).unwrap();
        assert_eq!(doc.at(&["A", "RESULTS"]).and_then(Value::as_text), Some("Port 443 <TLSv1.0>"));
    }

    #[test]
    fn test_malformed_documents() {
        assert!(matches!(parse("<A><B></A>"), Err(DecodeError::Malformed(_))));
        assert!(matches!(parse("<A><B>"), Err(DecodeError::Malformed(_))));
        assert!(matches!(parse(""), Err(DecodeError::Malformed(_))));
        assert!(matches!(parse("not xml at all"), Err(DecodeError::Malformed(_))));
        assert!(matches!(parse("<A/><B/>"), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn test_decode_selects_envelope_path() {
        let xml = r#"<IGNORE_VULN_OUTPUT><RESPONSE status="SUCCESS" number="3"/></IGNORE_VULN_OUTPUT>"#;
        let payload = decode(xml, EnvelopeKind::IgnoreResult).unwrap();
        assert_eq!(payload.text("@number"), "3");
    }

    #[test]
    fn test_decode_wrong_root() {
        let err = decode("<OTHER/>", EnvelopeKind::HostList).unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnexpectedRoot {
                expected: String::from("HOST_LIST_OUTPUT"),
                found: String::from("OTHER"),
            }
        );
    }

    #[test]
    fn test_decode_missing_payload() {
        let xml = "<HOST_LIST_OUTPUT><RESPONSE><DATETIME>now</DATETIME></RESPONSE></HOST_LIST_OUTPUT>";
        assert!(matches!(
            decode(xml, EnvelopeKind::HostList),
            Err(DecodeError::MissingNode(_))
        ));
    }

    #[test]
    fn test_decode_simple_return_error() {
        let xml = r#"<SIMPLE_RETURN><RESPONSE><DATETIME>2026-10-16T10:00:00Z</DATETIME>
<CODE>1965</CODE><TEXT>This API cannot be run again for another 23 hours.</TEXT></RESPONSE></SIMPLE_RETURN>"#;
        let err = decode(xml, EnvelopeKind::HostDetectionList).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Upstream {
                code: String::from("1965"),
                message: String::from("This API cannot be run again for another 23 hours."),
            }
        );
    }
}
