// XML helpers for the SOAP availability response: fragment extraction,
// entity decoding and a small element tree with path selection

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, Event};
use quick_xml::reader::Reader;
use tracing::debug;

use crate::error::RemoteCallError;

pub const AVAILABLE_ROOMS_TAG: &str = "tns:availableRooms";

/// Raw content of the first `<tns:availableRooms>` element, still escaped.
///
/// Returns `None` when the element is absent or the response cannot be read
/// up to its closing tag.
pub fn extract_available_rooms(response: &str) -> Option<String> {
    let mut reader = Reader::from_str(response);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == AVAILABLE_ROOMS_TAG.as_bytes() => {
                return match reader.read_text(e.name()) {
                    Ok(txt) => Some(txt.into_owned()),
                    Err(err) => {
                        debug!(error = %err, "Unterminated availableRooms element");
                        None
                    }
                };
            }
            Ok(Event::Eof) => return None,
            Err(err) => {
                debug!(
                    position = reader.error_position(),
                    error = %err,
                    "Unreadable SOAP response"
                );
                return None;
            }
            _ => (),
        }
    }
}

// Single pass per entity, in this order. `&amp;lt;` becomes `&lt;`, not `<`.
pub fn decode_html_entities(input: &str) -> String {
    input
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    pub name: String,
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    fn named(name: &[u8]) -> Self {
        Self {
            name: String::from_utf8_lossy(name).into_owned(),
            ..Default::default()
        }
    }

    /// Parse `xml` into a document node whose children are the top-level
    /// elements. Names keep their prefixes, attributes are dropped, entity
    /// references are resolved and each element's text is trimmed once it
    /// is closed.
    pub fn parse_document(xml: &str) -> Result<XmlElement, RemoteCallError> {
        let mut reader = Reader::from_str(xml);

        let mut stack = vec![XmlElement::default()];

        loop {
            match reader.read_event()? {
                Event::Start(e) => stack.push(XmlElement::named(e.name().as_ref())),
                Event::Empty(e) => {
                    let element = XmlElement::named(e.name().as_ref());
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(element);
                    }
                }
                Event::End(e) => {
                    if stack.len() < 2 {
                        return Err(RemoteCallError::XmlParseError(format!(
                            "unexpected closing tag {}",
                            String::from_utf8_lossy(e.name().as_ref())
                        )));
                    }
                    if let (Some(mut element), Some(parent)) = (stack.pop(), stack.last_mut()) {
                        element.text = element.text.trim().to_string();
                        parent.children.push(element);
                    }
                }
                Event::Text(t) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(&t));
                    }
                }
                Event::CData(t) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(&t));
                    }
                }
                Event::GeneralRef(r) => {
                    let resolved = resolve_reference(&r)?;
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&resolved);
                    }
                }
                Event::Eof => break,
                _ => (),
            }
        }

        match stack.pop() {
            Some(document) if stack.is_empty() && !document.children.is_empty() => Ok(document),
            Some(_) if !stack.is_empty() => Err(RemoteCallError::XmlParseError(
                "unclosed element at end of document".to_string(),
            )),
            _ => Err(RemoteCallError::XmlParseError(
                "document has no root element".to_string(),
            )),
        }
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.trim())
    }

    /// Every element reached by following `path` from this node, one child
    /// name per step. An empty result means some step had no match.
    pub fn select(&self, path: &[&str]) -> Vec<&XmlElement> {
        path.iter().fold(vec![self], |nodes, step| {
            nodes
                .into_iter()
                .flat_map(|node| node.children.iter().filter(move |c| c.name == *step))
                .collect()
        })
    }
}

// `&amp;`-style predefined entities and `&#38;` / `&#x26;` character references
fn resolve_reference(r: &BytesRef<'_>) -> Result<String, RemoteCallError> {
    if let Some(ch) = r
        .resolve_char_ref()
        .map_err(|e| RemoteCallError::XmlParseError(e.to_string()))?
    {
        return Ok(ch.to_string());
    }

    let name = String::from_utf8_lossy(r);
    resolve_predefined_entity(&name)
        .map(str::to_string)
        .ok_or_else(|| RemoteCallError::XmlParseError(format!("unknown entity &{};", name)))
}
