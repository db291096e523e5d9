//! # XML Codec
//!
//! Encodes a document tree as the game's chart XML and reads it back.
//!
//! ## Encoding
//! The root is `<CMap>`; every map entry becomes an element named by its key
//! and every list item becomes a `<CMapNoteAsset>` element. Scalars are written
//! as text: integers as integers, floats in their shortest round-trip form.
//!
//! ## Decoding
//! XML leaves carry no type, so every leaf comes back verbatim as
//! [`Value::Text`]; the numeric views on [`Value`] parse it on demand. An
//! element whose children are all `<CMapNoteAsset>` becomes a list, any other
//! element with children a map. Text between child elements is dropped.

use crate::document::{Map, Value};
use crate::error::MergeError;
use quick_xml::events::Event;
use quick_xml::Reader;

pub const ROOT_TAG: &str = "CMap";
pub const LIST_ITEM_TAG: &str = "CMapNoteAsset";

/// Convert a document tree to XML text
pub fn to_xml(document: &Value) -> String {
    let mut xml = String::new();

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    write_element(&mut xml, ROOT_TAG, document, 0);

    xml
}

fn write_element(xml: &mut String, tag: &str, value: &Value, depth: usize) {
    let indent = "  ".repeat(depth);
    match value {
        Value::Map(map) if map.is_empty() => xml.push_str(&format!("{}<{}/>\n", indent, tag)),
        Value::List(items) if items.is_empty() => xml.push_str(&format!("{}<{}/>\n", indent, tag)),
        Value::Map(map) => {
            xml.push_str(&format!("{}<{}>\n", indent, tag));
            for (key, child) in map.iter() {
                write_element(xml, key, child, depth + 1);
            }
            xml.push_str(&format!("{}</{}>\n", indent, tag));
        }
        Value::List(items) => {
            xml.push_str(&format!("{}<{}>\n", indent, tag));
            for item in items {
                write_element(xml, LIST_ITEM_TAG, item, depth + 1);
            }
            xml.push_str(&format!("{}</{}>\n", indent, tag));
        }
        Value::Int(i) => xml.push_str(&format!("{}<{}>{}</{}>\n", indent, tag, i, tag)),
        Value::Float(f) => xml.push_str(&format!("{}<{}>{}</{}>\n", indent, tag, f, tag)),
        Value::Text(s) => {
            xml.push_str(&format!("{}<{}>{}</{}>\n", indent, tag, escape_xml(s), tag))
        }
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Element being read: its name, finished children and accumulated text
struct Frame {
    name: String,
    children: Vec<(String, Value)>,
    text: String,
}

impl Frame {
    fn new(name: String) -> Self {
        Self {
            name,
            children: Vec::new(),
            text: String::new(),
        }
    }

    fn finish(self) -> (String, Value) {
        let value = if self.children.is_empty() {
            Value::Text(self.text)
        } else if self.children.iter().all(|(name, _)| name == LIST_ITEM_TAG) {
            Value::List(self.children.into_iter().map(|(_, v)| v).collect())
        } else {
            let mut map = Map::new();
            for (name, child) in self.children {
                map.insert(name, child);
            }
            Value::Map(map)
        };
        (self.name, value)
    }
}

/// Parse chart XML into a document tree. The root element's own name is not
/// checked.
pub fn parse_xml(source: &str) -> Result<Value, MergeError> {
    let mut reader = Reader::from_str(source);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<Value> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| MergeError::Xml(format!("at byte {}: {}", reader.buffer_position(), e)))?;
        match event {
            Event::Start(e) => stack.push(Frame::new(tag_name(e.name().as_ref())?)),
            Event::Empty(e) => {
                let name = tag_name(e.name().as_ref())?;
                attach(&mut stack, &mut root, name, Value::Text(String::new()))?;
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(|e| MergeError::Xml(e.to_string()))?;
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&text);
                }
            }
            Event::CData(c) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::End(_) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| MergeError::Xml("unexpected closing tag".to_string()))?;
                let (name, value) = frame.finish();
                attach(&mut stack, &mut root, name, value)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(MergeError::Xml(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| MergeError::Xml("document has no root element".to_string()))
}

fn tag_name(raw: &[u8]) -> Result<String, MergeError> {
    std::str::from_utf8(raw)
        .map(str::to_string)
        .map_err(|e| MergeError::Xml(format!("tag name is not UTF-8: {}", e)))
}

fn attach(
    stack: &mut [Frame],
    root: &mut Option<Value>,
    name: String,
    value: Value,
) -> Result<(), MergeError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push((name, value)),
        None if root.is_none() => *root = Some(value),
        None => return Err(MergeError::Xml(format!("second root element <{}>", name))),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_xml_output() {
        let doc = Value::Map(
            Map::new()
                .with("m_Name", "Song")
                .with("m_barPerMin", 120.5)
                .with("m_leftRegion", 2i64),
        );
        let xml = to_xml(&doc);
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains("<CMap>"));
        assert!(xml.contains("<m_Name>Song</m_Name>"));
        assert!(xml.contains("<m_barPerMin>120.5</m_barPerMin>"));
        assert!(xml.contains("<m_leftRegion>2</m_leftRegion>"));
        assert!(xml.trim_end().ends_with("</CMap>"));
    }

    #[test]
    fn test_keys_written_in_order() {
        let doc = Value::Map(Map::new().with("zeta", 1i64).with("alpha", 2i64));
        let xml = to_xml(&doc);
        assert!(xml.find("<zeta>").unwrap() < xml.find("<alpha>").unwrap());
    }

    #[test]
    fn test_list_items_use_note_asset_tag() {
        let doc = Value::Map(Map::new().with(
            "m_notes",
            Map::new().with("m_notes", vec![Value::Map(Map::new().with("m_id", 0i64))]),
        ));
        let xml = to_xml(&doc);
        assert!(xml.contains("<CMapNoteAsset>"));
        assert!(xml.contains("<m_id>0</m_id>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let doc = Value::Map(Map::new().with("m_Name", "Rock & <Roll>"));
        let xml = to_xml(&doc);
        assert!(xml.contains("<m_Name>Rock &amp; &lt;Roll&gt;</m_Name>"));

        let parsed = parse_xml(&xml).unwrap();
        assert_eq!(
            parsed.as_map().unwrap().get("m_Name"),
            Some(&Value::Text("Rock & <Roll>".to_string()))
        );
    }

    #[test]
    fn test_leaf_text_kept_verbatim() {
        let doc = Value::Map(Map::new().with("m_Name", "  Song  ").with("m_mapID", "\tid\n"));
        let parsed = parse_xml(&to_xml(&doc)).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn test_floats_round_trip() {
        let value = 1.0 / 3.0;
        let doc = Value::Map(Map::new().with("m_time", value));
        let parsed = parse_xml(&to_xml(&doc)).unwrap();
        let time = parsed.as_map().unwrap().get("m_time").unwrap().as_f64().unwrap();
        assert_eq!(time.to_bits(), value.to_bits());
    }

    #[test]
    fn test_parse_lists_and_empty_lists() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<CMap>
  <m_barPerMin>150</m_barPerMin>
  <m_notes>
    <m_notes>
      <CMapNoteAsset><m_id>0</m_id></CMapNoteAsset>
      <CMapNoteAsset><m_id>1</m_id></CMapNoteAsset>
    </m_notes>
  </m_notes>
  <m_notesLeft>
    <m_notes/>
  </m_notesLeft>
</CMap>"#;
        let doc = parse_xml(xml).unwrap();
        let root = doc.as_map().unwrap();
        assert_eq!(root.get("m_barPerMin").and_then(Value::as_f64), Some(150.0));

        let front = root
            .get("m_notes")
            .and_then(Value::as_map)
            .and_then(|m| m.get("m_notes"))
            .unwrap();
        assert_eq!(front.as_list().map(|l| l.len()), Some(2));

        let left = root
            .get("m_notesLeft")
            .and_then(Value::as_map)
            .and_then(|m| m.get("m_notes"))
            .unwrap();
        assert_eq!(left, &Value::Text(String::new()));
    }

    #[test]
    fn test_parse_rejects_broken_xml() {
        assert!(matches!(parse_xml("<CMap><m_Name>x</CMap>"), Err(MergeError::Xml(_))));
        assert!(matches!(parse_xml("<CMap>"), Err(MergeError::Xml(_))));
        assert!(matches!(parse_xml(""), Err(MergeError::Xml(_))));
    }
}
