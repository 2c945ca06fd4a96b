//! Conversion between XML documents and generic JSON values.
//!
//! Encoding rules:
//! - the document root is always `<response>`;
//! - object keys become child elements;
//! - sequences become repeated `<item>` children of their element;
//! - `null` and empty containers become empty elements;
//! - scalars become text content.
//!
//! Decoding mirrors them: the root name and attributes are ignored, an element
//! whose children are all `<item>` is a sequence, other repeated sibling tags
//! are collected into a sequence under that tag, empty leaves are `null` and
//! every other leaf is a string.

use std::collections::HashSet;

use quick_xml::{
    Reader, Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use serde_json::{Map, Value};

pub const ROOT_TAG: &str = "response";
pub const ITEM_TAG: &str = "item";

/// Deepest element nesting accepted on input. Also bounds the depth of the
/// decoded value, whose drop is recursive.
pub const MAX_DEPTH: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    #[error("malformed xml: {0}")]
    Syntax(String),
    #[error("document ended inside <{0}>")]
    UnexpectedEof(String),
    #[error("document has no root element")]
    MissingRoot,
    #[error("content outside of the root element")]
    OutsideRoot,
    #[error("elements nested deeper than {} levels", MAX_DEPTH)]
    TooDeep,
}

fn syntax(err: impl std::fmt::Display) -> XmlError {
    XmlError::Syntax(err.to_string())
}

struct Frame {
    name: String,
    children: Vec<(String, Value)>,
    text: String,
}

impl Frame {
    fn open(tag: &BytesStart<'_>) -> Result<Self, XmlError> {
        let name = std::str::from_utf8(tag.name().as_ref()).map_err(syntax)?.to_string();
        Ok(Self { name, children: Vec::new(), text: String::new() })
    }

    fn close(self) -> (String, Value) {
        let Frame { name, children, text } = self;

        if children.is_empty() {
            let value =
                if text.trim().is_empty() { Value::Null } else { Value::String(text) };
            return (name, value);
        }

        if children.iter().all(|(tag, _)| tag == ITEM_TAG) {
            return (name, Value::Array(children.into_iter().map(|(_, v)| v).collect()));
        }

        let mut map = Map::new();
        let mut repeated = HashSet::new();
        for (tag, value) in children {
            match map.get_mut(&tag) {
                None => {
                    map.insert(tag, value);
                },
                Some(Value::Array(items)) if repeated.contains(&tag) => items.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                    repeated.insert(tag);
                },
            }
        }
        (name, Value::Object(map))
    }
}

fn finish(frame: Frame, stack: &mut [Frame], root: &mut Option<Value>) {
    let (name, value) = frame.close();
    match stack.last_mut() {
        Some(parent) => parent.children.push((name, value)),
        None => *root = Some(value),
    }
}

fn push_text(stack: &mut [Frame], text: &str) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(frame) => {
            frame.text.push_str(text);
            Ok(())
        },
        None if text.trim().is_empty() => Ok(()),
        None => Err(XmlError::OutsideRoot),
    }
}

pub fn to_value(input: &str) -> Result<Value, XmlError> {
    let mut reader = Reader::from_str(input);
    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<Value> = None;

    loop {
        match reader.read_event().map_err(syntax)? {
            Event::Start(tag) => {
                if root.is_some() {
                    return Err(XmlError::OutsideRoot);
                }
                if stack.len() >= MAX_DEPTH {
                    return Err(XmlError::TooDeep);
                }
                stack.push(Frame::open(&tag)?);
            },
            Event::Empty(tag) => {
                if root.is_some() {
                    return Err(XmlError::OutsideRoot);
                }
                let frame = Frame::open(&tag)?;
                finish(frame, &mut stack, &mut root);
            },
            Event::End(_) => {
                let frame = stack.pop().ok_or_else(|| syntax("unexpected closing tag"))?;
                finish(frame, &mut stack, &mut root);
            },
            Event::Text(text) => {
                let text = text.unescape().map_err(syntax)?;
                push_text(&mut stack, &text)?;
            },
            Event::CData(data) => {
                let text = std::str::from_utf8(&data).map_err(syntax)?;
                push_text(&mut stack, text)?;
            },
            Event::Eof => break,
            // declarations, comments, processing instructions, doctype
            _ => {},
        }
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::UnexpectedEof(open.name));
    }
    root.ok_or(XmlError::MissingRoot)
}

pub fn from_value(value: &Value) -> anyhow::Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_element(&mut writer, ROOT_TAG, value)?;
    Ok(writer.into_inner())
}

fn write_element(writer: &mut Writer<Vec<u8>>, name: &str, value: &Value) -> anyhow::Result<()> {
    let is_empty = match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    };
    if is_empty {
        writer.write_event(Event::Empty(BytesStart::new(name)))?;
        return Ok(());
    }

    writer.write_event(Event::Start(BytesStart::new(name)))?;
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                write_element(writer, key, child)?;
            }
        },
        Value::Array(items) => {
            for item in items {
                write_element(writer, ITEM_TAG, item)?;
            }
        },
        Value::String(s) => writer.write_event(Event::Text(BytesText::new(s)))?,
        scalar => writer.write_event(Event::Text(BytesText::new(&scalar.to_string())))?,
    }
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
