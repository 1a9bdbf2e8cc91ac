//! Runtime for generated bindings: a generic element tree, scalar conversions and the traits
//! generated types implement.

pub mod meta;

use std::fmt;

use quick_xml::{
    events::{BytesEnd, BytesStart, BytesText, Event},
    Writer,
};
use thiserror::Error;

pub use serde_json::{self, Map, Value};

#[derive(Debug, Error)]
pub enum Error {
    #[error("<{tag}> is missing the required attribute {attribute:?}")]
    MissingAttribute { tag: String, attribute: String },
    #[error("<{tag}> has no <{child}> child")]
    MissingChild { tag: String, child: String },
    #[error("invalid integer literal {0:?}")]
    InvalidInteger(String),
    #[error("invalid boolean literal {0:?}")]
    InvalidBoolean(String),
    #[error("failed to parse XML")]
    Parse(#[from] roxmltree::Error),
    #[error("failed to write XML: {0}")]
    Write(String),
}

fn write_error(error: impl fmt::Display) -> Error {
    Error::Write(error.to_string())
}

/// A namespace-free element: local tag, attributes in document order, trimmed text and child
/// elements.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Node {
    tag: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Node>,
}

impl Node {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// An element holding only text. Surrounding whitespace is dropped, and blank text is none.
    pub fn with_text(tag: impl Into<String>, text: impl AsRef<str>) -> Self {
        let text = text.as_ref().trim();
        Self {
            tag: tag.into(),
            text: (!text.is_empty()).then(|| text.to_owned()),
            ..Self::default()
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn required_attribute(&self, name: &str) -> Result<&str, Error> {
        self.attribute(name).ok_or_else(|| Error::MissingAttribute {
            tag: self.tag.clone(),
            attribute: name.into(),
        })
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Sets `name`, keeping the position of an existing attribute of that name.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// The first child element tagged `tag`.
    pub fn child(&self, tag: &str) -> Option<&Node> {
        self.children.iter().find(|child| child.tag == tag)
    }

    pub fn required_child(&self, tag: &str) -> Result<&Node, Error> {
        self.child(tag).ok_or_else(|| Error::MissingChild {
            tag: self.tag.clone(),
            child: tag.into(),
        })
    }

    pub fn children_tagged<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children.iter().filter(move |child| child.tag == tag)
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn push_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// The trimmed text content, empty if there is none.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    pub fn from_xml(source: &str) -> Result<Self, Error> {
        let document = roxmltree::Document::parse(source)?;
        Ok(Self::from_roxmltree(document.root_element()))
    }

    /// Copies an element, dropping namespaces, comments and processing instructions.
    pub fn from_roxmltree(node: roxmltree::Node) -> Self {
        let text: String = node
            .children()
            .filter(roxmltree::Node::is_text)
            .filter_map(|child| child.text())
            .collect();
        let mut converted = Self::with_text(node.tag_name().name(), text);
        converted.attributes = node
            .attributes()
            .map(|attribute| (attribute.name().to_owned(), attribute.value().to_owned()))
            .collect();
        converted.children = node
            .children()
            .filter(roxmltree::Node::is_element)
            .map(Self::from_roxmltree)
            .collect();
        converted
    }

    /// Writes the tree as an XML document. `namespace` becomes the default namespace of the root
    /// element.
    pub fn to_xml(&self, namespace: Option<&str>) -> Result<String, Error> {
        let mut writer = Writer::new(Vec::new());
        self.write(&mut writer, namespace)?;
        String::from_utf8(writer.into_inner()).map_err(write_error)
    }

    fn write(&self, writer: &mut Writer<Vec<u8>>, namespace: Option<&str>) -> Result<(), Error> {
        let mut start = BytesStart::new(self.tag.as_str());
        if let Some(namespace) = namespace {
            start.push_attribute(("xmlns", namespace));
        }
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.text.is_none() && self.children.is_empty() {
            return writer.write_event(Event::Empty(start)).map_err(write_error);
        }

        writer.write_event(Event::Start(start)).map_err(write_error)?;
        if let Some(text) = &self.text {
            writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(write_error)?;
        }
        for child in &self.children {
            child.write(writer, None)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.tag.as_str())))
            .map_err(write_error)
    }
}

/// Inserts `value` under `key` unless it is an empty object or an empty array.
pub fn insert_non_empty(map: &mut Map<String, Value>, key: &str, value: Value) {
    let empty = match &value {
        Value::Object(object) => object.is_empty(),
        Value::Array(array) => array.is_empty(),
        _ => false,
    };
    if !empty {
        map.insert(key.to_owned(), value);
    }
}

pub fn parse_integer(text: &str) -> Result<i64, Error> {
    let text = text.trim();
    text.parse()
        .map_err(|_| Error::InvalidInteger(text.to_owned()))
}

/// Accepts `true`/`false` and `1`/`0`.
pub fn parse_boolean(text: &str) -> Result<bool, Error> {
    match text.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(Error::InvalidBoolean(other.to_owned())),
    }
}

pub fn format_boolean(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
