//! Free text elements such as `<abstract>`, `<funding>` or
//! `<description>`, held as a list of paragraphs.

use super::change::NodeKind;
use super::extract;
use super::names::{NameEntry, NodeNameMap, EML_VOCABULARY};
use super::node::{Node, ParseContext, Schema, Slot};
use crate::dom::Element;

/// Element names of the text types that appear inside other nodes.
pub const NAMES: &[NameEntry] = &[
    ("additionalinfo", "additionalInfo"),
    ("designdescription", "designDescription"),
    ("intellectualrights", "intellectualRights"),
    ("literallayout", "literalLayout"),
    ("samplingdescription", "samplingDescription"),
    ("studyareadescription", "studyAreaDescription"),
];

static TEXT_NAMES: NodeNameMap = NodeNameMap::new(&[NAMES, EML_VOCABULARY]);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextType {
    pub text: Vec<String>,
}

pub type EmlText = Node<TextType>;

impl TextType {
    pub fn new<I>(paragraphs: I) -> TextType
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        TextType {
            text: paragraphs.into_iter().map(Into::into).collect(),
        }
    }
}

fn split_lines(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
}

impl Schema for TextType {
    const KIND: NodeKind = NodeKind::Text;
    const ROOT: &'static str = "text";
    const EXCLUSIVE: bool = true;
    const PRESERVE_UNCHANGED: bool = true;

    fn names() -> &'static NodeNameMap {
        &TEXT_NAMES
    }

    fn node_order() -> &'static [&'static str] {
        &["para"]
    }

    fn parse(element: Element<'_>, _cx: &ParseContext<'_>) -> TextType {
        let text = extract::paragraphs(Some(element))
            .iter()
            .flat_map(|p| split_lines(p))
            .collect();
        TextType { text }
    }

    fn inject<'d>(&self, slot: &Slot<'_, 'd>) -> Option<Vec<Element<'d>>> {
        match slot.name() {
            "para" => Some(slot.leaves(&self.text)),
            _ => None,
        }
    }

    fn is_empty(&self) -> bool {
        self.text.iter().all(|p| p.trim().is_empty())
    }
}

impl Node<TextType> {
    /// A fresh text element with the given tag.
    pub fn text<I>(tag: &str, paragraphs: I) -> EmlText
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Node::new(TextType::new(paragraphs)).with_tag(tag)
    }

    pub fn paragraphs(&self) -> &[String] {
        &self.attributes().text
    }

    /// Replaces the paragraphs with the lines of `text`, as typed into
    /// a text box.
    pub fn set_text(&mut self, text: &str) {
        let paragraphs = split_lines(text).collect();
        self.update(|t| t.text = paragraphs);
    }

    /// The paragraphs separated by blank lines.
    pub fn to_plain_text(&self) -> String {
        self.paragraphs().join("\n\n")
    }
}
