//! Converts XML strings into a DOM structure
//!
//! ### Example
//!
//! ```
//! use eml_document::parser;
//! let xml = "<?xml version='1.0'?><keywordSet><keyword>soil</keyword></keywordSet>";
//! let package = parser::parse(xml).expect("Failed to parse");
//! let root = package.as_document().root_element().unwrap();
//! assert_eq!("keywordSet", root.name());
//! ```
//!
//! EML fragments handed over by the editor went through an HTML DOM
//! first, so their element names arrive lower-cased and may contain
//! stray `&`s. [`ParserConfig::html_compatible`] accepts that input.
//!
//! ### Known issues
//!
//! Processing instructions and the document type declaration are
//! skipped. CDATA sections become ordinary text.

use std::borrow::Cow;

use peresil::{Progress, Status, StringPoint};
use thiserror::Error;
use tracing::trace;

use crate::dom;
use crate::str::XmlStr;
use crate::Package;

/// How element and attribute names are stored.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum NameCase {
    /// Names are kept as written.
    #[default]
    Preserve,
    /// Names are folded to ASCII lower case, as an HTML DOM would.
    Lowercase,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ParserConfig {
    pub name_case: NameCase,
    /// Keep unknown entity references and bare ampersands as literal
    /// text instead of failing.
    pub lenient_references: bool,
}

impl ParserConfig {
    /// Strict XML with case-preserving names.
    pub fn new() -> ParserConfig {
        ParserConfig::default()
    }

    /// The input mode for fragments that passed through an HTML DOM.
    pub fn html_compatible() -> ParserConfig {
        ParserConfig {
            name_case: NameCase::Lowercase,
            lenient_references: true,
        }
    }

    pub fn name_case(mut self, name_case: NameCase) -> ParserConfig {
        self.name_case = name_case;
        self
    }

    pub fn lenient_references(mut self, lenient: bool) -> ParserConfig {
        self.lenient_references = lenient;
        self
    }

    fn name<'a>(&self, name: &'a str) -> Cow<'a, str> {
        match self.name_case {
            NameCase::Preserve => Cow::Borrowed(name),
            NameCase::Lowercase if name.bytes().any(|b| b.is_ascii_uppercase()) => {
                Cow::Owned(name.to_ascii_lowercase())
            }
            NameCase::Lowercase => Cow::Borrowed(name),
        }
    }

    fn names_match(&self, start: &str, end: &str) -> bool {
        match self.name_case {
            NameCase::Preserve => start == end,
            NameCase::Lowercase => start.eq_ignore_ascii_case(end),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum SpecificError {
    #[error("expected an element")]
    ExpectedElement,
    #[error("expected `>` to close the start tag")]
    ExpectedElementEnd,
    #[error("expected a closing tag")]
    ExpectedClosingTag,
    #[error("the closing tag does not match the open element")]
    MismatchedElementEndName,
    #[error("expected an element name")]
    ExpectedElementName,
    #[error("expected an attribute name")]
    ExpectedAttributeName,
    #[error("expected `=` after the attribute name")]
    ExpectedAttributeEquals,
    #[error("expected a quoted attribute value")]
    ExpectedAttributeValue,
    #[error("the attribute value is not terminated")]
    UnterminatedAttributeValue,
    #[error("the attribute is specified twice")]
    DuplicateAttribute,
    #[error("the comment is not terminated")]
    UnterminatedComment,
    #[error("the CDATA section is not terminated")]
    UnterminatedCData,
    #[error("the processing instruction is not terminated")]
    UnterminatedProcessingInstruction,
    #[error("the document type declaration is not terminated")]
    UnterminatedDoctype,
    #[error("`]]>` is not allowed in character data")]
    InvalidCharData,
    #[error("the character reference is malformed")]
    InvalidCharacterReference,
    #[error("unknown entity reference")]
    UnknownNamedReference,
    #[error("expected the end of the document")]
    ExpectedEndOfDocument,
}

/// A parse failure and the byte offset where it happened.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
#[error("{kind} at byte {location}")]
pub struct Error {
    location: usize,
    kind: SpecificError,
}

impl Error {
    pub fn new(location: usize, kind: SpecificError) -> Error {
        Error { location, kind }
    }

    pub fn location(&self) -> usize {
        self.location
    }

    pub fn kind(&self) -> SpecificError {
        self.kind
    }
}

type XmlProgress<'a, T> = Progress<StringPoint<'a>, T, SpecificError>;

fn success<'a, T>(data: T, point: StringPoint<'a>) -> XmlProgress<'a, T> {
    Progress {
        point,
        status: Status::Success(data),
    }
}

fn failure<'a, T>(error: SpecificError, point: StringPoint<'a>) -> XmlProgress<'a, T> {
    Progress {
        point,
        status: Status::Failure(error),
    }
}

macro_rules! try_parse(
    ($e:expr) => ({
        let progress = $e;
        match progress.status {
            Status::Success(data) => (progress.point, data),
            Status::Failure(e) => return failure(e, progress.point),
        }
    })
);

trait PrivateXmlParseExt<'a> {
    fn consume_xml(&self, end: Option<usize>, error: SpecificError) -> XmlProgress<'a, &'a str>;
    fn expect_literal(&self, literal: &'static str, error: SpecificError) -> XmlProgress<'a, &'a str>;
    fn consume_name(&self, error: SpecificError) -> XmlProgress<'a, &'a str>;
    fn skip_space(&self) -> StringPoint<'a>;
}

impl<'a> PrivateXmlParseExt<'a> for StringPoint<'a> {
    fn consume_xml(&self, end: Option<usize>, error: SpecificError) -> XmlProgress<'a, &'a str> {
        let progress = self.consume_to(end);
        match progress.status {
            Status::Success(s) => success(s, progress.point),
            Status::Failure(_) => failure(error, *self),
        }
    }

    fn expect_literal(&self, literal: &'static str, error: SpecificError) -> XmlProgress<'a, &'a str> {
        let end = if self.s.starts_with(literal) { Some(literal.len()) } else { None };
        self.consume_xml(end, error)
    }

    fn consume_name(&self, error: SpecificError) -> XmlProgress<'a, &'a str> {
        self.consume_xml(self.s.end_of_name(), error)
    }

    fn skip_space(&self) -> StringPoint<'a> {
        let progress = self.consume_to(self.s.end_of_space());
        match progress.status {
            Status::Success(_) => progress.point,
            Status::Failure(_) => *self,
        }
    }
}

/// Receives parse events and builds the DOM from them.
struct DomBuilder<'d> {
    config: ParserConfig,
    doc: dom::Document<'d>,
    open: Vec<dom::Element<'d>>,
}

impl<'d> DomBuilder<'d> {
    fn element_start(&mut self, name: &str) {
        let element = self.doc.create_element(&self.config.name(name));
        match self.open.last() {
            Some(parent) => parent.append_child(element),
            None => self.doc.root().append_child(element),
        }
        self.open.push(element);
    }

    fn attribute(&mut self, name: &str, value: &str) -> Result<(), SpecificError> {
        let name = self.config.name(name);
        let element = self.open.last().ok_or(SpecificError::ExpectedElement)?;
        if element.attribute(&name).is_some() {
            return Err(SpecificError::DuplicateAttribute);
        }
        element.set_attribute_value(&name, value);
        Ok(())
    }

    fn open_name_matches(&self, end_name: &str) -> bool {
        match self.open.last() {
            Some(e) => self.config.names_match(e.name(), &self.config.name(end_name)),
            None => false,
        }
    }

    fn element_end(&mut self) {
        self.open.pop();
    }

    /// Adjacent text is merged into a single node.
    fn text(&mut self, text: &str) {
        let element = match self.open.last() {
            Some(e) => *e,
            None => return,
        };

        match element.children().last().and_then(|c| c.text()) {
            Some(previous) => {
                let mut merged = String::from(previous.text());
                merged.push_str(text);
                previous.set_text(&merged);
            }
            None => element.append_child(self.doc.create_text(text)),
        }
    }

    fn comment(&mut self, text: &str) {
        let comment = self.doc.create_comment(text);
        match self.open.last() {
            Some(e) => e.append_child(comment),
            None => self.doc.root().append_child(comment),
        }
    }
}

fn parse_document<'a>(xml: StringPoint<'a>, sink: &mut DomBuilder<'_>) -> XmlProgress<'a, ()> {
    let xml = match xml.s.strip_prefix('\u{FEFF}') {
        Some(_) => try_parse!(xml.expect_literal("\u{FEFF}", SpecificError::ExpectedElement)).0,
        None => xml,
    };

    let (xml, _) = try_parse!(parse_miscellaneous(xml, sink));
    let (xml, _) = try_parse!(parse_element(xml, sink));
    let (xml, _) = try_parse!(parse_miscellaneous(xml, sink));

    if !xml.s.is_empty() {
        return failure(SpecificError::ExpectedEndOfDocument, xml);
    }

    success((), xml)
}

/// Comments, processing instructions, doctypes and whitespace outside
/// of the root element.
fn parse_miscellaneous<'a>(xml: StringPoint<'a>, sink: &mut DomBuilder<'_>) -> XmlProgress<'a, ()> {
    let mut xml = xml.skip_space();

    loop {
        if xml.s.starts_with("<!--") {
            xml = try_parse!(parse_comment(xml, sink)).0;
        } else if xml.s.starts_with("<?") {
            xml = try_parse!(parse_processing_instruction(xml)).0;
        } else if xml.s.starts_with("<!DOCTYPE") || xml.s.starts_with("<!doctype") {
            xml = try_parse!(parse_doctype(xml)).0;
        } else {
            return success((), xml);
        }
        xml = xml.skip_space();
    }
}

fn parse_comment<'a>(xml: StringPoint<'a>, sink: &mut DomBuilder<'_>) -> XmlProgress<'a, ()> {
    let (xml, _) = try_parse!(xml.expect_literal("<!--", SpecificError::UnterminatedComment));
    let (xml, text) = try_parse!(xml.consume_xml(xml.s.end_of_comment(), SpecificError::UnterminatedComment));
    let (xml, _) = try_parse!(xml.expect_literal("-->", SpecificError::UnterminatedComment));

    sink.comment(text);
    success((), xml)
}

fn parse_processing_instruction<'a>(xml: StringPoint<'a>) -> XmlProgress<'a, ()> {
    let (xml, _) = try_parse!(xml.expect_literal("<?", SpecificError::UnterminatedProcessingInstruction));
    let (xml, _) = try_parse!(xml.consume_xml(
        xml.s.end_of_pi_value(),
        SpecificError::UnterminatedProcessingInstruction
    ));
    let (xml, _) = try_parse!(xml.expect_literal("?>", SpecificError::UnterminatedProcessingInstruction));

    success((), xml)
}

fn parse_doctype<'a>(xml: StringPoint<'a>) -> XmlProgress<'a, ()> {
    // Internal subsets nest one level of brackets.
    let mut depth = 0usize;
    let end = xml.s.char_indices().find_map(|(i, c)| match c {
        '[' => {
            depth += 1;
            None
        }
        ']' => {
            depth = depth.saturating_sub(1);
            None
        }
        '>' if depth == 0 => Some(i + 1),
        _ => None,
    });

    let (xml, _) = try_parse!(xml.consume_xml(end, SpecificError::UnterminatedDoctype));
    success((), xml)
}

fn parse_element<'a>(xml: StringPoint<'a>, sink: &mut DomBuilder<'_>) -> XmlProgress<'a, ()> {
    let (xml, _) = try_parse!(xml.expect_literal("<", SpecificError::ExpectedElement));
    let (xml, name) = try_parse!(xml.consume_name(SpecificError::ExpectedElementName));

    sink.element_start(name);

    let (xml, _) = try_parse!(parse_attributes(xml, sink));

    if xml.s.starts_with("/>") {
        let (xml, _) = try_parse!(xml.expect_literal("/>", SpecificError::ExpectedElementEnd));
        sink.element_end();
        return success((), xml);
    }

    let (xml, _) = try_parse!(xml.expect_literal(">", SpecificError::ExpectedElementEnd));
    let (xml, _) = try_parse!(parse_content(xml, sink));

    let (xml, _) = try_parse!(xml.expect_literal("</", SpecificError::ExpectedClosingTag));
    let end_name_start = xml;
    let (xml, end_name) = try_parse!(xml.consume_name(SpecificError::ExpectedElementName));
    if !sink.open_name_matches(end_name) {
        return failure(SpecificError::MismatchedElementEndName, end_name_start);
    }
    let xml = xml.skip_space();
    let (xml, _) = try_parse!(xml.expect_literal(">", SpecificError::ExpectedElementEnd));

    sink.element_end();
    success((), xml)
}

fn parse_attributes<'a>(xml: StringPoint<'a>, sink: &mut DomBuilder<'_>) -> XmlProgress<'a, ()> {
    let mut xml = xml.skip_space();

    while !(xml.s.is_empty() || xml.s.starts_with('>') || xml.s.starts_with("/>")) {
        let attribute_start = xml;
        let (after_name, name) = try_parse!(xml.consume_name(SpecificError::ExpectedAttributeName));
        let after_name = after_name.skip_space();
        let (after_equals, _) = try_parse!(after_name.expect_literal("=", SpecificError::ExpectedAttributeEquals));
        let (after_value, value) = try_parse!(parse_attribute_value(after_equals.skip_space(), sink));

        if let Err(e) = sink.attribute(name, &value) {
            return failure(e, attribute_start);
        }

        xml = after_value.skip_space();
    }

    success((), xml)
}

fn parse_attribute_value<'a>(xml: StringPoint<'a>, sink: &DomBuilder<'_>) -> XmlProgress<'a, String> {
    let quote = match xml.s.chars().next() {
        Some(q @ '"') | Some(q @ '\'') => q,
        _ => return failure(SpecificError::ExpectedAttributeValue, xml),
    };
    let quote_literal = if quote == '"' { "\"" } else { "'" };

    let (mut xml, _) = try_parse!(xml.expect_literal(quote_literal, SpecificError::ExpectedAttributeValue));
    let mut value = String::new();

    loop {
        if xml.s.starts_with(quote) {
            break;
        } else if xml.s.starts_with('&') {
            let (next, text) = try_parse!(parse_reference(xml, sink.config));
            value.push_str(&text);
            xml = next;
        } else {
            let (next, text) = try_parse!(xml.consume_xml(
                xml.s.end_of_attribute(quote),
                SpecificError::UnterminatedAttributeValue
            ));
            value.push_str(text);
            xml = next;
        }
    }

    let (xml, _) = try_parse!(xml.expect_literal(quote_literal, SpecificError::UnterminatedAttributeValue));
    success(value, xml)
}

fn parse_content<'a>(xml: StringPoint<'a>, sink: &mut DomBuilder<'_>) -> XmlProgress<'a, ()> {
    let mut xml = xml;

    loop {
        if xml.s.is_empty() || xml.s.starts_with("</") {
            return success((), xml);
        } else if xml.s.starts_with("<!--") {
            xml = try_parse!(parse_comment(xml, sink)).0;
        } else if xml.s.starts_with("<![CDATA[") {
            let (next, _) = try_parse!(xml.expect_literal("<![CDATA[", SpecificError::UnterminatedCData));
            let (next, text) = try_parse!(next.consume_xml(next.s.end_of_cdata(), SpecificError::UnterminatedCData));
            let (next, _) = try_parse!(next.expect_literal("]]>", SpecificError::UnterminatedCData));
            sink.text(text);
            xml = next;
        } else if xml.s.starts_with("<?") {
            xml = try_parse!(parse_processing_instruction(xml)).0;
        } else if xml.s.starts_with('<') {
            xml = try_parse!(parse_element(xml, sink)).0;
        } else if xml.s.starts_with('&') {
            let (next, text) = try_parse!(parse_reference(xml, sink.config));
            sink.text(&text);
            xml = next;
        } else {
            let (next, text) = try_parse!(xml.consume_xml(xml.s.end_of_char_data(), SpecificError::InvalidCharData));
            sink.text(text);
            xml = next;
        }
    }
}

fn predefined_entity(name: &str) -> Option<&'static str> {
    match name {
        "lt" => Some("<"),
        "gt" => Some(">"),
        "amp" => Some("&"),
        "quot" => Some("\""),
        "apos" => Some("'"),
        "nbsp" => Some("\u{A0}"),
        _ => None,
    }
}

fn parse_reference<'a>(xml: StringPoint<'a>, config: ParserConfig) -> XmlProgress<'a, Cow<'a, str>> {
    let start = xml;
    match parse_strict_reference(xml, config) {
        Progress {
            status: Status::Success(text),
            point,
        } => success(text, point),
        Progress {
            status: Status::Failure(e),
            point,
        } => {
            if config.lenient_references {
                let (next, amp) = try_parse!(start.expect_literal("&", e));
                success(Cow::Borrowed(amp), next)
            } else {
                failure(e, point)
            }
        }
    }
}

fn parse_strict_reference<'a>(xml: StringPoint<'a>, config: ParserConfig) -> XmlProgress<'a, Cow<'a, str>> {
    let start = xml;
    let (xml, _) = try_parse!(xml.expect_literal("&", SpecificError::InvalidCharacterReference));

    if xml.s.starts_with('#') {
        let (xml, _) = try_parse!(xml.expect_literal("#", SpecificError::InvalidCharacterReference));
        let (xml, digits, radix) = if xml.s.starts_with('x') {
            let (xml, _) = try_parse!(xml.expect_literal("x", SpecificError::InvalidCharacterReference));
            let (xml, digits) = try_parse!(xml.consume_xml(xml.s.end_of_hex_chars(), SpecificError::InvalidCharacterReference));
            (xml, digits, 16)
        } else {
            let (xml, digits) = try_parse!(xml.consume_xml(
                xml.s.end_of_decimal_chars(),
                SpecificError::InvalidCharacterReference
            ));
            (xml, digits, 10)
        };
        let (xml, _) = try_parse!(xml.expect_literal(";", SpecificError::InvalidCharacterReference));

        let c = u32::from_str_radix(digits, radix).ok().and_then(char::from_u32);
        return match c {
            Some(c) => success(Cow::Owned(c.to_string()), xml),
            None => failure(SpecificError::InvalidCharacterReference, xml),
        };
    }

    let (after_name, name) = try_parse!(xml.consume_name(SpecificError::UnknownNamedReference));
    let (after_name, _) = try_parse!(after_name.expect_literal(";", SpecificError::UnknownNamedReference));

    // HTML entity names are case-sensitive, but a lower-casing DOM may
    // have folded them.
    let expanded = predefined_entity(name).or_else(|| match config.name_case {
        NameCase::Lowercase => predefined_entity(&name.to_ascii_lowercase()),
        NameCase::Preserve => None,
    });

    match expanded {
        Some(text) => success(Cow::Borrowed(text), after_name),
        None => failure(SpecificError::UnknownNamedReference, start),
    }
}

/// Parses XML with a fixed configuration.
#[derive(Debug, Copy, Clone, Default)]
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    pub fn new() -> Parser {
        Parser::default()
    }

    pub fn with_config(config: ParserConfig) -> Parser {
        Parser { config }
    }

    pub fn config(&self) -> ParserConfig {
        self.config
    }

    pub fn parse(&self, xml: &str) -> Result<Package, Error> {
        trace!(bytes = xml.len(), config = ?self.config, "parsing XML");

        let package = Package::new();
        {
            let mut sink = DomBuilder {
                config: self.config,
                doc: package.as_document(),
                open: Vec::new(),
            };

            let progress = parse_document(StringPoint::new(xml), &mut sink);
            if let Status::Failure(kind) = progress.status {
                return Err(Error::new(progress.point.offset, kind));
            }
        }
        Ok(package)
    }
}

/// Parses strict, case-preserving XML.
pub fn parse(xml: &str) -> Result<Package, Error> {
    Parser::new().parse(xml)
}
