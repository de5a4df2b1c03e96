//! Formats a DOM structure to a Write
//!
//! ### Example
//! ```
//! use eml_document::Package;
//! use eml_document::writer::format_document;
//!
//! let package = Package::new();
//! let doc = package.as_document();
//!
//! let hello = doc.create_element("hello");
//! hello.set_attribute_value("planet", "Earth");
//! doc.root().append_child(hello);
//!
//! let mut output = Vec::new();
//! format_document(doc, &mut output).expect("unable to output XML");
//! assert_eq!(output, br#"<?xml version="1.0"?><hello planet="Earth"/>"#);
//! ```
//!
//! ### Known issues
//!
//! Output is never indented; text nodes are written as they are.

use std::fmt;
use std::io;

use crate::dom::{ChildOfElement, ChildOfRoot, Comment, Document, Element, Text};

enum Content<'d> {
    Element(Element<'d>),
    ElementEnd(Element<'d>),
    Text(Text<'d>),
    Comment(Comment<'d>),
}

/// Output options.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Formatter {
    single_quotes: bool,
    write_declaration: bool,
}

impl Default for Formatter {
    fn default() -> Formatter {
        Formatter {
            single_quotes: false,
            write_declaration: true,
        }
    }
}

impl Formatter {
    pub fn new() -> Formatter {
        Formatter::default()
    }

    /// Quote attribute values with `'` instead of `"`.
    pub fn single_quotes(mut self, single_quotes: bool) -> Formatter {
        self.single_quotes = single_quotes;
        self
    }

    /// Start documents with an XML declaration. Has no effect on
    /// individually formatted elements.
    pub fn write_declaration(mut self, write_declaration: bool) -> Formatter {
        self.write_declaration = write_declaration;
        self
    }

    fn quote_char(&self) -> char {
        if self.single_quotes {
            '\''
        } else {
            '"'
        }
    }

    fn format_start_tag<W>(&self, element: Element<'_>, writer: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        write!(writer, "<{}", element.name())?;

        let quote = self.quote_char();
        for attr in element.attributes() {
            write!(writer, " {}={}", attr.name(), quote)?;
            escape_attribute_value(attr.value(), quote, writer)?;
            writer.write_char(quote)?;
        }

        Ok(())
    }

    fn format_one<'d, W>(&self, element: Element<'d>, todo: &mut Vec<Content<'d>>, writer: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        self.format_start_tag(element, writer)?;

        let mut children = element.children();
        if children.is_empty() {
            return writer.write_str("/>");
        }

        writer.write_char('>')?;
        todo.push(Content::ElementEnd(element));
        children.reverse();
        todo.extend(children.into_iter().map(|c| match c {
            ChildOfElement::Element(e) => Content::Element(e),
            ChildOfElement::Text(t) => Content::Text(t),
            ChildOfElement::Comment(c) => Content::Comment(c),
        }));

        Ok(())
    }

    /// Writes one element and everything below it.
    pub fn format_element<W>(&self, element: Element<'_>, writer: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        let mut todo = vec![Content::Element(element)];

        while let Some(content) = todo.pop() {
            match content {
                Content::Element(e) => self.format_one(e, &mut todo, writer)?,
                Content::ElementEnd(e) => write!(writer, "</{}>", e.name())?,
                Content::Text(t) => escape_text(t.text(), writer)?,
                Content::Comment(c) => write!(writer, "<!--{}-->", c.text())?,
            }
        }

        Ok(())
    }

    fn format_root<W>(&self, doc: Document<'_>, writer: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        if self.write_declaration {
            let quote = self.quote_char();
            write!(writer, "<?xml version={}1.0{}?>", quote, quote)?;
        }

        for child in doc.root().children() {
            match child {
                ChildOfRoot::Element(e) => self.format_element(e, writer)?,
                ChildOfRoot::Comment(c) => write!(writer, "<!--{}-->", c.text())?,
            }
        }

        Ok(())
    }

    pub fn format_document<W>(&self, doc: Document<'_>, writer: &mut W) -> io::Result<()>
    where
        W: io::Write,
    {
        write!(writer, "{}", DisplayDocument { formatter: self, doc })
    }

    pub fn element_to_string(&self, element: Element<'_>) -> String {
        DisplayElement { formatter: self, element }.to_string()
    }
}

struct DisplayElement<'f, 'd> {
    formatter: &'f Formatter,
    element: Element<'d>,
}

impl fmt::Display for DisplayElement<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.formatter.format_element(self.element, f)
    }
}

struct DisplayDocument<'f, 'd> {
    formatter: &'f Formatter,
    doc: Document<'d>,
}

impl fmt::Display for DisplayDocument<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.formatter.format_root(self.doc, f)
    }
}

fn escape_text<W>(text: &str, writer: &mut W) -> fmt::Result
where
    W: fmt::Write,
{
    for c in text.chars() {
        match c {
            '&' => writer.write_str("&amp;")?,
            '<' => writer.write_str("&lt;")?,
            '>' => writer.write_str("&gt;")?,
            c => writer.write_char(c)?,
        }
    }
    Ok(())
}

fn escape_attribute_value<W>(value: &str, quote: char, writer: &mut W) -> fmt::Result
where
    W: fmt::Write,
{
    for c in value.chars() {
        match c {
            '&' => writer.write_str("&amp;")?,
            '<' => writer.write_str("&lt;")?,
            '"' if quote == '"' => writer.write_str("&quot;")?,
            '\'' if quote == '\'' => writer.write_str("&apos;")?,
            c => writer.write_char(c)?,
        }
    }
    Ok(())
}

/// Formats a document into a Write using the default options.
pub fn format_document<W>(doc: Document<'_>, writer: &mut W) -> io::Result<()>
where
    W: io::Write,
{
    Formatter::default().format_document(doc, writer)
}
