//! A detached, owned subtree with exactly one top-level element.

use std::fmt;

use crate::dom::{Document, Element};
use crate::parser::{self, Parser, ParserConfig, SpecificError};
use crate::raw;
use crate::writer::Formatter;
use crate::Package;

/// Owns a package holding a single element. Cloning deep-copies the
/// whole subtree, so a clone can be edited freely.
pub struct Fragment {
    package: Package,
    element: *mut raw::Element,
}

impl Fragment {
    /// A fragment holding a single empty element.
    pub fn new(name: &str) -> Fragment {
        let package = Package::new();
        let element = {
            let doc = package.as_document();
            let element = doc.create_element(name);
            doc.root().append_child(element);
            element.as_raw()
        };
        Fragment { package, element }
    }

    /// Deep-copies `source`, which may live in any document.
    pub fn from_element(source: Element<'_>) -> Fragment {
        let package = Package::new();
        let element = {
            let doc = package.as_document();
            let element = doc.import(source);
            doc.root().append_child(element);
            element.as_raw()
        };
        Fragment { package, element }
    }

    /// Parses markup in the HTML-compatible mode the EML layer expects.
    pub fn parse(xml: &str) -> Result<Fragment, parser::Error> {
        Fragment::parse_with(xml, ParserConfig::html_compatible())
    }

    pub fn parse_with(xml: &str, config: ParserConfig) -> Result<Fragment, parser::Error> {
        let package = Parser::with_config(config).parse(xml)?;
        let element = package
            .as_document()
            .root_element()
            .map(|e| e.as_raw())
            .ok_or_else(|| parser::Error::new(xml.len(), SpecificError::ExpectedElement))?;
        Ok(Fragment { package, element })
    }

    pub fn document(&self) -> Document<'_> {
        self.package.as_document()
    }

    pub fn element(&self) -> Element<'_> {
        self.document().wrap_element(self.element)
    }

    pub fn to_xml(&self) -> String {
        self.to_xml_with(&Formatter::new())
    }

    pub fn to_xml_with(&self, formatter: &Formatter) -> String {
        formatter.element_to_string(self.element())
    }
}

impl Clone for Fragment {
    fn clone(&self) -> Fragment {
        Fragment::from_element(self.element())
    }
}

impl fmt::Debug for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Fragment").field(&self.to_xml()).finish()
    }
}
