//! Parse, update and serialize fragments of Ecological Metadata
//! Language (EML) documents.
//!
//! The crate has two layers. The lower one is a small arena-backed XML
//! DOM with a parser and a writer. The upper one, [`eml`], projects
//! EML elements into typed attribute models that can be mutated and
//! written back without disturbing content they do not manage.
//!
//! ### Overview
//!
//! The DOM is owned by a [`Package`]. A `Package` hands out a
//! [`dom::Document`] whose nodes all share the package's lifetime.
//!
//! ```
//! use eml_document::Package;
//! let package = Package::new();
//! let doc = package.as_document();
//!
//! let keywords = doc.create_element("keywordSet");
//! let keyword = doc.create_element("keyword");
//! keyword.set_text("soil");
//! keywords.append_child(keyword);
//! doc.root().append_child(keywords);
//! ```
//!
//! Typed EML nodes sit on top of that DOM:
//!
//! ```
//! use eml_document::eml::EmlKeywordSet;
//!
//! let mut set = EmlKeywordSet::from_xml(
//!     "<keywordset><keyword>soil</keyword></keywordset>",
//!     None,
//! ).unwrap();
//! set.add_keyword("water");
//!
//! assert_eq!(
//!     set.serialize(),
//!     "<keywordSet><keyword>soil</keyword><keyword>water</keyword></keywordSet>",
//! );
//! ```
//!
//! ### Design decisions
//!
//! Try to leverage the type system as much as possible. Every EML
//! element type is the same generic [`eml::Node`] with a different
//! [`eml::Schema`].

use std::fmt;

mod raw;
mod str;
mod string_pool;

pub mod dom;
pub mod eml;
pub mod fragment;
pub mod parser;
pub mod writer;

pub use crate::fragment::Fragment;

/// Owns every node of one XML document.
pub struct Package {
    storage: raw::Storage,
    connections: raw::Connections,
}

impl Package {
    pub fn new() -> Package {
        let s = raw::Storage::new();
        let root = s.create_root();
        Package {
            storage: s,
            connections: raw::Connections::new(root),
        }
    }

    pub fn as_document(&self) -> dom::Document<'_> {
        dom::Document::new(&self.storage, &self.connections)
    }
}

impl Default for Package {
    fn default() -> Package {
        Package::new()
    }
}

impl PartialEq for Package {
    fn eq(&self, other: &Package) -> bool {
        self as *const Package == other as *const Package
    }
}

impl fmt::Debug for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Package")
    }
}
