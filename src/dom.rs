//! A traditional DOM tree interface for navigating and manipulating
//! XML documents.

use std::{fmt, hash};

use crate::raw;

/// An XML document
#[derive(Copy, Clone)]
pub struct Document<'d> {
    storage: &'d raw::Storage,
    connections: &'d raw::Connections,
}

macro_rules! wrapper(
    ($name:ident, $wrapper:ident, $inner:ty) => (
        pub(crate) fn $name(self, node: *mut $inner) -> $wrapper<'d> {
            $wrapper {
                document: self,
                node,
            }
        }
    )
);

impl<'d> Document<'d> {
    wrapper!(wrap_root, Root, raw::Root);
    wrapper!(wrap_element, Element, raw::Element);
    wrapper!(wrap_attribute, Attribute, raw::Attribute);
    wrapper!(wrap_text, Text, raw::Text);
    wrapper!(wrap_comment, Comment, raw::Comment);

    pub(crate) fn new(storage: &'d raw::Storage, connections: &'d raw::Connections) -> Document<'d> {
        Document { storage, connections }
    }

    fn wrap_parent_of_child(self, node: raw::ParentOfChild) -> ParentOfChild<'d> {
        match node {
            raw::ParentOfChild::Root(n) => ParentOfChild::Root(self.wrap_root(n)),
            raw::ParentOfChild::Element(n) => ParentOfChild::Element(self.wrap_element(n)),
        }
    }

    fn wrap_child_of_root(self, node: raw::ChildOfRoot) -> ChildOfRoot<'d> {
        match node {
            raw::ChildOfRoot::Element(n) => ChildOfRoot::Element(self.wrap_element(n)),
            raw::ChildOfRoot::Comment(n) => ChildOfRoot::Comment(self.wrap_comment(n)),
        }
    }

    fn wrap_child_of_element(self, node: raw::ChildOfElement) -> ChildOfElement<'d> {
        match node {
            raw::ChildOfElement::Element(n) => ChildOfElement::Element(self.wrap_element(n)),
            raw::ChildOfElement::Text(n) => ChildOfElement::Text(self.wrap_text(n)),
            raw::ChildOfElement::Comment(n) => ChildOfElement::Comment(self.wrap_comment(n)),
        }
    }

    pub fn root(self) -> Root<'d> {
        self.wrap_root(self.connections.root())
    }

    /// The single element child of the root, if there is one.
    pub fn root_element(self) -> Option<Element<'d>> {
        self.root().children().into_iter().find_map(|c| c.element())
    }

    pub fn create_element(self, name: &str) -> Element<'d> {
        self.wrap_element(self.storage.create_element(name))
    }

    pub fn create_text(self, text: &str) -> Text<'d> {
        self.wrap_text(self.storage.create_text(text))
    }

    pub fn create_comment(self, text: &str) -> Comment<'d> {
        self.wrap_comment(self.storage.create_comment(text))
    }

    /// Deep-copies an element, which may belong to another document,
    /// into this document. The copy has no parent.
    pub fn import(self, foreign: Element<'_>) -> Element<'d> {
        let copy = self.create_element(foreign.name());

        for attr in foreign.attributes() {
            copy.set_attribute_value(attr.name(), attr.value());
        }

        for child in foreign.children() {
            match child {
                ChildOfElement::Element(e) => copy.append_child(self.import(e)),
                ChildOfElement::Text(t) => copy.append_child(self.create_text(t.text())),
                ChildOfElement::Comment(c) => copy.append_child(self.create_comment(c.text())),
            }
        }

        copy
    }
}

impl<'d> PartialEq for Document<'d> {
    fn eq(&self, other: &Document<'d>) -> bool {
        (self.storage as *const raw::Storage, self.connections as *const raw::Connections)
            == (other.storage as *const raw::Storage, other.connections as *const raw::Connections)
    }
}

impl<'d> fmt::Debug for Document<'d> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Document {{ {:?} }}", self.storage as *const raw::Storage)
    }
}

macro_rules! node(
    ($name:ident, $raw:ty, $doc:expr) => (
        #[doc = $doc]
        #[derive(Copy, Clone)]
        pub struct $name<'d> {
            document: Document<'d>,
            node: *mut $raw,
        }

        impl<'d> $name<'d> {
            #[allow(dead_code)]
            fn node(&self) -> &'d $raw { unsafe { &*self.node } }

            pub fn document(&self) -> Document<'d> { self.document }
        }

        impl<'d> PartialEq for $name<'d> {
            fn eq(&self, other: &$name<'d>) -> bool {
                self.node == other.node
            }
        }

        impl<'d> Eq for $name<'d> {}

        impl<'d> hash::Hash for $name<'d> {
            fn hash<H>(&self, state: &mut H)
            where
                H: hash::Hasher,
            {
                self.node.hash(state)
            }
        }
    )
);

node!(Root, raw::Root, "The logical ancestor of every other node type");

impl<'d> Root<'d> {
    pub fn append_child<C>(&self, child: C)
    where
        C: Into<ChildOfRoot<'d>>,
    {
        let child = child.into();
        self.document.connections.append_root_child(child.as_raw());
    }

    pub fn remove_child<C>(&self, child: C)
    where
        C: Into<ChildOfRoot<'d>>,
    {
        let child = child.into();
        self.document.connections.remove_root_child(child.as_raw())
    }

    pub fn clear_children(&self) {
        self.document.connections.clear_root_children();
    }

    pub fn children(&self) -> Vec<ChildOfRoot<'d>> {
        // This is safe because we make a copy of the children, and the
        // children are never deallocated.
        unsafe {
            self.document
                .connections
                .root_children()
                .iter()
                .map(|n| self.document.wrap_child_of_root(*n))
                .collect()
        }
    }
}

impl<'d> fmt::Debug for Root<'d> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Root")
    }
}

node!(
    Element,
    raw::Element,
    "Elements are the workhorse of a document and may contain any type of
    node, except for the Root node"
);

impl<'d> Element<'d> {
    pub(crate) fn as_raw(&self) -> *mut raw::Element {
        self.node
    }

    pub fn name(&self) -> &'d str {
        self.node().name()
    }

    pub fn set_name(&self, name: &str) {
        self.document.storage.element_set_name(self.node, name)
    }

    /// Compares the element name ignoring ASCII case.
    pub fn is_named(&self, name: &str) -> bool {
        self.name().eq_ignore_ascii_case(name)
    }

    pub fn parent(&self) -> Option<ParentOfChild<'d>> {
        self.document
            .connections
            .element_parent(self.node)
            .map(|n| self.document.wrap_parent_of_child(n))
    }

    pub fn remove_from_parent(&self) {
        self.document.connections.remove_element_from_parent(self.node);
    }

    pub fn append_child<C>(&self, child: C)
    where
        C: Into<ChildOfElement<'d>>,
    {
        let child = child.into();
        self.document.connections.append_element_child(self.node, child.as_raw());
    }

    pub fn append_children<I>(&self, children: I)
    where
        I: IntoIterator,
        I::Item: Into<ChildOfElement<'d>>,
    {
        for c in children {
            self.append_child(c.into());
        }
    }

    /// Inserts `child` so that it ends up at `index` among this
    /// element's children. Indices past the end append.
    pub fn insert_child<C>(&self, index: usize, child: C)
    where
        C: Into<ChildOfElement<'d>>,
    {
        let child = child.into();
        self.document
            .connections
            .insert_element_child(self.node, index, child.as_raw());
    }

    pub fn replace_children<I>(&self, children: I)
    where
        I: IntoIterator,
        I::Item: Into<ChildOfElement<'d>>,
    {
        self.clear_children();
        self.append_children(children);
    }

    pub fn remove_child<C>(&self, child: C)
    where
        C: Into<ChildOfElement<'d>>,
    {
        let child = child.into();
        self.document.connections.remove_element_child(self.node, child.as_raw());
    }

    pub fn clear_children(&self) {
        self.document.connections.clear_element_children(self.node);
    }

    pub fn children(&self) -> Vec<ChildOfElement<'d>> {
        // This is safe because we make a copy of the children, and
        // the children are never deallocated.
        unsafe {
            self.document
                .connections
                .element_children(self.node)
                .iter()
                .map(|n| self.document.wrap_child_of_element(*n))
                .collect()
        }
    }

    pub fn element_children(&self) -> Vec<Element<'d>> {
        self.children().into_iter().filter_map(|c| c.element()).collect()
    }

    /// All descendant text, concatenated in document order.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        let mut todo = self.children();
        todo.reverse();

        while let Some(child) = todo.pop() {
            match child {
                ChildOfElement::Text(t) => text.push_str(t.text()),
                ChildOfElement::Element(e) => {
                    let mut children = e.children();
                    children.reverse();
                    todo.extend(children);
                }
                ChildOfElement::Comment(_) => {}
            }
        }

        text
    }

    pub fn attribute(&self, name: &str) -> Option<Attribute<'d>> {
        self.document
            .connections
            .attribute(self.node, name)
            .map(|n| self.document.wrap_attribute(n))
    }

    pub fn attributes(&self) -> Vec<Attribute<'d>> {
        // This is safe because we make a copy of the children, and
        // the children are never deallocated.
        unsafe {
            self.document
                .connections
                .attributes(self.node)
                .iter()
                .map(|n| self.document.wrap_attribute(*n))
                .collect()
        }
    }

    pub fn set_attribute_value(&self, name: &str, value: &str) -> Attribute<'d> {
        let attr = self.document.storage.create_attribute(name, value);
        self.document.connections.set_attribute(self.node, attr);
        self.document.wrap_attribute(attr)
    }

    pub fn attribute_value(&self, name: &str) -> Option<&'d str> {
        self.document.connections.attribute(self.node, name).map(|a| {
            let a_r = unsafe { &*a };
            a_r.value()
        })
    }

    pub fn remove_attribute(&self, name: &str) {
        self.document.connections.remove_attribute(self.node, name);
    }

    pub fn set_text(&self, text: &str) -> Text<'d> {
        let text = self.document.create_text(text);
        self.clear_children();
        self.append_child(text);
        text
    }
}

impl<'d> fmt::Debug for Element<'d> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Element {{ name: {:?} }}", self.name())
    }
}

node!(Attribute, raw::Attribute, "Metadata about the current element");

impl<'d> Attribute<'d> {
    pub fn name(&self) -> &'d str {
        self.node().name()
    }
    pub fn value(&self) -> &'d str {
        self.node().value()
    }

    pub fn parent(&self) -> Option<Element<'d>> {
        self.document
            .connections
            .attribute_parent(self.node)
            .map(|n| self.document.wrap_element(n))
    }

    pub fn remove_from_parent(&self) {
        self.document.connections.remove_attribute_from_parent(self.node);
    }
}

impl<'d> fmt::Debug for Attribute<'d> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Attribute {{ name: {:?}, value: {:?} }}", self.name(), self.value())
    }
}

node!(Text, raw::Text, "Textual data");

impl<'d> Text<'d> {
    pub fn text(&self) -> &'d str {
        self.node().text()
    }

    pub fn set_text(&self, text: &str) {
        self.document.storage.text_set_text(self.node, text)
    }

    pub fn parent(&self) -> Option<Element<'d>> {
        self.document
            .connections
            .text_parent(self.node)
            .map(|n| self.document.wrap_element(n))
    }

    pub fn remove_from_parent(&self) {
        self.document.connections.remove_text_from_parent(self.node);
    }
}

impl<'d> fmt::Debug for Text<'d> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Text {{ text: {:?} }}", self.text())
    }
}

node!(Comment, raw::Comment, "Information only relevant to humans");

impl<'d> Comment<'d> {
    pub fn text(&self) -> &'d str {
        self.node().text()
    }

    pub fn set_text(&self, new_text: &str) {
        self.document.storage.comment_set_text(self.node, new_text)
    }

    pub fn parent(&self) -> Option<ParentOfChild<'d>> {
        self.document
            .connections
            .comment_parent(self.node)
            .map(|n| self.document.wrap_parent_of_child(n))
    }

    pub fn remove_from_parent(&self) {
        self.document.connections.remove_comment_from_parent(self.node);
    }
}

impl<'d> fmt::Debug for Comment<'d> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Comment {{ text: {:?} }}", self.text())
    }
}

macro_rules! unpack(
    ($enum_name:ident, $name:ident, $wrapper:ident, $inner:ident) => (
        pub fn $name(self) -> Option<$inner<'d>> {
            match self {
                $enum_name::$wrapper(n) => Some(n),
                _ => None,
            }
        }
    )
);

/// Nodes that may occur as a child of the root node
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ChildOfRoot<'d> {
    Element(Element<'d>),
    Comment(Comment<'d>),
}

impl<'d> ChildOfRoot<'d> {
    unpack!(ChildOfRoot, element, Element, Element);
    unpack!(ChildOfRoot, comment, Comment, Comment);

    fn as_raw(&self) -> raw::ChildOfRoot {
        match *self {
            ChildOfRoot::Element(n) => raw::ChildOfRoot::Element(n.node),
            ChildOfRoot::Comment(n) => raw::ChildOfRoot::Comment(n.node),
        }
    }
}

/// Nodes that may occur as a child of an element node
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ChildOfElement<'d> {
    Element(Element<'d>),
    Text(Text<'d>),
    Comment(Comment<'d>),
}

impl<'d> ChildOfElement<'d> {
    unpack!(ChildOfElement, element, Element, Element);
    unpack!(ChildOfElement, text, Text, Text);
    unpack!(ChildOfElement, comment, Comment, Comment);

    fn as_raw(&self) -> raw::ChildOfElement {
        match *self {
            ChildOfElement::Element(n) => raw::ChildOfElement::Element(n.node),
            ChildOfElement::Text(n) => raw::ChildOfElement::Text(n.node),
            ChildOfElement::Comment(n) => raw::ChildOfElement::Comment(n.node),
        }
    }
}

/// Nodes that may occur as the parent of a child node
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ParentOfChild<'d> {
    Root(Root<'d>),
    Element(Element<'d>),
}

impl<'d> ParentOfChild<'d> {
    unpack!(ParentOfChild, root, Root, Root);
    unpack!(ParentOfChild, element, Element, Element);
}

macro_rules! conversion_trait(
    ($res_type:ident, {
        $($leaf_type:ident => $variant:expr),*
    }) => (
        $(impl<'d> From<$leaf_type<'d>> for $res_type<'d> {
            fn from(v: $leaf_type<'d>) -> $res_type<'d> {
                $variant(v)
            }
        })*

        $(impl<'a, 'd> From<&'a $leaf_type<'d>> for $res_type<'d> {
            fn from(v: &'a $leaf_type<'d>) -> $res_type<'d> {
                $variant(*v)
            }
        })*
    )
);

conversion_trait!(
    ChildOfRoot, {
        Element => ChildOfRoot::Element,
        Comment => ChildOfRoot::Comment
    }
);

conversion_trait!(
    ChildOfElement, {
        Element => ChildOfElement::Element,
        Text    => ChildOfElement::Text,
        Comment => ChildOfElement::Comment
    }
);

impl<'d> From<ChildOfRoot<'d>> for ChildOfElement<'d> {
    fn from(v: ChildOfRoot<'d>) -> ChildOfElement<'d> {
        match v {
            ChildOfRoot::Element(n) => ChildOfElement::Element(n),
            ChildOfRoot::Comment(n) => ChildOfElement::Comment(n),
        }
    }
}
