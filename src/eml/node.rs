//! The parse / update / serialize machinery shared by every EML element
//! type.
//!
//! A concrete element type is a plain attribute struct implementing
//! [`Schema`]. [`Node`] wraps it with the source DOM it was parsed
//! from, its place in the parent graph and its lifecycle state, and
//! implements the algorithms once:
//!
//! * `update_dom` clones the source (or creates the root element),
//!   rewrites the children the schema manages in its node order and
//!   leaves everything else where it was;
//! * elements without text are pruned and names are canonicalized;
//! * `serialize` writes the result and adopts it as the new source.

use std::fmt;
use std::iter;

use tracing::{debug, trace};

use super::change::{Lineage, NodeKind, Notifier};
use super::error::{Error, SchemaError, ValidationErrors};
use super::extract;
use super::names::NodeNameMap;
use crate::dom::{ChildOfElement, Document, Element};
use crate::writer::Formatter;
use crate::Fragment;

/// Where a node is in its lifecycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NodeState {
    /// No source DOM. Either built in memory or last serialized to
    /// nothing.
    Fresh,
    /// Attributes match the source DOM.
    Hydrated,
    /// Attributes were changed since the last parse or serialize.
    Dirty,
}

/// The per-type configuration of an EML element.
pub trait Schema: Clone + Default + PartialEq + fmt::Debug + 'static {
    const KIND: NodeKind;

    /// Root tag of freshly created nodes.
    const ROOT: &'static str;

    /// Every child of the root is managed, so the root is emptied
    /// before the managed children are written.
    const EXCLUSIVE: bool = false;

    /// A hydrated node whose attributes are unchanged writes its
    /// source back instead of regenerating it.
    const PRESERVE_UNCHANGED: bool = false;

    fn names() -> &'static NodeNameMap;

    /// The children this type writes, in output order.
    fn node_order() -> &'static [&'static str];

    /// Every child the element may have, managed or not. Used to place
    /// a managed child that has no existing counterpart.
    fn schema_order() -> &'static [&'static str] {
        Self::node_order()
    }

    fn parse(element: Element<'_>, cx: &ParseContext<'_>) -> Self;

    /// The replacement elements for one slot of [`Schema::node_order`].
    /// `None` means the type has no rule for the slot, which is a
    /// programming error.
    fn inject<'d>(&self, slot: &Slot<'_, 'd>) -> Option<Vec<Element<'d>>>;

    /// Adjusts attributes of the root element.
    fn decorate(&self, _root: Element<'_>) {}

    fn is_empty(&self) -> bool;

    /// Whether `update_dom` produces anything at all.
    fn emits_output(&self) -> bool {
        !self.is_empty()
    }

    fn validate(&self) -> ValidationErrors {
        ValidationErrors::new()
    }
}

/// Gives `Schema::parse` a way to hydrate nested nodes under the node
/// being parsed.
pub struct ParseContext<'a> {
    parent: &'a Lineage,
}

impl<'a> ParseContext<'a> {
    pub fn new(parent: &'a Lineage) -> ParseContext<'a> {
        ParseContext { parent }
    }

    pub fn lineage(&self) -> &'a Lineage {
        self.parent
    }

    pub fn hydrate<T: Schema>(&self, element: Element<'_>) -> Node<T> {
        Node::hydrate(element, Some(self.parent))
    }

    /// Hydrates the first direct child named `name`.
    pub fn hydrate_child<T: Schema>(&self, node: Element<'_>, name: &str) -> Option<Node<T>> {
        extract::child(Some(node), name).map(|e| self.hydrate(e))
    }

    /// Hydrates every direct child named `name`.
    pub fn hydrate_children<T: Schema>(&self, node: Element<'_>, name: &str) -> Vec<Node<T>> {
        extract::children(Some(node), name)
            .into_iter()
            .map(|e| self.hydrate(e))
            .collect()
    }
}

/// One managed child name while a node is written.
pub struct Slot<'a, 'd> {
    name: &'a str,
    doc: Document<'d>,
    existing: Vec<Element<'d>>,
}

impl<'a, 'd> Slot<'a, 'd> {
    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn document(&self) -> Document<'d> {
        self.doc
    }

    /// The children currently occupying this slot. They are removed
    /// after injection unless returned again.
    pub fn existing(&self) -> &[Element<'d>] {
        &self.existing
    }

    /// A new, empty element named after the slot.
    pub fn element(&self) -> Element<'d> {
        self.create(self.name)
    }

    /// A new, empty element for nested structure below the slot.
    pub fn create(&self, name: &str) -> Element<'d> {
        self.doc.create_element(name)
    }

    pub fn create_leaf(&self, name: &str, value: &str) -> Element<'d> {
        let element = self.create(name);
        element.set_text(value.trim());
        element
    }

    /// The first existing element, or a new one.
    pub fn reuse(&self) -> Element<'d> {
        match self.existing.first() {
            Some(e) => *e,
            None => self.element(),
        }
    }

    /// `<name>value</name>` with surrounding whitespace trimmed.
    pub fn leaf(&self, value: &str) -> Element<'d> {
        self.create_leaf(self.name, value)
    }

    /// One leaf per non-blank value.
    pub fn leaves<I>(&self, values: I) -> Vec<Element<'d>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        values
            .into_iter()
            .filter(|v| !v.as_ref().trim().is_empty())
            .map(|v| self.leaf(v.as_ref()))
            .collect()
    }

    pub fn optional(&self, value: Option<&str>) -> Vec<Element<'d>> {
        self.leaves(value)
    }

    /// The output of a nested node, copied into this document.
    pub fn embed<T: Schema>(&self, node: &Node<T>) -> Vec<Element<'d>> {
        node.update_dom()
            .map(|fragment| self.doc.import(fragment.element()))
            .into_iter()
            .collect()
    }

    /// Like [`Slot::embed`], with the root renamed after this slot.
    pub fn embed_named<T: Schema>(&self, node: &Node<T>) -> Vec<Element<'d>> {
        let elements = self.embed(node);
        for e in &elements {
            e.set_name(self.name);
        }
        elements
    }

    pub fn embed_all<T: Schema>(&self, nodes: &[Node<T>]) -> Vec<Element<'d>> {
        nodes.iter().flat_map(|n| self.embed(n)).collect()
    }
}

/// Replaces the `managed` children of `parent`, one name at a time.
///
/// New children take the position of the first child they replace.
/// Without one, they go after the last sibling that precedes them in
/// `order`, else before the first sibling that follows them, else at
/// the end. Children that are not managed never move.
pub fn rewrite<'d, F>(parent: Element<'d>, managed: &[&str], order: &[&str], mut inject: F)
where
    F: FnMut(&Slot<'_, 'd>) -> Vec<Element<'d>>,
{
    let doc = parent.document();

    for &name in managed {
        let existing = extract::children(Some(parent), name);
        let slot = Slot { name, doc, existing };
        let fresh = inject(&slot);
        place(parent, &slot, fresh, order);
    }
}

fn place<'d>(parent: Element<'d>, slot: &Slot<'_, 'd>, fresh: Vec<Element<'d>>, order: &[&str]) {
    let children = parent.children();
    let anchor = match slot.existing.first() {
        Some(first) => children
            .iter()
            .position(|c| c.element() == Some(*first))
            .unwrap_or(children.len()),
        None => insertion_point(&children, slot.name, order),
    };

    for e in &slot.existing {
        e.remove_from_parent();
    }

    for (offset, e) in fresh.into_iter().enumerate() {
        parent.insert_child(anchor + offset, e);
    }
}

fn insertion_point(children: &[ChildOfElement<'_>], name: &str, order: &[&str]) -> usize {
    let rank_of = |name: &str| order.iter().position(|o| o.eq_ignore_ascii_case(name));
    let rank = |c: &ChildOfElement<'_>| c.element().and_then(|e| rank_of(e.name()));

    let target = match rank_of(name) {
        Some(target) => target,
        None => return children.len(),
    };

    if let Some(i) = children.iter().rposition(|c| matches!(rank(c), Some(r) if r < target)) {
        return i + 1;
    }

    children
        .iter()
        .position(|c| matches!(rank(c), Some(r) if r > target))
        .unwrap_or(children.len())
}

/// Whether the element holds no non-whitespace text anywhere below it.
pub fn is_blank(element: Element<'_>) -> bool {
    element.text_content().trim().is_empty()
}

/// Removes every descendant element that [`is_blank`].
pub fn prune_empty(element: Element<'_>) {
    for child in element.element_children() {
        if is_blank(child) {
            child.remove_from_parent();
        } else {
            prune_empty(child);
        }
    }
}

/// An EML element: typed attributes plus the DOM they came from.
pub struct Node<S: Schema> {
    attributes: S,
    pristine: Option<S>,
    source: Option<Fragment>,
    lineage: Lineage,
    tag: String,
    state: NodeState,
    is_new: bool,
}

impl<S: Schema> Node<S> {
    pub fn new(attributes: S) -> Node<S> {
        Node::with_parent(attributes, None)
    }

    pub fn with_parent(attributes: S, parent: Option<&Lineage>) -> Node<S> {
        let lineage = Lineage::new(S::KIND);
        lineage.set_parent(parent);

        Node {
            attributes,
            pristine: None,
            source: None,
            lineage,
            tag: S::ROOT.to_owned(),
            state: NodeState::Fresh,
            is_new: true,
        }
    }

    /// Sets the root tag of fresh output without marking the node dirty.
    pub fn with_tag(mut self, tag: &str) -> Node<S> {
        self.tag = tag.to_owned();
        self
    }

    /// Parses `element` into a new node. The element is copied; the
    /// caller's DOM is never touched.
    pub fn hydrate(element: Element<'_>, parent: Option<&Lineage>) -> Node<S> {
        let mut node = Node::with_parent(S::default(), parent);
        node.adopt_source(Fragment::from_element(element));
        node
    }

    /// Parses markup in the HTML-compatible mode.
    pub fn from_xml(xml: &str, parent: Option<&Lineage>) -> Result<Node<S>, Error> {
        let fragment = Fragment::parse(xml)?;
        let mut node = Node::with_parent(S::default(), parent);
        node.adopt_source(fragment);
        Ok(node)
    }

    /// Replaces attributes and source with a parse of `element`.
    pub fn rehydrate(&mut self, element: Element<'_>) {
        self.adopt_source(Fragment::from_element(element));
    }

    fn adopt_source(&mut self, fragment: Fragment) {
        let attributes = self.parse(fragment.element());
        self.tag = S::names().canonical(fragment.element().name()).to_owned();
        self.pristine = Some(attributes.clone());
        self.attributes = attributes;
        self.source = Some(fragment);
        self.state = NodeState::Hydrated;
        trace!(kind = ?S::KIND, tag = %self.tag, "hydrated node");
    }

    /// Reads attributes from `element` without changing this node.
    pub fn parse(&self, element: Element<'_>) -> S {
        S::parse(element, &ParseContext::new(&self.lineage))
    }

    pub fn attributes(&self) -> &S {
        &self.attributes
    }

    pub fn source(&self) -> Option<&Fragment> {
        self.source.as_ref()
    }

    pub fn lineage(&self) -> &Lineage {
        &self.lineage
    }

    pub fn kind(&self) -> NodeKind {
        S::KIND
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    /// True until the first serialize that produced output.
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Changes the attributes through `f`, then reports the change.
    pub fn update<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut S) -> R,
    {
        let result = f(&mut self.attributes);
        self.mark_dirty();
        result
    }

    pub fn set_attributes(&mut self, attributes: S) {
        self.attributes = attributes;
        self.mark_dirty();
    }

    /// Renames the root element of fresh output.
    pub fn set_tag(&mut self, tag: &str) {
        self.tag = tag.to_owned();
        self.mark_dirty();
    }

    fn mark_dirty(&mut self) {
        self.state = NodeState::Dirty;
        self.trickle_up_change();
    }

    pub fn set_parent(&self, parent: Option<&Lineage>) {
        self.lineage.set_parent(parent);
    }

    /// Makes this node the listener for changes at or below it.
    pub fn set_notifier(&self, notifier: Option<Notifier>) {
        self.lineage.set_notifier(notifier);
    }

    pub fn trickle_up_change(&self) {
        self.lineage.trickle_up_change();
    }

    pub fn parent_of_type(&self, kind: NodeKind) -> Option<Lineage> {
        self.lineage.parent_of_type(kind)
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn validate(&self) -> ValidationErrors {
        self.attributes.validate()
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Produces the DOM for the current attributes, or `None` when the
    /// node has nothing to say.
    ///
    /// # Panics
    ///
    /// If a name in the node order has no injection rule.
    pub fn update_dom(&self) -> Option<Fragment> {
        if !self.attributes.emits_output() {
            trace!(kind = ?S::KIND, "node has no output");
            return None;
        }

        let fragment = match self.source {
            Some(ref source) => source.clone(),
            None => Fragment::new(&self.tag),
        };

        {
            let root = fragment.element();
            let untouched =
                S::PRESERVE_UNCHANGED && self.source.is_some() && self.pristine.as_ref() == Some(&self.attributes);

            if !untouched {
                if S::EXCLUSIVE {
                    root.clear_children();
                }
                self.attributes.decorate(root);

                let mut missing = None;
                rewrite(root, S::node_order(), S::schema_order(), |slot| {
                    match self.attributes.inject(slot) {
                        Some(elements) => elements,
                        None => {
                            missing.get_or_insert_with(|| slot.name().to_owned());
                            Vec::new()
                        }
                    }
                });
                if let Some(slot) = missing {
                    panic!("{}", SchemaError::MissingInjection { kind: S::KIND, slot });
                }
            }

            prune_empty(root);
            S::names().canonicalize(root);

            if is_blank(root) {
                return None;
            }
        }

        Some(fragment)
    }

    pub fn serialize(&mut self) -> String {
        self.serialize_with(&Formatter::new())
    }

    /// Writes the node. Output becomes the new source. An empty string
    /// means there was nothing to write, and the node drops its source
    /// and is `Fresh` again.
    pub fn serialize_with(&mut self, formatter: &Formatter) -> String {
        match self.update_dom() {
            Some(fragment) => {
                let xml = fragment.to_xml_with(formatter);
                self.source = Some(fragment);
                self.pristine = Some(self.attributes.clone());
                self.state = NodeState::Hydrated;
                self.is_new = false;
                debug!(kind = ?S::KIND, bytes = xml.len(), "serialized node");
                xml
            }
            None => {
                // Nothing was written, so the parent drops this node and
                // there is no foreign content left to carry.
                self.source = None;
                self.pristine = None;
                self.state = NodeState::Fresh;
                debug!(kind = ?S::KIND, "node serialized to nothing");
                String::new()
            }
        }
    }
}

impl<S: Schema> Default for Node<S> {
    fn default() -> Node<S> {
        Node::new(S::default())
    }
}

/// The clone gets its own lineage link under the same parent. Nested
/// nodes inside the attributes still point at the original.
impl<S: Schema> Clone for Node<S> {
    fn clone(&self) -> Node<S> {
        let lineage = Lineage::new(S::KIND);
        lineage.set_parent(self.lineage.parent().as_ref());

        Node {
            attributes: self.attributes.clone(),
            pristine: self.pristine.clone(),
            source: self.source.clone(),
            lineage,
            tag: self.tag.clone(),
            state: self.state,
            is_new: self.is_new,
        }
    }
}

impl<S: Schema> PartialEq for Node<S> {
    fn eq(&self, other: &Node<S>) -> bool {
        self.attributes == other.attributes
    }
}

impl<S: Schema> fmt::Debug for Node<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("tag", &self.tag)
            .field("state", &self.state)
            .field("attributes", &self.attributes)
            .finish()
    }
}

/// The output of every node that has any, in order.
pub fn update_doms<S: Schema>(nodes: &[Node<S>]) -> Vec<Fragment> {
    nodes.iter().filter_map(Node::update_dom).collect()
}

/// Checks that a schema can write every name it orders and that every
/// name it writes is spelled canonically.
pub fn verify<S: Schema>() -> Result<(), SchemaError> {
    let fragment = Fragment::new(S::ROOT);
    let sample = S::default();

    for &name in S::node_order() {
        let slot = Slot {
            name,
            doc: fragment.document(),
            existing: Vec::new(),
        };
        if sample.inject(&slot).is_none() {
            return Err(SchemaError::MissingInjection {
                kind: S::KIND,
                slot: name.to_owned(),
            });
        }
    }

    for &name in iter::once(&S::ROOT).chain(S::node_order()).chain(S::schema_order()) {
        if name.bytes().any(|b| b.is_ascii_uppercase()) && S::names().lookup(name).is_none() {
            return Err(SchemaError::UnmappedName {
                kind: S::KIND,
                name: name.to_owned(),
            });
        }
    }

    for &name in iter::once(&S::ROOT).chain(S::schema_order()) {
        let canonical = S::names().canonical(name);
        if canonical != name {
            return Err(SchemaError::UncanonicalName {
                kind: S::KIND,
                name: name.to_owned(),
                canonical: canonical.to_owned(),
            });
        }
    }

    Ok(())
}

/// Reads `node`'s output back the way input arrives, with every name
/// lower cased, and checks that writing it again gives the same text.
/// This catches names the schema writes through foreign content or
/// nested rewrites that its map cannot restore.
pub fn verify_sample<S: Schema>(node: &Node<S>) -> Result<(), Error> {
    let expected = match node.update_dom() {
        Some(fragment) => fragment.to_xml(),
        None => return Ok(()),
    };

    let reread = Node::<S>::from_xml(&expected, None)?;
    let actual = reread.update_dom().map(|f| f.to_xml()).unwrap_or_default();
    if actual != expected {
        return Err(SchemaError::CaseUnstable {
            kind: S::KIND,
            expected,
            actual,
        }
        .into());
    }

    Ok(())
}
