//! Change notification from nested nodes up to the document.
//!
//! Every node owns a [`Lineage`] link. Links point weakly at their
//! parent link, so a nested node never keeps its parent alive and a
//! detached node simply has nobody to tell. The document root (or any
//! other listener) installs a [`Notifier`]; a change anywhere below it
//! walks up until it finds one.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

/// The furthest a change or a type lookup travels above a node.
pub const MAX_ANCESTRY_DEPTH: usize = 6;

/// Called when something below the listener changed.
pub type Notifier = Rc<dyn Fn()>;

/// The element types that take part in the parent graph.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Eml,
    Dataset,
    Text,
    KeywordSet,
    TemporalCoverage,
    MissingValueCode,
    OtherEntity,
    Distribution,
    TaxonCoverage,
    GeoCoverage,
    Project,
    Award,
    Methods,
    MethodStep,
    /// Anything else a caller wants to model.
    Other(&'static str),
}

/// The "document has unsaved changes" flag.
#[derive(Debug, Clone, Default)]
pub struct ChangeFlag(Rc<Cell<bool>>);

impl ChangeFlag {
    pub fn new() -> ChangeFlag {
        ChangeFlag::default()
    }

    pub fn set_changed(&self) {
        self.0.set(true);
    }

    pub fn is_changed(&self) -> bool {
        self.0.get()
    }

    pub fn reset(&self) {
        self.0.set(false);
    }

    /// A notifier that raises this flag.
    pub fn notifier(&self) -> Notifier {
        let flag = self.clone();
        Rc::new(move || flag.set_changed())
    }
}

struct Link {
    kind: NodeKind,
    parent: RefCell<Option<Weak<Link>>>,
    notifier: RefCell<Option<Notifier>>,
}

/// A node's place in the parent graph.
#[derive(Clone)]
pub struct Lineage {
    link: Rc<Link>,
}

impl Lineage {
    pub fn new(kind: NodeKind) -> Lineage {
        Lineage {
            link: Rc::new(Link {
                kind,
                parent: RefCell::new(None),
                notifier: RefCell::new(None),
            }),
        }
    }

    /// A top-level link that listens for changes below it.
    pub fn listening(kind: NodeKind, notifier: Notifier) -> Lineage {
        let lineage = Lineage::new(kind);
        lineage.set_notifier(Some(notifier));
        lineage
    }

    pub fn kind(&self) -> NodeKind {
        self.link.kind
    }

    pub fn parent(&self) -> Option<Lineage> {
        self.link
            .parent
            .borrow()
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|link| Lineage { link })
    }

    pub fn set_parent(&self, parent: Option<&Lineage>) {
        *self.link.parent.borrow_mut() = parent.map(|p| Rc::downgrade(&p.link));
    }

    pub fn set_notifier(&self, notifier: Option<Notifier>) {
        *self.link.notifier.borrow_mut() = notifier;
    }

    pub fn has_notifier(&self) -> bool {
        self.link.notifier.borrow().is_some()
    }

    /// Whether both handles refer to the same link.
    pub fn ptr_eq(&self, other: &Lineage) -> bool {
        Rc::ptr_eq(&self.link, &other.link)
    }

    /// Parent, grandparent and so on, at most
    /// [`MAX_ANCESTRY_DEPTH`] of them.
    pub fn ancestors(&self) -> Ancestors {
        Ancestors {
            next: self.parent(),
            remaining: MAX_ANCESTRY_DEPTH,
        }
    }

    /// Calls the nearest notifier, starting with this link itself.
    pub fn trickle_up_change(&self) {
        let listener = std::iter::once(self.clone())
            .chain(self.ancestors())
            .find_map(|l| {
                let notifier = l.link.notifier.borrow().clone();
                notifier
            });

        match listener {
            Some(notify) => notify(),
            None => trace!(kind = ?self.kind(), "change has no listener within reach"),
        }
    }

    /// The nearest ancestor of `kind`.
    pub fn parent_of_type(&self, kind: NodeKind) -> Option<Lineage> {
        let found = self.ancestors().find(|l| l.kind() == kind);
        if found.is_none() {
            debug!(from = ?self.kind(), wanted = ?kind, "no ancestor of the requested kind");
        }
        found
    }
}

impl fmt::Debug for Lineage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lineage")
            .field("kind", &self.kind())
            .field("has_parent", &self.parent().is_some())
            .field("has_notifier", &self.has_notifier())
            .finish()
    }
}

/// See [`Lineage::ancestors`].
pub struct Ancestors {
    next: Option<Lineage>,
    remaining: usize,
}

impl Iterator for Ancestors {
    type Item = Lineage;

    fn next(&mut self) -> Option<Lineage> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}

#[cfg(test)]
mod test {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::{ChangeFlag, Lineage, NodeKind, MAX_ANCESTRY_DEPTH};

    fn chain(depth: usize, top: &Lineage) -> Vec<Lineage> {
        let mut links: Vec<Lineage> = Vec::new();
        for i in 0..depth {
            let link = Lineage::new(NodeKind::Other("level"));
            link.set_parent(Some(if i == 0 { top } else { &links[i - 1] }));
            links.push(link);
        }
        links
    }

    #[test]
    fn change_reaches_the_document() {
        let flag = ChangeFlag::new();
        let eml = Lineage::listening(NodeKind::Eml, flag.notifier());
        let dataset = Lineage::new(NodeKind::Dataset);
        dataset.set_parent(Some(&eml));
        let keywords = Lineage::new(NodeKind::KeywordSet);
        keywords.set_parent(Some(&dataset));

        keywords.trickle_up_change();

        assert!(flag.is_changed());
    }

    #[test]
    fn detached_change_is_a_silent_no_op() {
        let keywords = Lineage::new(NodeKind::KeywordSet);

        keywords.trickle_up_change();

        assert!(keywords.parent().is_none());
    }

    #[test]
    fn the_nearest_listener_wins() {
        let outer = ChangeFlag::new();
        let inner = ChangeFlag::new();
        let eml = Lineage::listening(NodeKind::Eml, outer.notifier());
        let project = Lineage::listening(NodeKind::Project, inner.notifier());
        project.set_parent(Some(&eml));
        let award = Lineage::new(NodeKind::Award);
        award.set_parent(Some(&project));

        award.trickle_up_change();

        assert!(inner.is_changed());
        assert!(!outer.is_changed());
    }

    #[test]
    fn a_listener_beyond_the_depth_cap_is_not_reached() {
        let flag = ChangeFlag::new();
        let eml = Lineage::listening(NodeKind::Eml, flag.notifier());

        let links = chain(MAX_ANCESTRY_DEPTH, &eml);
        links[MAX_ANCESTRY_DEPTH - 1].trickle_up_change();
        assert!(flag.is_changed());

        flag.reset();
        let links = chain(MAX_ANCESTRY_DEPTH + 1, &eml);
        links[MAX_ANCESTRY_DEPTH].trickle_up_change();
        assert!(!flag.is_changed());
    }

    #[test]
    fn dropped_parents_are_forgotten() {
        let keywords = Lineage::new(NodeKind::KeywordSet);
        {
            let dataset = Lineage::new(NodeKind::Dataset);
            keywords.set_parent(Some(&dataset));
            assert!(keywords.parent().is_some());
        }

        assert!(keywords.parent().is_none());
    }

    #[test]
    fn parent_of_type_finds_the_nearest_match() {
        let eml = Lineage::new(NodeKind::Eml);
        let dataset = Lineage::new(NodeKind::Dataset);
        dataset.set_parent(Some(&eml));
        let entity = Lineage::new(NodeKind::OtherEntity);
        entity.set_parent(Some(&dataset));

        let found = entity.parent_of_type(NodeKind::Eml).expect("eml ancestor");
        assert!(found.ptr_eq(&eml));
        assert!(entity.parent_of_type(NodeKind::Project).is_none());
    }

    #[test]
    fn cyclic_wiring_terminates() {
        let a = Lineage::new(NodeKind::Other("a"));
        let b = Lineage::new(NodeKind::Other("b"));
        a.set_parent(Some(&b));
        b.set_parent(Some(&a));

        assert!(a.parent_of_type(NodeKind::Eml).is_none());
        assert_eq!(MAX_ANCESTRY_DEPTH, a.ancestors().count());
        a.trickle_up_change();
    }

    #[test]
    fn notifiers_may_be_arbitrary_closures() {
        let calls = Rc::new(Cell::new(0));
        let counted = calls.clone();
        let eml = Lineage::listening(NodeKind::Eml, Rc::new(move || counted.set(counted.get() + 1)));

        eml.trickle_up_change();
        eml.trickle_up_change();

        assert_eq!(2, calls.get());
    }
}
