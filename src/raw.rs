use std::cmp;

use typed_arena::Arena;

use crate::string_pool::{InternedString, StringPool};

pub struct Root {
    children: Vec<ChildOfRoot>,
}

pub struct Element {
    name: InternedString,
    children: Vec<ChildOfElement>,
    parent: Option<ParentOfChild>,
    attributes: Vec<*mut Attribute>,
}

impl Element {
    pub fn name(&self) -> &str {
        self.name.as_slice()
    }
}

pub struct Attribute {
    name: InternedString,
    value: InternedString,
    parent: Option<*mut Element>,
}

impl Attribute {
    pub fn name(&self) -> &str {
        self.name.as_slice()
    }
    pub fn value(&self) -> &str {
        self.value.as_slice()
    }
}

pub struct Text {
    text: InternedString,
    parent: Option<*mut Element>,
}

impl Text {
    pub fn text(&self) -> &str {
        self.text.as_slice()
    }
}

pub struct Comment {
    text: InternedString,
    parent: Option<ParentOfChild>,
}

impl Comment {
    pub fn text(&self) -> &str {
        self.text.as_slice()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ChildOfRoot {
    Element(*mut Element),
    Comment(*mut Comment),
}

impl ChildOfRoot {
    fn is_element(&self) -> bool {
        matches!(self, ChildOfRoot::Element(_))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ChildOfElement {
    Element(*mut Element),
    Text(*mut Text),
    Comment(*mut Comment),
}

impl From<ChildOfRoot> for ChildOfElement {
    fn from(c: ChildOfRoot) -> ChildOfElement {
        match c {
            ChildOfRoot::Element(n) => ChildOfElement::Element(n),
            ChildOfRoot::Comment(n) => ChildOfElement::Comment(n),
        }
    }
}

impl ChildOfElement {
    fn parent(&self) -> Option<ParentOfChild> {
        unsafe {
            match *self {
                ChildOfElement::Element(n) => (*n).parent,
                ChildOfElement::Text(n) => (*n).parent.map(ParentOfChild::Element),
                ChildOfElement::Comment(n) => (*n).parent,
            }
        }
    }

    fn set_parent(&self, parent: Option<ParentOfChild>) {
        unsafe {
            match *self {
                ChildOfElement::Element(n) => (*n).parent = parent,
                ChildOfElement::Text(n) => {
                    (*n).parent = parent.and_then(|p| match p {
                        ParentOfChild::Element(e) => Some(e),
                        ParentOfChild::Root(_) => None,
                    })
                }
                ChildOfElement::Comment(n) => (*n).parent = parent,
            }
        }
    }

    /// Removes the node from whatever currently contains it.
    fn detach(&self) {
        if let Some(parent) = self.parent() {
            match parent {
                ParentOfChild::Root(r) => {
                    let r_r = unsafe { &mut *r };
                    r_r.children.retain(|c| ChildOfElement::from(*c) != *self);
                }
                ParentOfChild::Element(e) => {
                    let e_r = unsafe { &mut *e };
                    e_r.children.retain(|c| c != self);
                }
            }
        }
        self.set_parent(None);
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ParentOfChild {
    Root(*mut Root),
    Element(*mut Element),
}

pub struct Storage {
    strings: StringPool,
    roots: Arena<Root>,
    elements: Arena<Element>,
    attributes: Arena<Attribute>,
    texts: Arena<Text>,
    comments: Arena<Comment>,
}

impl Storage {
    pub fn new() -> Storage {
        Storage {
            strings: StringPool::new(),
            roots: Arena::new(),
            elements: Arena::new(),
            attributes: Arena::new(),
            texts: Arena::new(),
            comments: Arena::new(),
        }
    }

    fn intern(&self, s: &str) -> InternedString {
        self.strings.intern(s)
    }

    pub fn create_root(&self) -> *mut Root {
        self.roots.alloc(Root { children: Vec::new() }) as *mut Root
    }

    pub fn create_element(&self, name: &str) -> *mut Element {
        let name = self.intern(name);
        self.elements.alloc(Element {
            name,
            children: Vec::new(),
            parent: None,
            attributes: Vec::new(),
        }) as *mut Element
    }

    pub fn create_attribute(&self, name: &str, value: &str) -> *mut Attribute {
        let name = self.intern(name);
        let value = self.intern(value);
        self.attributes.alloc(Attribute {
            name,
            value,
            parent: None,
        }) as *mut Attribute
    }

    pub fn create_text(&self, text: &str) -> *mut Text {
        let text = self.intern(text);
        self.texts.alloc(Text { text, parent: None }) as *mut Text
    }

    pub fn create_comment(&self, text: &str) -> *mut Comment {
        let text = self.intern(text);
        self.comments.alloc(Comment { text, parent: None }) as *mut Comment
    }

    pub fn element_set_name(&self, element: *mut Element, name: &str) {
        let name = self.intern(name);
        let element_r = unsafe { &mut *element };
        element_r.name = name;
    }

    pub fn text_set_text(&self, text: *mut Text, new_text: &str) {
        let new_text = self.intern(new_text);
        let text_r = unsafe { &mut *text };
        text_r.text = new_text;
    }

    pub fn comment_set_text(&self, comment: *mut Comment, new_text: &str) {
        let new_text = self.intern(new_text);
        let comment_r = unsafe { &mut *comment };
        comment_r.text = new_text;
    }
}

impl Default for Storage {
    fn default() -> Storage {
        Storage::new()
    }
}

pub struct Connections {
    root: *mut Root,
}

impl Connections {
    pub fn new(root: *mut Root) -> Connections {
        Connections { root }
    }

    pub fn root(&self) -> *mut Root {
        self.root
    }

    pub fn element_parent(&self, child: *mut Element) -> Option<ParentOfChild> {
        let child_r = unsafe { &*child };
        child_r.parent
    }

    pub fn text_parent(&self, child: *mut Text) -> Option<*mut Element> {
        let child_r = unsafe { &*child };
        child_r.parent
    }

    pub fn comment_parent(&self, child: *mut Comment) -> Option<ParentOfChild> {
        let child_r = unsafe { &*child };
        child_r.parent
    }

    pub fn attribute_parent(&self, attribute: *mut Attribute) -> Option<*mut Element> {
        let attr_r = unsafe { &*attribute };
        attr_r.parent
    }

    pub fn append_root_child(&self, child: ChildOfRoot) {
        ChildOfElement::from(child).detach();

        let root_r = unsafe { &mut *self.root };
        if child.is_element() {
            for previous in root_r.children.iter().filter(|c| c.is_element()) {
                ChildOfElement::from(*previous).set_parent(None);
            }
            root_r.children.retain(|c| !c.is_element());
        }
        root_r.children.push(child);
        ChildOfElement::from(child).set_parent(Some(ParentOfChild::Root(self.root)));
    }

    pub fn remove_root_child(&self, child: ChildOfRoot) {
        let root_r = unsafe { &*self.root };
        if root_r.children.contains(&child) {
            ChildOfElement::from(child).detach();
        }
    }

    pub fn clear_root_children(&self) {
        let root_r = unsafe { &mut *self.root };
        for c in root_r.children.drain(..) {
            ChildOfElement::from(c).set_parent(None);
        }
    }

    /// The caller must not keep the slice across a mutation of the root.
    pub unsafe fn root_children(&self) -> &[ChildOfRoot] {
        let root_r = &*self.root;
        &root_r.children
    }

    pub fn append_element_child(&self, parent: *mut Element, child: ChildOfElement) {
        child.detach();
        let parent_r = unsafe { &mut *parent };
        parent_r.children.push(child);
        child.set_parent(Some(ParentOfChild::Element(parent)));
    }

    /// `index` counts positions after the child has been removed from
    /// its previous location and is clamped to the number of children.
    pub fn insert_element_child(&self, parent: *mut Element, index: usize, child: ChildOfElement) {
        child.detach();
        let parent_r = unsafe { &mut *parent };
        let index = cmp::min(index, parent_r.children.len());
        parent_r.children.insert(index, child);
        child.set_parent(Some(ParentOfChild::Element(parent)));
    }

    pub fn remove_element_child(&self, parent: *mut Element, child: ChildOfElement) {
        if child.parent() == Some(ParentOfChild::Element(parent)) {
            child.detach();
        }
    }

    pub fn clear_element_children(&self, parent: *mut Element) {
        let parent_r = unsafe { &mut *parent };
        for c in parent_r.children.drain(..) {
            c.set_parent(None);
        }
    }

    /// The caller must not keep the slice across a mutation of `parent`.
    pub unsafe fn element_children(&self, parent: *mut Element) -> &[ChildOfElement] {
        let parent_r = &*parent;
        &parent_r.children
    }

    pub fn remove_element_from_parent(&self, child: *mut Element) {
        ChildOfElement::Element(child).detach();
    }

    pub fn remove_text_from_parent(&self, child: *mut Text) {
        ChildOfElement::Text(child).detach();
    }

    pub fn remove_comment_from_parent(&self, child: *mut Comment) {
        ChildOfElement::Comment(child).detach();
    }

    /// The caller must not keep the slice across a mutation of `parent`.
    pub unsafe fn attributes(&self, parent: *mut Element) -> &[*mut Attribute] {
        let parent_r = &*parent;
        &parent_r.attributes
    }

    pub fn attribute(&self, element: *mut Element, name: &str) -> Option<*mut Attribute> {
        let element_r = unsafe { &*element };
        element_r
            .attributes
            .iter()
            .find(|a| unsafe { (***a).name() } == name)
            .copied()
    }

    /// Replaces an attribute of the same name in place, otherwise
    /// appends.
    pub fn set_attribute(&self, parent: *mut Element, attribute: *mut Attribute) {
        let parent_r = unsafe { &mut *parent };
        let attr_r = unsafe { &mut *attribute };

        if let Some(previous) = attr_r.parent {
            if previous != parent {
                let previous_r = unsafe { &mut *previous };
                previous_r.attributes.retain(|a| *a != attribute);
            }
        }

        let name = attr_r.name;
        let existing = parent_r
            .attributes
            .iter()
            .position(|a| unsafe { (**a).name } == name);

        match existing {
            Some(index) => {
                let replaced = parent_r.attributes[index];
                if replaced != attribute {
                    unsafe { (*replaced).parent = None };
                }
                parent_r.attributes[index] = attribute;
            }
            None => parent_r.attributes.push(attribute),
        }

        attr_r.parent = Some(parent);
    }

    pub fn remove_attribute(&self, element: *mut Element, name: &str) {
        let element_r = unsafe { &mut *element };
        element_r.attributes.retain(|a| {
            let a_r = unsafe { &mut **a };
            if a_r.name() == name {
                a_r.parent = None;
                false
            } else {
                true
            }
        });
    }

    pub fn remove_attribute_from_parent(&self, attribute: *mut Attribute) {
        let attr_r = unsafe { &mut *attribute };
        if let Some(parent) = attr_r.parent {
            let parent_r = unsafe { &mut *parent };
            parent_r.attributes.retain(|a| *a != attribute);
        }
        attr_r.parent = None;
    }
}
