//! Interned storage for every name and text value in a package.
//!
//! Strings are copied into a byte arena once and handed out as
//! `InternedString`s. Nothing is ever removed, so an interned string
//! lives as long as the pool that created it.

use std::borrow::Borrow;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::hash;

use typed_arena::Arena;

#[derive(Copy, Clone)]
pub struct InternedString {
    data: *const str,
}

impl InternedString {
    fn from_static(s: &'static str) -> InternedString {
        InternedString { data: s }
    }

    /// The returned slice is only valid while the owning pool is
    /// alive. Callers tie it to the lifetime of the package.
    pub fn as_slice<'s>(&self) -> &'s str {
        unsafe { &*self.data }
    }
}

impl PartialEq for InternedString {
    fn eq(&self, other: &InternedString) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for InternedString {}

impl hash::Hash for InternedString {
    fn hash<H>(&self, state: &mut H)
    where
        H: hash::Hasher,
    {
        self.as_slice().hash(state)
    }
}

impl Borrow<str> for InternedString {
    fn borrow(&self) -> &str {
        self.as_slice()
    }
}

impl fmt::Debug for InternedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_slice())
    }
}

pub struct StringPool {
    arena: Arena<u8>,
    index: RefCell<HashSet<InternedString>>,
}

impl StringPool {
    pub fn new() -> StringPool {
        StringPool {
            arena: Arena::new(),
            index: RefCell::new(HashSet::new()),
        }
    }

    pub fn intern(&self, s: &str) -> InternedString {
        if s.is_empty() {
            return InternedString::from_static("");
        }

        let mut index = self.index.borrow_mut();
        if let Some(existing) = index.get(s) {
            return *existing;
        }

        let stored: &mut str = self.arena.alloc_str(s);
        let interned = InternedString { data: stored as *const str };
        index.insert(interned);
        interned
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.index.borrow().len()
    }
}

impl Default for StringPool {
    fn default() -> StringPool {
        StringPool::new()
    }
}

#[cfg(test)]
mod test {
    use super::StringPool;

    #[test]
    fn keeps_the_same_string() {
        let pool = StringPool::new();

        let interned = pool.intern("keywordSet");

        assert_eq!(interned.as_slice(), "keywordSet");
    }

    #[test]
    fn reuses_the_pointer_for_repeated_input() {
        let pool = StringPool::new();

        let a = pool.intern("para");
        let b = pool.intern("para");

        assert_eq!(a.as_slice().as_ptr(), b.as_slice().as_ptr());
        assert_eq!(1, pool.len());
    }

    #[test]
    fn distinguishes_case() {
        let pool = StringPool::new();

        let lower = pool.intern("keyword");
        let upper = pool.intern("Keyword");

        assert_ne!(lower.as_slice(), upper.as_slice());
        assert_eq!(2, pool.len());
    }

    #[test]
    fn ignores_the_lifetime_of_the_input_string() {
        let pool = StringPool::new();

        let interned = {
            let input = String::from("calendarDate");
            pool.intern(&input)
        };

        assert_eq!(interned.as_slice(), "calendarDate");
    }

    #[test]
    fn the_empty_string_is_not_stored() {
        let pool = StringPool::new();

        assert_eq!(pool.intern("").as_slice(), "");
        assert_eq!(0, pool.len());
    }
}
