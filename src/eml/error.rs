use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use super::change::NodeKind;
use crate::parser;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("unable to parse the EML fragment: {0}")]
    Parse(#[from] parser::Error),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// A node type whose configuration contradicts itself. These are
/// programming errors, not data errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("{kind:?} orders `{slot}` but has no rule to write it")]
    MissingInjection { kind: NodeKind, slot: String },
    #[error("{kind:?} writes `{name}`, which its name map spells `{canonical}`")]
    UncanonicalName {
        kind: NodeKind,
        name: String,
        canonical: String,
    },
    #[error("{kind:?} writes `{name}`, which its name map cannot restore from lower case")]
    UnmappedName { kind: NodeKind, name: String },
    #[error("{kind:?} output changes when read back in lower case:\n{expected}\n{actual}")]
    CaseUnstable {
        kind: NodeKind,
        expected: String,
        actual: String,
    },
}

/// Field-keyed problems found by a node's `validate`. An empty set
/// means the node is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    pub fn new() -> ValidationErrors {
        ValidationErrors::default()
    }

    /// Records a problem for `field`. The first message for a field
    /// is kept.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    /// Records a problem for `field`, replacing any earlier one.
    pub fn set(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.insert(field, message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.fields.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Folds a nested node's problems in under `field`.
    pub fn absorb(&mut self, field: &'static str, nested: &ValidationErrors) {
        if let Some((_, message)) = nested.iter().next() {
            self.add(field, message);
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::ValidationErrors;

    #[test]
    fn keeps_the_first_message_per_field() {
        let mut errors = ValidationErrors::new();
        errors.add("beginDate", "Provide a begin date.");
        errors.add("beginDate", "ignored");

        assert_eq!(Some("Provide a begin date."), errors.get("beginDate"));
        assert_eq!(1, errors.len());
    }

    #[test]
    fn displays_fields_in_order() {
        let mut errors = ValidationErrors::new();
        errors.add("north", "n");
        errors.add("east", "e");

        assert_eq!("east: e; north: n", errors.to_string());
    }
}
