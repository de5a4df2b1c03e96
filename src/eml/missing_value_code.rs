use super::change::NodeKind;
use super::error::ValidationErrors;
use super::extract;
use super::names::{NameEntry, NodeNameMap, EML_VOCABULARY};
use super::node::{Node, ParseContext, Schema, Slot};
use crate::dom::Element;

pub const NAMES: &[NameEntry] = &[("missingvaluecode", "missingValueCode"), ("codeexplanation", "codeExplanation")];

static MISSING_VALUE_NAMES: NodeNameMap = NodeNameMap::new(&[NAMES, EML_VOCABULARY]);

/// A code standing in for a missing value in a data column, and what
/// it means. The two only make sense together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MissingValueCode {
    pub code: String,
    pub code_explanation: String,
}

pub type EmlMissingValueCode = Node<MissingValueCode>;

impl MissingValueCode {
    pub fn new(code: &str, code_explanation: &str) -> MissingValueCode {
        MissingValueCode {
            code: code.to_owned(),
            code_explanation: code_explanation.to_owned(),
        }
    }

    fn is_complete(&self) -> bool {
        !self.code.trim().is_empty() && !self.code_explanation.trim().is_empty()
    }
}

impl Schema for MissingValueCode {
    const KIND: NodeKind = NodeKind::MissingValueCode;
    const ROOT: &'static str = "missingValueCode";

    fn names() -> &'static NodeNameMap {
        &MISSING_VALUE_NAMES
    }

    fn node_order() -> &'static [&'static str] {
        &["code", "codeExplanation"]
    }

    fn parse(element: Element<'_>, _cx: &ParseContext<'_>) -> MissingValueCode {
        MissingValueCode {
            code: extract::scalar_text(Some(element), "code").unwrap_or_default(),
            code_explanation: extract::scalar_text(Some(element), "codeExplanation").unwrap_or_default(),
        }
    }

    fn inject<'d>(&self, slot: &Slot<'_, 'd>) -> Option<Vec<Element<'d>>> {
        match slot.name() {
            "code" => Some(slot.leaves(Some(&self.code))),
            "codeExplanation" => Some(slot.leaves(Some(&self.code_explanation))),
            _ => None,
        }
    }

    fn is_empty(&self) -> bool {
        self.code.trim().is_empty() && self.code_explanation.trim().is_empty()
    }

    fn emits_output(&self) -> bool {
        self.is_complete()
    }

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if !self.is_empty() && !self.is_complete() {
            errors.add("missingValueCode", "Missing value code and explanation are required.");
        }
        errors
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{EmlMissingValueCode, MissingValueCode};
    use crate::eml::node::verify;

    #[test]
    fn schema_is_consistent() {
        assert_eq!(Ok(()), verify::<MissingValueCode>());
    }

    #[test]
    fn writes_both_halves() {
        let mut code = EmlMissingValueCode::new(MissingValueCode::new(" NA ", "Not available"));

        assert_eq!(
            "<missingValueCode><code>NA</code><codeExplanation>Not available</codeExplanation></missingValueCode>",
            code.serialize()
        );
    }

    #[test]
    fn a_code_without_explanation_is_invalid_and_not_written() {
        let code = EmlMissingValueCode::new(MissingValueCode::new("NA", ""));

        let errors = code.validate();
        assert_eq!(1, errors.len());
        assert_eq!(
            Some("Missing value code and explanation are required."),
            errors.get("missingValueCode")
        );
        assert!(code.update_dom().is_none());
        assert!(!code.is_empty());
    }

    #[test]
    fn an_empty_code_is_valid() {
        let code = EmlMissingValueCode::default();

        assert!(code.is_empty());
        assert!(code.is_valid());
    }

    #[test]
    fn parses_from_lower_cased_markup() {
        let code = EmlMissingValueCode::from_xml(
            "<missingvaluecode><code>-999</code><codeexplanation>Sensor offline</codeexplanation></missingvaluecode>",
            None,
        )
        .unwrap();

        assert_eq!(&MissingValueCode::new("-999", "Sensor offline"), code.attributes());
        assert_eq!("missingValueCode", code.tag());
    }
}
