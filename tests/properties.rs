use proptest::prelude::*;

use eml_document::eml::{Award, EmlAward, EmlKeywordSet, EmlMissingValueCode, EmlText, KeywordSet, MissingValueCode};

/// Short trimmed text that includes the characters markup has to
/// escape.
fn word() -> impl Strategy<Value = String> {
    "[A-Za-z0-9][A-Za-z0-9 .,:;()&<>\"'-]{0,20}[A-Za-z0-9]"
}

fn words() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(word(), 1..5)
}

proptest! {
    #[test]
    fn keyword_sets_round_trip(keywords in words(), thesaurus in prop::option::of(word())) {
        let attributes = KeywordSet { keywords, thesaurus };
        let mut set = EmlKeywordSet::new(attributes.clone());

        let xml = set.serialize();
        let reparsed = EmlKeywordSet::from_xml(&xml, None).unwrap();
        prop_assert_eq!(&attributes, reparsed.attributes());
        prop_assert_eq!(xml, set.serialize());
    }

    #[test]
    fn text_round_trips(paragraphs in words()) {
        let mut text = EmlText::text("abstract", paragraphs.clone());

        let xml = text.serialize();
        let mut reparsed = EmlText::from_xml(&xml, None).unwrap();
        prop_assert_eq!(&paragraphs[..], reparsed.paragraphs());
        prop_assert_eq!(xml, reparsed.serialize());
    }

    #[test]
    fn awards_round_trip(
        funder_name in prop::option::of(word()),
        funder_identifiers in prop::collection::vec(word(), 0..3),
        award_number in prop::option::of(word()),
        title in prop::option::of(word()),
    ) {
        let attributes = Award { funder_name, funder_identifiers, award_number, title, award_url: None };
        let mut award = EmlAward::new(attributes.clone());

        let xml = award.serialize();
        prop_assume!(!xml.is_empty());
        let reparsed = EmlAward::from_xml(&xml, None).unwrap();
        prop_assert_eq!(&attributes, reparsed.attributes());
    }

    #[test]
    fn missing_value_codes_write_both_halves_or_nothing(code in word(), explanation in prop::option::of(word())) {
        let mut node = EmlMissingValueCode::new(MissingValueCode::new(&code, explanation.as_deref().unwrap_or("")));

        let xml = node.serialize();
        prop_assert_eq!(explanation.is_none(), xml.is_empty());
        prop_assert_eq!(explanation.is_none(), !node.is_valid());
    }
}
