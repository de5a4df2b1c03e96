use super::change::NodeKind;
use super::error::ValidationErrors;
use super::extract;
use super::names::{NameEntry, NodeNameMap, EML_VOCABULARY};
use super::node::{Node, ParseContext, Schema, Slot};
use crate::dom::Element;

pub const NAMES: &[NameEntry] = &[("keywordset", "keywordSet"), ("keywordthesaurus", "keywordThesaurus")];

static KEYWORD_SET_NAMES: NodeNameMap = NodeNameMap::new(&[NAMES, EML_VOCABULARY]);

/// A `<keywordSet>`: keywords, optionally from one thesaurus.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordSet {
    pub keywords: Vec<String>,
    pub thesaurus: Option<String>,
}

pub type EmlKeywordSet = Node<KeywordSet>;

impl Schema for KeywordSet {
    const KIND: NodeKind = NodeKind::KeywordSet;
    const ROOT: &'static str = "keywordSet";

    fn names() -> &'static NodeNameMap {
        &KEYWORD_SET_NAMES
    }

    fn node_order() -> &'static [&'static str] {
        &["keyword", "keywordThesaurus"]
    }

    fn parse(element: Element<'_>, _cx: &ParseContext<'_>) -> KeywordSet {
        let mut keywords = extract::list_text(Some(element), "keyword");
        keywords.retain(|k| !k.is_empty());

        KeywordSet {
            keywords,
            thesaurus: extract::non_empty_text(Some(element), "keywordThesaurus"),
        }
    }

    fn inject<'d>(&self, slot: &Slot<'_, 'd>) -> Option<Vec<Element<'d>>> {
        match slot.name() {
            "keyword" => Some(slot.leaves(&self.keywords)),
            "keywordThesaurus" => Some(slot.optional(self.thesaurus.as_deref())),
            _ => None,
        }
    }

    fn is_empty(&self) -> bool {
        self.keywords.iter().all(|k| k.trim().is_empty())
    }

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if self.thesaurus.is_some() && self.is_empty() {
            errors.add("keywords", "Provide at least one keyword.");
        }
        errors
    }
}

impl Node<KeywordSet> {
    pub fn keywords(&self) -> &[String] {
        &self.attributes().keywords
    }

    pub fn thesaurus(&self) -> Option<&str> {
        self.attributes().thesaurus.as_deref()
    }

    pub fn add_keyword(&mut self, keyword: &str) {
        let keyword = keyword.trim().to_owned();
        self.update(|set| set.keywords.push(keyword));
    }

    /// Removes every occurrence of `keyword`. Returns whether there
    /// was one.
    pub fn remove_keyword(&mut self, keyword: &str) -> bool {
        if !self.keywords().iter().any(|k| k == keyword) {
            return false;
        }
        self.update(|set| set.keywords.retain(|k| k != keyword));
        true
    }

    pub fn set_thesaurus(&mut self, thesaurus: Option<&str>) {
        let thesaurus = thesaurus.map(str::trim).filter(|t| !t.is_empty()).map(str::to_owned);
        self.update(|set| set.thesaurus = thesaurus);
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{EmlKeywordSet, KeywordSet};
    use crate::eml::change::{ChangeFlag, Lineage, NodeKind};
    use crate::eml::node::{verify, NodeState};

    const LTER: &str = "<keywordSet><keyword>soil</keyword><keyword>carbon</keyword><keywordThesaurus>LTER</keywordThesaurus></keywordSet>";

    #[test]
    fn schema_is_consistent() {
        assert_eq!(Ok(()), verify::<KeywordSet>());
    }

    #[test]
    fn parses_keywords_and_thesaurus() {
        let set = EmlKeywordSet::from_xml(LTER, None).unwrap();

        assert_eq!(&["soil", "carbon"], set.keywords());
        assert_eq!(Some("LTER"), set.thesaurus());
    }

    #[test]
    fn reserializes_in_order() {
        let mut set = EmlKeywordSet::from_xml(LTER, None).unwrap();

        assert_eq!(LTER, set.serialize());
    }

    #[test]
    fn the_thesaurus_follows_new_keywords() {
        let mut set = EmlKeywordSet::from_xml(LTER, None).unwrap();
        set.add_keyword(" nitrogen ");

        assert_eq!(
            "<keywordSet><keyword>soil</keyword><keyword>carbon</keyword><keyword>nitrogen</keyword><keywordThesaurus>LTER</keywordThesaurus></keywordSet>",
            set.serialize()
        );
    }

    #[test]
    fn a_set_without_keywords_is_empty() {
        let mut set = EmlKeywordSet::new(KeywordSet {
            keywords: vec![],
            thesaurus: Some("LTER".into()),
        });

        assert!(set.is_empty());
        assert_eq!("", set.serialize());
        assert_eq!(Some("Provide at least one keyword."), set.validate().get("keywords"));
    }

    #[test]
    fn a_set_emptied_after_parsing_starts_over() {
        let mut set = EmlKeywordSet::from_xml("<keywordSet id='k1'><keyword>soil</keyword><keywordThesaurus>LTER</keywordThesaurus></keywordSet>", None).unwrap();
        assert!(set.remove_keyword("soil"));

        assert_eq!("", set.serialize());
        assert_eq!(NodeState::Fresh, set.state());
        assert!(set.source().is_none());

        set.add_keyword("water");
        assert_eq!(
            "<keywordSet><keyword>water</keyword><keywordThesaurus>LTER</keywordThesaurus></keywordSet>",
            set.serialize()
        );
        assert_eq!(NodeState::Hydrated, set.state());
    }

    #[test]
    fn removing_the_thesaurus_removes_its_element() {
        let mut set = EmlKeywordSet::from_xml(LTER, None).unwrap();
        set.set_thesaurus(Some("  "));

        assert_eq!("<keywordSet><keyword>soil</keyword><keyword>carbon</keyword></keywordSet>", set.serialize());
    }

    #[test]
    fn removing_a_missing_keyword_changes_nothing() {
        let flag = ChangeFlag::new();
        let eml = Lineage::listening(NodeKind::Eml, flag.notifier());
        let mut set = EmlKeywordSet::from_xml(LTER, Some(&eml)).unwrap();

        assert!(!set.remove_keyword("water"));
        assert!(!flag.is_changed());

        assert!(set.remove_keyword("soil"));
        assert!(flag.is_changed());
        assert_eq!(&["carbon"], set.keywords());
    }

    #[test]
    fn foreign_attributes_on_the_root_survive() {
        let mut set = EmlKeywordSet::from_xml("<keywordSet id='k1'><keyword>soil</keyword></keywordSet>", None).unwrap();
        set.add_keyword("water");

        assert_eq!(
            r#"<keywordSet id="k1"><keyword>soil</keyword><keyword>water</keyword></keywordSet>"#,
            set.serialize()
        );
    }
}
