use super::change::NodeKind;
use super::error::ValidationErrors;
use super::extract;
use super::names::{NameEntry, NodeNameMap, EML_VOCABULARY};
use super::node::{Node, ParseContext, Schema, Slot};
use crate::dom::{Document, Element};

pub const NAMES: &[NameEntry] = &[
    ("classificationsystem", "classificationSystem"),
    ("classificationsystemcitation", "classificationSystemCitation"),
    ("classificationsystemmodifications", "classificationSystemModifications"),
    ("commonname", "commonName"),
    ("generaltaxonomiccoverage", "generalTaxonomicCoverage"),
    ("identificationreference", "identificationReference"),
    ("identifiername", "identifierName"),
    ("taxonid", "taxonId"),
    ("taxonomicclassification", "taxonomicClassification"),
    ("taxonomiccompleteness", "taxonomicCompleteness"),
    ("taxonomiccoverage", "taxonomicCoverage"),
    ("taxonomicprocedures", "taxonomicProcedures"),
    ("taxonomicsystem", "taxonomicSystem"),
    ("taxonrankname", "taxonRankName"),
    ("taxonrankvalue", "taxonRankValue"),
];

static TAXON_NAMES: NodeNameMap = NodeNameMap::new(&[NAMES, EML_VOCABULARY]);

/// An identifier of a taxon in some authority's database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxonId {
    pub provider: Option<String>,
    pub value: String,
}

/// One rank of a classification, with the ranks below it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxonomicClassification {
    pub id: Option<String>,
    pub rank_name: String,
    pub rank_value: String,
    pub common_names: Vec<String>,
    pub taxon_ids: Vec<TaxonId>,
    pub children: Vec<TaxonomicClassification>,
}

impl TaxonomicClassification {
    pub fn new(rank_name: &str, rank_value: &str) -> TaxonomicClassification {
        TaxonomicClassification {
            rank_name: rank_name.to_owned(),
            rank_value: rank_value.to_owned(),
            ..TaxonomicClassification::default()
        }
    }

    pub fn with_child(mut self, child: TaxonomicClassification) -> TaxonomicClassification {
        self.children.push(child);
        self
    }

    fn is_complete(&self) -> bool {
        !self.rank_name.trim().is_empty() && !self.rank_value.trim().is_empty()
    }

    /// Complete at every level.
    pub fn is_valid(&self) -> bool {
        self.is_complete() && self.children.iter().all(TaxonomicClassification::is_valid)
    }

    fn parse(element: Element<'_>) -> TaxonomicClassification {
        let node = Some(element);
        let mut common_names = extract::list_text(node, "commonName");
        common_names.retain(|n| !n.is_empty());

        TaxonomicClassification {
            id: extract::attribute_text(node, "id"),
            rank_name: extract::scalar_text(node, "taxonRankName").unwrap_or_default(),
            rank_value: extract::scalar_text(node, "taxonRankValue").unwrap_or_default(),
            common_names,
            taxon_ids: extract::children(node, "taxonId")
                .into_iter()
                .map(|e| TaxonId {
                    provider: extract::attribute_text(Some(e), "provider"),
                    value: e.text_content().trim().to_owned(),
                })
                .collect(),
            children: extract::children(node, "taxonomicClassification")
                .into_iter()
                .map(TaxonomicClassification::parse)
                .collect(),
        }
    }

    /// `None` for an incomplete classification; its children go with it.
    fn to_element<'d>(&self, doc: Document<'d>) -> Option<Element<'d>> {
        if !self.is_complete() {
            return None;
        }

        let leaf = |name: &str, value: &str| {
            let e = doc.create_element(name);
            e.set_text(value.trim());
            e
        };

        let element = doc.create_element("taxonomicClassification");
        if let Some(id) = self.id.as_deref().filter(|id| !id.trim().is_empty()) {
            element.set_attribute_value("id", id.trim());
        }
        element.append_child(leaf("taxonRankName", &self.rank_name));
        element.append_child(leaf("taxonRankValue", &self.rank_value));
        for name in &self.common_names {
            element.append_child(leaf("commonName", name));
        }
        for taxon_id in &self.taxon_ids {
            let e = leaf("taxonId", &taxon_id.value);
            if let Some(ref provider) = taxon_id.provider {
                e.set_attribute_value("provider", provider);
            }
            element.append_child(e);
        }
        element.append_children(self.children.iter().filter_map(|c| c.to_element(doc)));

        Some(element)
    }
}

/// `<taxonomicCoverage>`: a free-text summary and a tree of
/// classifications.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaxonCoverage {
    pub general_taxonomic_coverage: Option<String>,
    pub classifications: Vec<TaxonomicClassification>,
}

pub type EmlTaxonCoverage = Node<TaxonCoverage>;

impl Schema for TaxonCoverage {
    const KIND: NodeKind = NodeKind::TaxonCoverage;
    const ROOT: &'static str = "taxonomicCoverage";

    fn names() -> &'static NodeNameMap {
        &TAXON_NAMES
    }

    fn node_order() -> &'static [&'static str] {
        &["generalTaxonomicCoverage", "taxonomicClassification"]
    }

    fn schema_order() -> &'static [&'static str] {
        &["taxonomicSystem", "generalTaxonomicCoverage", "taxonomicClassification"]
    }

    fn parse(element: Element<'_>, _cx: &ParseContext<'_>) -> TaxonCoverage {
        TaxonCoverage {
            general_taxonomic_coverage: extract::non_empty_text(Some(element), "generalTaxonomicCoverage"),
            classifications: extract::children(Some(element), "taxonomicClassification")
                .into_iter()
                .map(TaxonomicClassification::parse)
                .collect(),
        }
    }

    fn inject<'d>(&self, slot: &Slot<'_, 'd>) -> Option<Vec<Element<'d>>> {
        match slot.name() {
            "generalTaxonomicCoverage" => Some(slot.optional(self.general_taxonomic_coverage.as_deref())),
            "taxonomicClassification" => Some(
                self.classifications
                    .iter()
                    .filter_map(|c| c.to_element(slot.document()))
                    .collect(),
            ),
            _ => None,
        }
    }

    fn is_empty(&self) -> bool {
        self.general_taxonomic_coverage.is_none() && self.classifications.is_empty()
    }

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if self.classifications.is_empty() {
            if self.general_taxonomic_coverage.is_some() {
                errors.add(
                    "taxonomicClassification",
                    "Provide at least one complete taxonomic classification.",
                );
            }
        } else if !self.classifications.iter().all(TaxonomicClassification::is_valid) {
            errors.add(
                "taxonomicClassification",
                "Every classification row should have a rank and value.",
            );
        }
        errors
    }
}

impl Node<TaxonCoverage> {
    pub fn add_classification(&mut self, classification: TaxonomicClassification) {
        self.update(|c| c.classifications.push(classification));
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::eml::node::verify;

    #[test]
    fn schema_is_consistent() {
        assert_eq!(Ok(()), verify::<TaxonCoverage>());
    }

    #[test]
    fn parses_a_nested_classification() {
        let coverage = EmlTaxonCoverage::from_xml(
            "<taxonomicCoverage><generalTaxonomicCoverage>Trees</generalTaxonomicCoverage><taxonomicClassification id='k'><taxonRankName>Kingdom</taxonRankName><taxonRankValue>Plantae</taxonRankValue><commonName>plants</commonName><taxonId provider='https://www.itis.gov'>202422</taxonId><taxonomicClassification><taxonRankName>Genus</taxonRankName><taxonRankValue>Quercus</taxonRankValue></taxonomicClassification></taxonomicClassification></taxonomicCoverage>",
            None,
        )
        .unwrap();

        let mut kingdom = TaxonomicClassification::new("Kingdom", "Plantae")
            .with_child(TaxonomicClassification::new("Genus", "Quercus"));
        kingdom.id = Some("k".into());
        kingdom.common_names = vec!["plants".into()];
        kingdom.taxon_ids = vec![TaxonId {
            provider: Some("https://www.itis.gov".into()),
            value: "202422".into(),
        }];

        assert_eq!(
            &TaxonCoverage {
                general_taxonomic_coverage: Some("Trees".into()),
                classifications: vec![kingdom],
            },
            coverage.attributes()
        );
    }

    #[test]
    fn writes_classifications_in_schema_order() {
        let mut coverage = EmlTaxonCoverage::new(TaxonCoverage {
            general_taxonomic_coverage: Some("Oaks".into()),
            classifications: vec![TaxonomicClassification::new("Genus", "Quercus")],
        });

        assert_eq!(
            "<taxonomicCoverage><generalTaxonomicCoverage>Oaks</generalTaxonomicCoverage><taxonomicClassification><taxonRankName>Genus</taxonRankName><taxonRankValue>Quercus</taxonRankValue></taxonomicClassification></taxonomicCoverage>",
            coverage.serialize()
        );
    }

    #[test]
    fn incomplete_classifications_are_skipped_and_invalid() {
        let mut coverage = EmlTaxonCoverage::new(TaxonCoverage::default());
        coverage.add_classification(
            TaxonomicClassification::new("Genus", "Quercus").with_child(TaxonomicClassification::new("Species", "")),
        );
        coverage.add_classification(TaxonomicClassification::new("", "Pinus"));

        assert_eq!(
            "<taxonomicCoverage><taxonomicClassification><taxonRankName>Genus</taxonRankName><taxonRankValue>Quercus</taxonRankValue></taxonomicClassification></taxonomicCoverage>",
            coverage.serialize()
        );
        assert_eq!(
            Some("Every classification row should have a rank and value."),
            coverage.validate().get("taxonomicClassification")
        );
    }

    #[test]
    fn a_summary_needs_a_classification() {
        let coverage = EmlTaxonCoverage::new(TaxonCoverage {
            general_taxonomic_coverage: Some("Trees".into()),
            classifications: vec![],
        });

        assert!(!coverage.is_valid());
    }

    #[test]
    fn the_taxonomic_system_is_kept() {
        let mut coverage = EmlTaxonCoverage::from_xml(
            "<taxonomiccoverage><taxonomicsystem><classificationsystem><classificationsystemcitation><title>ITIS</title></classificationsystemcitation></classificationsystem></taxonomicsystem></taxonomiccoverage>",
            None,
        )
        .unwrap();
        coverage.add_classification(TaxonomicClassification::new("Genus", "Acer"));

        assert_eq!(
            "<taxonomicCoverage><taxonomicSystem><classificationSystem><classificationSystemCitation><title>ITIS</title></classificationSystemCitation></classificationSystem></taxonomicSystem><taxonomicClassification><taxonRankName>Genus</taxonRankName><taxonRankValue>Acer</taxonRankValue></taxonomicClassification></taxonomicCoverage>",
            coverage.serialize()
        );
    }
}
