//! `<project>` and the `<award>`s that funded it.

use super::change::NodeKind;
use super::error::ValidationErrors;
use super::extract;
use super::names::{NameEntry, NodeNameMap, EML_VOCABULARY};
use super::node::{rewrite, Node, ParseContext, Schema, Slot};
use super::text;
use crate::dom::Element;

pub const NAMES: &[NameEntry] = &[
    ("descriptorvalue", "descriptorValue"),
    ("relatedproject", "relatedProject"),
    ("researchproject", "researchProject"),
];

pub const AWARD_NAMES: &[NameEntry] = &[
    ("awardnumber", "awardNumber"),
    ("awardurl", "awardUrl"),
    ("funderidentifier", "funderIdentifier"),
    ("fundername", "funderName"),
];

static PROJECT_NAMES: NodeNameMap = NodeNameMap::new(&[NAMES, AWARD_NAMES, text::NAMES, EML_VOCABULARY]);
static AWARD_NAME_MAP: NodeNameMap = NodeNameMap::new(&[AWARD_NAMES, EML_VOCABULARY]);

/// One grant, as written in an `<award>`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Award {
    pub funder_name: Option<String>,
    pub funder_identifiers: Vec<String>,
    pub award_number: Option<String>,
    pub title: Option<String>,
    pub award_url: Option<String>,
}

pub type EmlAward = Node<Award>;

impl Schema for Award {
    const KIND: NodeKind = NodeKind::Award;
    const ROOT: &'static str = "award";

    fn names() -> &'static NodeNameMap {
        &AWARD_NAME_MAP
    }

    fn node_order() -> &'static [&'static str] {
        &["funderName", "funderIdentifier", "awardNumber", "title", "awardUrl"]
    }

    fn parse(element: Element<'_>, _cx: &ParseContext<'_>) -> Award {
        let node = Some(element);
        let mut funder_identifiers = extract::list_text(node, "funderIdentifier");
        funder_identifiers.retain(|id| !id.is_empty());

        Award {
            funder_name: extract::non_empty_text(node, "funderName"),
            funder_identifiers,
            award_number: extract::non_empty_text(node, "awardNumber"),
            title: extract::non_empty_text(node, "title"),
            award_url: extract::non_empty_text(node, "awardUrl"),
        }
    }

    fn inject<'d>(&self, slot: &Slot<'_, 'd>) -> Option<Vec<Element<'d>>> {
        match slot.name() {
            "funderName" => Some(slot.optional(self.funder_name.as_deref())),
            "funderIdentifier" => Some(slot.leaves(&self.funder_identifiers)),
            "awardNumber" => Some(slot.optional(self.award_number.as_deref())),
            "title" => Some(slot.optional(self.title.as_deref())),
            "awardUrl" => Some(slot.optional(self.award_url.as_deref())),
            _ => None,
        }
    }

    fn is_empty(&self) -> bool {
        self.funder_name.is_none()
            && self.funder_identifiers.iter().all(|id| id.trim().is_empty())
            && self.award_number.is_none()
            && self.title.is_none()
            && self.award_url.is_none()
    }

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if !self.is_empty() {
            if self.funder_name.is_none() {
                errors.add("funderName", "Provide the name of the funding organization.");
            }
            if self.title.is_none() {
                errors.add("title", "Provide the title of the award.");
            }
        }
        errors
    }
}

/// A `<project>`. Personnel, abstract and the other parts that are not
/// modelled here are carried through unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Project {
    pub title: Option<String>,
    pub funding: Vec<String>,
    pub awards: Vec<EmlAward>,
}

pub type EmlProject = Node<Project>;

impl Project {
    fn write_funding(&self, funding: Element<'_>) {
        if funding.element_children().is_empty() {
            funding.clear_children();
        }
        rewrite(funding, &["para"], &["para"], |slot| slot.leaves(&self.funding));
    }
}

impl Schema for Project {
    const KIND: NodeKind = NodeKind::Project;
    const ROOT: &'static str = "project";

    fn names() -> &'static NodeNameMap {
        &PROJECT_NAMES
    }

    fn node_order() -> &'static [&'static str] {
        &["title", "funding", "award"]
    }

    fn schema_order() -> &'static [&'static str] {
        &[
            "title",
            "personnel",
            "abstract",
            "funding",
            "award",
            "studyAreaDescription",
            "designDescription",
            "relatedProject",
        ]
    }

    fn parse(element: Element<'_>, cx: &ParseContext<'_>) -> Project {
        let funding = extract::child(Some(element), "funding");
        let mut paras = extract::list_text(funding, "para");
        paras.retain(|p| !p.is_empty());
        if paras.is_empty() {
            paras.extend(extract::non_empty_text(Some(element), "funding"));
        }

        Project {
            title: extract::non_empty_text(Some(element), "title"),
            funding: paras,
            awards: cx.hydrate_children(element, "award"),
        }
    }

    fn inject<'d>(&self, slot: &Slot<'_, 'd>) -> Option<Vec<Element<'d>>> {
        match slot.name() {
            "title" => Some(slot.optional(self.title.as_deref())),
            "funding" => {
                if self.funding.iter().all(|f| f.trim().is_empty()) {
                    return Some(Vec::new());
                }
                let funding = slot.reuse();
                self.write_funding(funding);
                Some(vec![funding])
            }
            "award" => Some(slot.embed_all(&self.awards)),
            _ => None,
        }
    }

    fn is_empty(&self) -> bool {
        self.title.is_none() && self.funding.iter().all(|f| f.trim().is_empty()) && self.awards.iter().all(Node::is_empty)
    }

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if !self.is_empty() && self.title.is_none() {
            errors.add("title", "Provide a project title.");
        }
        for award in &self.awards {
            errors.absorb("award", &award.validate());
        }
        errors
    }
}

impl Node<Project> {
    pub fn awards(&self) -> &[EmlAward] {
        &self.attributes().awards
    }

    pub fn set_title(&mut self, title: &str) {
        let title = Some(title.trim().to_owned()).filter(|t| !t.is_empty());
        self.update(|p| p.title = title);
    }

    pub fn add_funding(&mut self, funding: &str) {
        let funding = funding.trim().to_owned();
        self.update(|p| p.funding.push(funding));
    }

    /// Adds an award whose changes are reported through this project.
    pub fn add_award(&mut self, award: Award) {
        let award = Node::with_parent(award, Some(self.lineage()));
        self.update(|p| p.awards.push(award));
    }

    pub fn remove_award(&mut self, index: usize) -> Option<EmlAward> {
        if index >= self.awards().len() {
            return None;
        }
        let removed = self.update(|p| p.awards.remove(index));
        removed.set_parent(None);
        Some(removed)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::eml::change::{ChangeFlag, Lineage};
    use crate::eml::node::{verify, verify_sample};

    fn nsf() -> Award {
        Award {
            funder_name: Some("National Science Foundation".into()),
            funder_identifiers: vec!["https://ror.org/021nxhr62".into()],
            award_number: Some("1546024".into()),
            title: Some("Long Term Ecological Research".into()),
            award_url: None,
        }
    }

    #[test]
    fn schemas_are_consistent() {
        assert_eq!(Ok(()), verify::<Project>());
        assert_eq!(Ok(()), verify::<Award>());
    }

    #[test]
    fn writes_awards_after_funding() {
        let mut project = EmlProject::new(Project {
            title: Some("Soil carbon".into()),
            funding: vec!["NSF DEB".into()],
            awards: vec![],
        });
        project.add_award(nsf());

        assert_eq!(
            "<project><title>Soil carbon</title><funding><para>NSF DEB</para></funding><award><funderName>National Science Foundation</funderName><funderIdentifier>https://ror.org/021nxhr62</funderIdentifier><awardNumber>1546024</awardNumber><title>Long Term Ecological Research</title></award></project>",
            project.serialize()
        );
    }

    #[test]
    fn personnel_and_other_funding_content_survive() {
        let mut project = EmlProject::from_xml(
            "<project><title>Old</title><personnel><individualname><surname>Doe</surname></individualname><role>pi</role></personnel><funding><section><title>Grants</title></section><para>A</para></funding><studyareadescription><descriptor name='x'><descriptorvalue>y</descriptorvalue></descriptor></studyareadescription></project>",
            None,
        )
        .unwrap();
        project.update(|p| p.funding = vec!["B".into(), "C".into()]);

        assert_eq!(
            r#"<project><title>Old</title><personnel><individualName><surName>Doe</surName></individualName><role>pi</role></personnel><funding><section><title>Grants</title></section><para>B</para><para>C</para></funding><studyAreaDescription><descriptor name="x"><descriptorValue>y</descriptorValue></descriptor></studyAreaDescription></project>"#,
            project.serialize()
        );
    }

    #[test]
    fn carried_personnel_is_written_in_canonical_case() {
        let mut project = EmlProject::from_xml(
            "<project><title>T</title><personnel><individualname><givenname>Jo</givenname><surname>Doe</surname></individualname><organizationname>LTER</organizationname><electronicmailaddress>jo@example.org</electronicmailaddress><role>pi</role></personnel></project>",
            None,
        )
        .unwrap();
        project.set_title("Renamed");

        assert_eq!(
            "<project><title>Renamed</title><personnel><individualName><givenName>Jo</givenName><surName>Doe</surName></individualName><organizationName>LTER</organizationName><electronicMailAddress>jo@example.org</electronicMailAddress><role>pi</role></personnel></project>",
            project.serialize()
        );
        assert_eq!(Ok(()), verify_sample(&project));
    }

    #[test]
    fn plain_funding_text_becomes_a_paragraph() {
        let mut project = EmlProject::from_xml("<project><title>T</title><funding>NSF</funding></project>", None).unwrap();
        assert_eq!(vec!["NSF".to_owned()], project.attributes().funding);

        project.add_funding("USDA");
        assert_eq!(
            "<project><title>T</title><funding><para>NSF</para><para>USDA</para></funding></project>",
            project.serialize()
        );
    }

    #[test]
    fn hydrated_awards_report_through_the_project() {
        let flag = ChangeFlag::new();
        let eml = Lineage::listening(NodeKind::Eml, flag.notifier());
        let project = EmlProject::from_xml(
            "<project><title>T</title><award><fundername>NSF</fundername><title>Grant</title></award></project>",
            Some(&eml),
        )
        .unwrap();

        let award = &project.awards()[0];
        assert_eq!(Some("NSF"), award.attributes().funder_name.as_deref());
        assert!(award.parent_of_type(NodeKind::Project).is_some());
        assert!(award.parent_of_type(NodeKind::Eml).is_some());

        award.trickle_up_change();
        assert!(flag.is_changed());
    }

    #[test]
    fn edited_awards_keep_unmodelled_children() {
        let mut project = EmlProject::from_xml(
            "<project><title>T</title><award><fundername>NSF</fundername><title>Grant</title><note>keep</note></award></project>",
            None,
        )
        .unwrap();
        project.update(|p| p.awards[0].update(|a| a.award_number = Some("42".into())));

        assert_eq!(
            "<project><title>T</title><award><funderName>NSF</funderName><awardNumber>42</awardNumber><title>Grant</title><note>keep</note></award></project>",
            project.serialize()
        );
    }

    #[test]
    fn removing_awards() {
        let mut project = EmlProject::new(Project {
            title: Some("T".into()),
            ..Project::default()
        });
        project.add_award(nsf());

        assert!(project.remove_award(3).is_none());
        let removed = project.remove_award(0).expect("award");
        assert!(removed.lineage().parent().is_none());
        assert_eq!("<project><title>T</title></project>", project.serialize());
    }

    #[test]
    fn incomplete_awards_make_the_project_invalid() {
        let mut project = EmlProject::new(Project {
            title: Some("T".into()),
            ..Project::default()
        });
        project.add_award(Award {
            award_number: Some("1".into()),
            ..Award::default()
        });

        assert_eq!(
            Some("Provide the name of the funding organization."),
            project.validate().get("award")
        );
    }
}
