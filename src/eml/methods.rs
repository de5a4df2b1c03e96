//! `<methods>`: the steps taken to produce the data, and how it was
//! sampled.
//!
//! EML requires both halves of `<sampling>` and at least one
//! `<methodStep>` before it. Missing pieces are written as filler
//! paragraphs, and filler is read back as "not set".

use super::change::NodeKind;
use super::extract;
use super::names::{NameEntry, NodeNameMap, EML_VOCABULARY};
use super::node::{rewrite, Node, ParseContext, Schema, Slot};
use super::text::{self, EmlText, TextType};
use crate::dom::Element;

pub const STUDY_EXTENT_FILLER: &str = "No study extent description provided.";
pub const SAMPLING_FILLER: &str = "No sampling description provided.";
pub const METHOD_STEP_FILLER: &str = "No method step description provided.";

pub const NAMES: &[NameEntry] = &[
    ("alternateidentifier", "alternateIdentifier"),
    ("methodstep", "methodStep"),
    ("qualitycontrol", "qualityControl"),
    ("referencedentityid", "referencedEntityId"),
    ("shortname", "shortName"),
    ("spatialsamplingunits", "spatialSamplingUnits"),
    ("studyextent", "studyExtent"),
];

pub const STEP_NAMES: &[NameEntry] = &[("datasource", "dataSource"), ("substep", "subStep")];

static METHODS_NAMES: NodeNameMap = NodeNameMap::new(&[NAMES, STEP_NAMES, text::NAMES, EML_VOCABULARY]);
static METHOD_STEP_NAMES: NodeNameMap = NodeNameMap::new(&[STEP_NAMES, text::NAMES, EML_VOCABULARY]);

const SAMPLING_MANAGED: &[&str] = &["studyExtent", "samplingDescription"];
const SAMPLING_ORDER: &[&str] = &["studyExtent", "samplingDescription", "spatialSamplingUnits", "citation"];

fn has_text(text: Option<&EmlText>) -> bool {
    text.map_or(false, |t| !t.is_empty())
}

fn is_filler(text: &EmlText, filler: &str) -> bool {
    matches!(text.paragraphs(), [only] if only == filler)
}

/// `<name><para>filler</para></name>`
fn placeholder<'d>(slot: &Slot<'_, 'd>, name: &str, filler: &str) -> Element<'d> {
    let element = slot.create(name);
    element.append_child(slot.create_leaf("para", filler));
    element
}

/// The text written under `slot`, or a single filler paragraph.
fn described_or<'d>(slot: &Slot<'_, 'd>, text: Option<&EmlText>, filler: &str) -> Vec<Element<'d>> {
    match text.filter(|t| !t.is_empty()) {
        Some(text) => slot.embed_named(text),
        None => vec![placeholder(slot, slot.name(), filler)],
    }
}

fn lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodStep {
    pub description: EmlText,
    pub instrumentation: Vec<String>,
}

pub type EmlMethodStep = Node<MethodStep>;

impl MethodStep {
    pub fn new(description: &str) -> MethodStep {
        MethodStep {
            description: EmlText::text("description", lines(description)),
            instrumentation: Vec::new(),
        }
    }

    fn is_filler(&self) -> bool {
        is_filler(&self.description, METHOD_STEP_FILLER) && self.instrumentation.is_empty()
    }
}

impl Schema for MethodStep {
    const KIND: NodeKind = NodeKind::MethodStep;
    const ROOT: &'static str = "methodStep";

    fn names() -> &'static NodeNameMap {
        &METHOD_STEP_NAMES
    }

    fn node_order() -> &'static [&'static str] {
        &["description", "instrumentation"]
    }

    fn schema_order() -> &'static [&'static str] {
        &[
            "description",
            "citation",
            "protocol",
            "instrumentation",
            "software",
            "dataSource",
            "subStep",
        ]
    }

    fn parse(element: Element<'_>, cx: &ParseContext<'_>) -> MethodStep {
        let description = cx
            .hydrate_child::<TextType>(element, "description")
            .unwrap_or_else(|| Node::with_parent(TextType::default(), Some(cx.lineage())).with_tag("description"));
        let mut instrumentation = extract::list_text(Some(element), "instrumentation");
        instrumentation.retain(|i| !i.is_empty());

        MethodStep {
            description,
            instrumentation,
        }
    }

    fn inject<'d>(&self, slot: &Slot<'_, 'd>) -> Option<Vec<Element<'d>>> {
        match slot.name() {
            "description" => Some(slot.embed_named(&self.description)),
            "instrumentation" => Some(slot.leaves(&self.instrumentation)),
            _ => None,
        }
    }

    fn is_empty(&self) -> bool {
        self.description.is_empty()
    }
}

impl Node<MethodStep> {
    pub fn description(&self) -> &EmlText {
        &self.attributes().description
    }

    pub fn instrumentation(&self) -> &[String] {
        &self.attributes().instrumentation
    }

    pub fn set_description(&mut self, description: &str) {
        self.update(|s| s.description.set_text(description));
    }

    pub fn add_instrumentation(&mut self, instrument: &str) {
        let instrument = instrument.trim().to_owned();
        self.update(|s| s.instrumentation.push(instrument));
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Methods {
    pub method_steps: Vec<EmlMethodStep>,
    pub study_extent_description: Option<EmlText>,
    pub sampling_description: Option<EmlText>,
}

pub type EmlMethods = Node<Methods>;

impl Methods {
    fn has_sampling(&self) -> bool {
        has_text(self.study_extent_description.as_ref()) || has_text(self.sampling_description.as_ref())
    }

    fn write_sampling(&self, sampling: Element<'_>) {
        rewrite(sampling, SAMPLING_MANAGED, SAMPLING_ORDER, |slot| match slot.name() {
            "studyExtent" => {
                let extent = slot.reuse();
                self.write_study_extent(extent);
                vec![extent]
            }
            _ => described_or(slot, self.sampling_description.as_ref(), SAMPLING_FILLER),
        });
    }

    /// A study extent given as coverage needs no filler description.
    fn write_study_extent(&self, extent: Element<'_>) {
        let described = has_text(self.study_extent_description.as_ref());
        let has_coverage = extent.element_children().iter().any(|c| !c.is_named("description"));
        if !described && has_coverage {
            return;
        }

        rewrite(extent, &["description"], &["coverage", "description"], |slot| {
            described_or(slot, self.study_extent_description.as_ref(), STUDY_EXTENT_FILLER)
        });
    }

    fn parse_text(cx: &ParseContext<'_>, element: Option<Element<'_>>, filler: &str) -> Option<EmlText> {
        element
            .map(|e| cx.hydrate::<TextType>(e))
            .filter(|t| !is_filler(t, filler))
    }
}

impl Schema for Methods {
    const KIND: NodeKind = NodeKind::Methods;
    const ROOT: &'static str = "methods";

    fn names() -> &'static NodeNameMap {
        &METHODS_NAMES
    }

    fn node_order() -> &'static [&'static str] {
        &["methodStep", "sampling"]
    }

    fn schema_order() -> &'static [&'static str] {
        &["methodStep", "sampling", "qualityControl"]
    }

    fn parse(element: Element<'_>, cx: &ParseContext<'_>) -> Methods {
        let mut method_steps: Vec<EmlMethodStep> = cx.hydrate_children(element, "methodStep");
        method_steps.retain(|s| !s.attributes().is_filler());

        let sampling = extract::child(Some(element), "sampling");
        let extent = extract::descendant(sampling, &["studyExtent", "description"]);

        Methods {
            method_steps,
            study_extent_description: Methods::parse_text(cx, extent, STUDY_EXTENT_FILLER),
            sampling_description: Methods::parse_text(
                cx,
                extract::child(sampling, "samplingDescription"),
                SAMPLING_FILLER,
            ),
        }
    }

    fn inject<'d>(&self, slot: &Slot<'_, 'd>) -> Option<Vec<Element<'d>>> {
        match slot.name() {
            "methodStep" => {
                let mut steps = slot.embed_all(&self.method_steps);
                if steps.is_empty() && self.has_sampling() {
                    let filler = slot.element();
                    filler.append_child(placeholder(slot, "description", METHOD_STEP_FILLER));
                    steps.push(filler);
                }
                Some(steps)
            }
            "sampling" => {
                if !self.has_sampling() {
                    return Some(Vec::new());
                }
                let sampling = slot.reuse();
                self.write_sampling(sampling);
                Some(vec![sampling])
            }
            _ => None,
        }
    }

    fn is_empty(&self) -> bool {
        self.method_steps.iter().all(Node::is_empty) && !self.has_sampling()
    }
}

impl Node<Methods> {
    pub fn method_steps(&self) -> &[EmlMethodStep] {
        &self.attributes().method_steps
    }

    pub fn study_extent_description(&self) -> Option<&EmlText> {
        self.attributes().study_extent_description.as_ref()
    }

    pub fn sampling_description(&self) -> Option<&EmlText> {
        self.attributes().sampling_description.as_ref()
    }

    /// Appends a step described by `description`, one paragraph per
    /// line.
    pub fn add_method_step(&mut self, description: &str) {
        let step = Node::with_parent(MethodStep::new(description), Some(self.lineage()));
        step.attributes().description.set_parent(Some(step.lineage()));

        self.update(|m| m.method_steps.push(step));
    }

    pub fn remove_method_step(&mut self, index: usize) -> Option<EmlMethodStep> {
        if index >= self.method_steps().len() {
            return None;
        }
        let removed = self.update(|m| m.method_steps.remove(index));
        removed.set_parent(None);
        Some(removed)
    }

    pub fn set_study_extent_description(&mut self, description: &str) {
        let text = self.child_text(description);
        self.update(|m| m.study_extent_description = text);
    }

    pub fn set_sampling_description(&mut self, description: &str) {
        let text = self.child_text(description);
        self.update(|m| m.sampling_description = text);
    }

    fn child_text(&self, description: &str) -> Option<EmlText> {
        let paragraphs = lines(description);
        if paragraphs.is_empty() {
            return None;
        }
        Some(Node::with_parent(TextType::new(paragraphs), Some(self.lineage())).with_tag("description"))
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::eml::change::{ChangeFlag, Lineage};
    use crate::eml::node::verify;

    const FILLED: &str = "<methods><methodStep><description><para>No method step description provided.</para></description></methodStep><sampling><studyExtent><description><para>Plots</para></description></studyExtent><samplingDescription><para>No sampling description provided.</para></samplingDescription></sampling></methods>";

    #[test]
    fn schemas_are_consistent() {
        assert_eq!(Ok(()), verify::<Methods>());
        assert_eq!(Ok(()), verify::<MethodStep>());
    }

    #[test]
    fn sampling_alone_is_completed_with_filler() {
        let mut methods = EmlMethods::default();
        methods.set_study_extent_description("Plots");

        assert_eq!(FILLED, methods.serialize());
    }

    #[test]
    fn filler_reads_back_as_not_set() {
        let methods = EmlMethods::from_xml(FILLED, None).unwrap();

        assert!(methods.method_steps().is_empty());
        assert!(methods.sampling_description().is_none());
        assert_eq!(
            Some(&["Plots".to_owned()][..]),
            methods.study_extent_description().map(|t| t.paragraphs())
        );
    }

    #[test]
    fn nothing_but_filler_writes_nothing() {
        let mut methods = EmlMethods::from_xml(
            "<methods><methodstep><description><para>No method step description provided.</para></description></methodstep><sampling><studyextent><description><para>No study extent description provided.</para></description></studyextent><samplingdescription><para>No sampling description provided.</para></samplingdescription></sampling></methods>",
            None,
        )
        .unwrap();

        assert!(methods.is_empty());
        assert_eq!("", methods.serialize());
    }

    #[test]
    fn new_steps_follow_existing_ones() {
        let mut methods = EmlMethods::from_xml(
            "<methods><methodstep><description><para>Dig</para></description><instrumentation>Shovel</instrumentation></methodstep><qualitycontrol><description><para>QC</para></description></qualitycontrol></methods>",
            None,
        )
        .unwrap();
        methods.add_method_step("Sieve\nWeigh");

        assert_eq!(
            "<methods><methodStep><description><para>Dig</para></description><instrumentation>Shovel</instrumentation></methodStep><methodStep><description><para>Sieve</para><para>Weigh</para></description></methodStep><qualityControl><description><para>QC</para></description></qualityControl></methods>",
            methods.serialize()
        );
    }

    #[test]
    fn real_steps_replace_the_filler_step() {
        let mut methods = EmlMethods::from_xml(FILLED, None).unwrap();
        methods.add_method_step("Count");

        assert_eq!(
            "<methods><methodStep><description><para>Count</para></description></methodStep><sampling><studyExtent><description><para>Plots</para></description></studyExtent><samplingDescription><para>No sampling description provided.</para></samplingDescription></sampling></methods>",
            methods.serialize()
        );
    }

    #[test]
    fn coverage_study_extents_get_no_filler() {
        let mut methods = EmlMethods::from_xml(
            "<methods><methodstep><description><para>Dig</para></description></methodstep><sampling><studyextent><coverage><geographiccoverage><geographicdescription>Ridge</geographicdescription></geographiccoverage></coverage></studyextent><samplingdescription><para>Random</para></samplingdescription><spatialsamplingunits><referencedentityid>plots</referencedentityid></spatialsamplingunits></sampling></methods>",
            None,
        )
        .unwrap();
        methods.set_sampling_description("Stratified");

        assert_eq!(
            "<methods><methodStep><description><para>Dig</para></description></methodStep><sampling><studyExtent><coverage><geographicCoverage><geographicDescription>Ridge</geographicDescription></geographicCoverage></coverage></studyExtent><samplingDescription><para>Stratified</para></samplingDescription><spatialSamplingUnits><referencedEntityId>plots</referencedEntityId></spatialSamplingUnits></sampling></methods>",
            methods.serialize()
        );
    }

    #[test]
    fn step_edits_reach_the_listener() {
        let flag = ChangeFlag::new();
        let eml = Lineage::listening(NodeKind::Eml, flag.notifier());
        let mut methods = EmlMethods::from_xml(
            "<methods><methodStep><description><para>Dig</para></description></methodStep></methods>",
            Some(&eml),
        )
        .unwrap();

        methods.update(|m| m.method_steps[0].add_instrumentation("Auger"));
        flag.reset();

        let step = &methods.method_steps()[0];
        assert!(step.description().parent_of_type(NodeKind::Methods).is_some());
        step.description().trickle_up_change();
        assert!(flag.is_changed());
    }

    #[test]
    fn steps_without_a_description_are_dropped() {
        let mut methods = EmlMethods::default();
        methods.add_method_step("Dig");
        methods.update(|m| m.method_steps[0].set_description("  "));

        assert!(methods.is_empty());
        assert_eq!("", methods.serialize());
    }

    #[test]
    fn removing_steps() {
        let mut methods = EmlMethods::default();
        methods.add_method_step("Dig");
        methods.add_method_step("Sieve");

        assert!(methods.remove_method_step(5).is_none());
        let removed = methods.remove_method_step(0).expect("step");
        assert_eq!(&["Dig".to_owned()], removed.description().paragraphs());
        assert_eq!(
            "<methods><methodStep><description><para>Sieve</para></description></methodStep></methods>",
            methods.serialize()
        );
    }
}
