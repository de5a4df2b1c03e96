//! `<otherEntity>`: a data object that is not a table, raster, vector
//! or stored procedure.
//!
//! Only the identifying children are managed. `physical`, `coverage`,
//! `methods`, `attributeList` and the rest stay as they were parsed.

use super::change::NodeKind;
use super::error::ValidationErrors;
use super::extract;
use super::names::{NameEntry, NodeNameMap, EML_VOCABULARY};
use super::node::{Node, ParseContext, Schema, Slot};
use crate::dom::Element;

pub const NAMES: &[NameEntry] = &[
    ("additionalinfo", "additionalInfo"),
    ("alternateidentifier", "alternateIdentifier"),
    ("attributelist", "attributeList"),
    ("entitydescription", "entityDescription"),
    ("entityname", "entityName"),
    ("entitytype", "entityType"),
    ("formatname", "formatName"),
    ("objectname", "objectName"),
    ("otherentity", "otherEntity"),
];

static OTHER_ENTITY_NAMES: NodeNameMap = NodeNameMap::new(&[NAMES, EML_VOCABULARY]);

const DOWNLOAD_MARKERS: &[&str] = &["/resolve/", "/object/"];
const ECOGRID: &str = "ecogrid://";

/// What the `<physical>` section says about the described file. Read
/// only; the section itself is never rewritten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhysicalSummary {
    pub object_name: Option<String>,
    pub size: Option<String>,
    pub md5_checksum: Option<String>,
    pub format_name: Option<String>,
    /// The object identifier taken from the distribution URL.
    pub download_id: Option<String>,
}

impl PhysicalSummary {
    fn parse(element: Element<'_>) -> PhysicalSummary {
        let physical = extract::find(Some(element), "physical");
        let text = |name: &str| {
            extract::find(physical, name)
                .map(|e| e.text_content().trim().to_owned())
                .filter(|t| !t.is_empty())
        };

        let authentication = extract::find(physical, "authentication");
        let md5_checksum = match extract::attribute_text(authentication, "method") {
            Some(ref method) if method == "MD5" => text("authentication"),
            _ => None,
        };

        PhysicalSummary {
            object_name: text("objectName"),
            size: text("size"),
            md5_checksum,
            format_name: extract::find(Some(element), "formatName")
                .map(|e| e.text_content().trim().to_owned())
                .filter(|t| !t.is_empty()),
            download_id: extract::find(Some(element), "url").and_then(|e| download_id(&e.text_content())),
        }
    }
}

/// The object identifier in a DataONE resolve or object URL, or in an
/// `ecogrid://` URL.
pub fn download_id(url: &str) -> Option<String> {
    let url = url.trim();
    let id = DOWNLOAD_MARKERS
        .iter()
        .find_map(|marker| url.find(marker).map(|at| &url[at + marker.len()..]))
        .or_else(|| {
            let rest = &url[url.find(ECOGRID)? + ECOGRID.len()..];
            Some(rest.split_once('/').map_or(rest, |(_, id)| id))
        })?;

    Some(id.to_owned()).filter(|id| !id.is_empty())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OtherEntity {
    /// The `id` attribute of the root element.
    pub xml_id: Option<String>,
    pub alternate_identifier: Vec<String>,
    pub entity_name: Option<String>,
    pub entity_description: Option<String>,
    pub entity_type: Option<String>,
    physical: PhysicalSummary,
}

pub type EmlOtherEntity = Node<OtherEntity>;

impl OtherEntity {
    pub fn new(entity_name: &str, entity_type: &str) -> OtherEntity {
        OtherEntity {
            entity_name: Some(entity_name.to_owned()),
            entity_type: Some(entity_type.to_owned()),
            ..OtherEntity::default()
        }
    }
}

impl Schema for OtherEntity {
    const KIND: NodeKind = NodeKind::OtherEntity;
    const ROOT: &'static str = "otherEntity";

    fn names() -> &'static NodeNameMap {
        &OTHER_ENTITY_NAMES
    }

    fn node_order() -> &'static [&'static str] {
        &["alternateIdentifier", "entityName", "entityDescription", "entityType"]
    }

    fn schema_order() -> &'static [&'static str] {
        &[
            "alternateIdentifier",
            "entityName",
            "entityDescription",
            "physical",
            "coverage",
            "methods",
            "additionalInfo",
            "annotation",
            "attributeList",
            "constraint",
            "entityType",
        ]
    }

    fn parse(element: Element<'_>, _cx: &ParseContext<'_>) -> OtherEntity {
        let mut alternate_identifier = extract::list_text(Some(element), "alternateIdentifier");
        alternate_identifier.retain(|id| !id.is_empty());

        OtherEntity {
            xml_id: extract::attribute_text(Some(element), "id"),
            alternate_identifier,
            entity_name: extract::non_empty_text(Some(element), "entityName"),
            entity_description: extract::non_empty_text(Some(element), "entityDescription"),
            entity_type: extract::non_empty_text(Some(element), "entityType"),
            physical: PhysicalSummary::parse(element),
        }
    }

    fn inject<'d>(&self, slot: &Slot<'_, 'd>) -> Option<Vec<Element<'d>>> {
        match slot.name() {
            "alternateIdentifier" => Some(slot.leaves(&self.alternate_identifier)),
            "entityName" => Some(slot.optional(self.entity_name.as_deref())),
            "entityDescription" => Some(slot.optional(self.entity_description.as_deref())),
            "entityType" => Some(slot.optional(self.entity_type.as_deref())),
            _ => None,
        }
    }

    fn decorate(&self, root: Element<'_>) {
        if let Some(id) = self.xml_id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
            root.set_attribute_value("id", id);
        }
    }

    fn is_empty(&self) -> bool {
        self.xml_id.is_none()
            && self.alternate_identifier.iter().all(|id| id.trim().is_empty())
            && self.entity_name.is_none()
            && self.entity_description.is_none()
            && self.entity_type.is_none()
    }

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if self.entity_name.as_deref().map_or(true, |n| n.trim().is_empty()) {
            errors.add("entityName", "An entity name is required.");
        }
        errors
    }
}

impl Node<OtherEntity> {
    pub fn xml_id(&self) -> Option<&str> {
        self.attributes().xml_id.as_deref()
    }

    pub fn entity_name(&self) -> Option<&str> {
        self.attributes().entity_name.as_deref()
    }

    pub fn alternate_identifiers(&self) -> &[String] {
        &self.attributes().alternate_identifier
    }

    pub fn physical(&self) -> &PhysicalSummary {
        &self.attributes().physical
    }

    pub fn set_xml_id(&mut self, id: &str) {
        let id = id.to_owned();
        self.update(|e| e.xml_id = Some(id));
    }

    pub fn set_entity_name(&mut self, name: &str) {
        let name = Some(name.trim().to_owned()).filter(|n| !n.is_empty());
        self.update(|e| e.entity_name = name);
    }

    pub fn add_alternate_identifier(&mut self, id: &str) {
        let id = id.trim().to_owned();
        self.update(|e| e.alternate_identifier.push(id));
    }
}
