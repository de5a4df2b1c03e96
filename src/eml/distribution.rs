//! `<distribution>`: where a dataset or entity can be obtained, either
//! online through a URL or offline on some medium.

use tracing::{debug, warn};

use super::change::{Lineage, NodeKind};
use super::extract;
use super::names::{NameEntry, NodeNameMap, EML_VOCABULARY};
use super::node::{self, rewrite, Node, ParseContext, Schema, Slot};
use crate::dom::Element;
use crate::Fragment;

pub const NAMES: &[NameEntry] = &[
    ("authsystem", "authSystem"),
    ("connectiondefinition", "connectionDefinition"),
    ("mediumdensity", "mediumDensity"),
    ("mediumdensityunits", "mediumDensityUnits"),
    ("mediumformat", "mediumFormat"),
    ("mediumname", "mediumName"),
    ("mediumnote", "mediumNote"),
    ("mediumvolume", "mediumVolume"),
    ("onlinedescription", "onlineDescription"),
];

static DISTRIBUTION_NAMES: NodeNameMap = NodeNameMap::new(&[NAMES, EML_VOCABULARY]);

const OFFLINE_MANAGED: &[&str] = &["mediumName", "mediumVolume", "mediumFormat", "mediumNote"];
const OFFLINE_ORDER: &[&str] = &[
    "mediumName",
    "mediumDensity",
    "mediumDensityUnits",
    "mediumVolume",
    "mediumFormat",
    "mediumNote",
];
const ONLINE_MANAGED: &[&str] = &["onlineDescription", "url"];
const ONLINE_ORDER: &[&str] = &["onlineDescription", "url", "connection", "connectionDefinition"];

/// The `function` of a dataset landing page URL.
pub const INFORMATION: &str = "information";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Distribution {
    pub medium_name: Option<String>,
    pub medium_volume: Option<String>,
    pub medium_format: Option<String>,
    pub medium_note: Option<String>,
    pub url: Option<String>,
    /// `information` or `download`.
    pub url_function: Option<String>,
    pub online_description: Option<String>,
}

pub type EmlDistribution = Node<Distribution>;

/// Names a [`Distribution`] field for attribute lookups.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DistributionField {
    MediumName,
    MediumVolume,
    MediumFormat,
    MediumNote,
    Url,
    UrlFunction,
    OnlineDescription,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Location {
    Offline,
    Online,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Distribution {
    pub fn online(url: &str, url_function: Option<&str>) -> Distribution {
        Distribution {
            url: Some(url.to_owned()),
            url_function: url_function.map(str::to_owned),
            ..Distribution::default()
        }
    }

    pub fn get(&self, field: DistributionField) -> Option<&str> {
        let value = match field {
            DistributionField::MediumName => &self.medium_name,
            DistributionField::MediumVolume => &self.medium_volume,
            DistributionField::MediumFormat => &self.medium_format,
            DistributionField::MediumNote => &self.medium_note,
            DistributionField::Url => &self.url,
            DistributionField::UrlFunction => &self.url_function,
            DistributionField::OnlineDescription => &self.online_description,
        };
        value.as_deref()
    }

    fn offline_fields(&self) -> [&Option<String>; 4] {
        [&self.medium_name, &self.medium_volume, &self.medium_format, &self.medium_note]
    }

    /// Offline wins when both kinds of location have values.
    fn location(&self) -> Option<Location> {
        if self.offline_fields().iter().any(|f| present(f).is_some()) {
            Some(Location::Offline)
        } else if present(&self.url).is_some() || present(&self.online_description).is_some() {
            Some(Location::Online)
        } else {
            None
        }
    }

    fn write_offline<'d>(&self, offline: Element<'d>) {
        rewrite(offline, OFFLINE_MANAGED, OFFLINE_ORDER, |slot| {
            let value = match slot.name() {
                "mediumName" => &self.medium_name,
                "mediumVolume" => &self.medium_volume,
                "mediumFormat" => &self.medium_format,
                _ => &self.medium_note,
            };
            slot.optional(present(value))
        });
    }

    fn write_online<'d>(&self, online: Element<'d>) {
        rewrite(online, ONLINE_MANAGED, ONLINE_ORDER, |slot| match slot.name() {
            "onlineDescription" => slot.optional(present(&self.online_description)),
            _ => match present(&self.url) {
                Some(url) => {
                    let element = slot.reuse();
                    element.set_text(url);
                    match present(&self.url_function) {
                        Some(function) => {
                            element.set_attribute_value("function", function);
                        }
                        None => element.remove_attribute("function"),
                    }
                    vec![element]
                }
                None => Vec::new(),
            },
        });
    }
}

impl Schema for Distribution {
    const KIND: NodeKind = NodeKind::Distribution;
    const ROOT: &'static str = "distribution";

    fn names() -> &'static NodeNameMap {
        &DISTRIBUTION_NAMES
    }

    fn node_order() -> &'static [&'static str] {
        &["offline", "online"]
    }

    fn schema_order() -> &'static [&'static str] {
        &["offline", "online", "inline"]
    }

    fn parse(element: Element<'_>, _cx: &ParseContext<'_>) -> Distribution {
        let offline = extract::find(Some(element), "offline");
        let online = extract::find(Some(element), "online");
        let url = extract::child(online, "url");

        Distribution {
            medium_name: extract::non_empty_text(offline, "mediumName"),
            medium_volume: extract::non_empty_text(offline, "mediumVolume"),
            medium_format: extract::non_empty_text(offline, "mediumFormat"),
            medium_note: extract::non_empty_text(offline, "mediumNote"),
            url: extract::non_empty_text(online, "url"),
            url_function: extract::attribute_text(url, "function"),
            online_description: extract::non_empty_text(online, "onlineDescription"),
        }
    }

    fn inject<'d>(&self, slot: &Slot<'_, 'd>) -> Option<Vec<Element<'d>>> {
        let wanted = match slot.name() {
            "offline" => Location::Offline,
            "online" => Location::Online,
            _ => return None,
        };
        if self.location() != Some(wanted) {
            return Some(Vec::new());
        }

        let location = slot.reuse();
        match wanted {
            Location::Offline => self.write_offline(location),
            Location::Online => self.write_online(location),
        }
        Some(vec![location])
    }

    fn is_empty(&self) -> bool {
        self.location().is_none()
    }
}

/// The distributions of one dataset or entity, in document order.
#[derive(Debug, Clone, Default)]
pub struct Distributions {
    items: Vec<EmlDistribution>,
    parent: Option<Lineage>,
}

impl Distributions {
    /// An empty collection whose members report changes to `parent`.
    pub fn new(parent: Option<&Lineage>) -> Distributions {
        Distributions {
            items: Vec::new(),
            parent: parent.cloned(),
        }
    }

    /// Hydrates every `<distribution>` child of `element`.
    pub fn hydrate(element: Element<'_>, parent: Option<&Lineage>) -> Distributions {
        let items = extract::children(Some(element), "distribution")
            .into_iter()
            .map(|e| Node::hydrate(e, parent))
            .collect();
        Distributions {
            items,
            parent: parent.cloned(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EmlDistribution> {
        self.items.iter()
    }

    pub fn get(&self, index: usize) -> Option<&EmlDistribution> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut EmlDistribution> {
        self.items.get_mut(index)
    }

    pub fn add(&mut self, distribution: Distribution) -> &mut EmlDistribution {
        let node = Node::with_parent(distribution, self.parent.as_ref());
        self.push(node)
    }

    pub fn push(&mut self, node: EmlDistribution) -> &mut EmlDistribution {
        node.set_parent(self.parent.as_ref());
        self.items.push(node);
        self.changed();
        let last = self.items.len() - 1;
        &mut self.items[last]
    }

    fn changed(&self) {
        if let Some(ref parent) = self.parent {
            parent.trickle_up_change();
        }
    }

    fn position_by_attributes(&self, attributes: &[(DistributionField, &str)], partial: bool) -> Option<usize> {
        self.items.iter().position(|d| {
            attributes.iter().all(|&(field, wanted)| match d.attributes().get(field) {
                Some(value) if partial => value.contains(wanted),
                Some(value) => value == wanted,
                None => false,
            })
        })
    }

    /// The first distribution whose fields all equal the given values,
    /// or contain them when `partial` is set.
    pub fn find_by_attributes(
        &self,
        attributes: &[(DistributionField, &str)],
        partial: bool,
    ) -> Option<&EmlDistribution> {
        self.position_by_attributes(attributes, partial).map(|i| &self.items[i])
    }

    /// Removes and returns what [`Distributions::find_by_attributes`]
    /// would find.
    pub fn remove_by_attributes(
        &mut self,
        attributes: &[(DistributionField, &str)],
        partial: bool,
    ) -> Option<EmlDistribution> {
        let index = self.position_by_attributes(attributes, partial)?;
        let removed = self.items.remove(index);
        self.changed();
        Some(removed)
    }

    /// Adds the landing page URL of a dataset as an `information`
    /// distribution. Information distributions whose URL mentions any
    /// of `old_ids` are removed first.
    pub fn add_dataset_distribution_url(&mut self, url: &str, old_ids: &[&str]) -> Option<&mut EmlDistribution> {
        if url.trim().is_empty() {
            warn!("no URL given for the dataset distribution");
            return None;
        }

        for id in old_ids.iter().filter(|id| !id.is_empty()) {
            let query = [(DistributionField::Url, *id), (DistributionField::UrlFunction, INFORMATION)];
            while self.remove_by_attributes(&query, true).is_some() {
                debug!(id = %id, "removed an outdated dataset distribution");
            }
        }

        Some(self.add(Distribution::online(url, Some(INFORMATION))))
    }

    /// The output of every distribution that has any.
    pub fn update_doms(&self) -> Vec<Fragment> {
        node::update_doms(&self.items)
    }
}
