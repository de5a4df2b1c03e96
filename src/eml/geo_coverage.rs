//! `<geographicCoverage>`: a description of a place and the box that
//! bounds it.

use super::change::NodeKind;
use super::error::ValidationErrors;
use super::extract;
use super::names::{NameEntry, NodeNameMap, EML_VOCABULARY};
use super::node::{rewrite, Node, ParseContext, Schema, Slot};
use crate::dom::Element;

pub const NAMES: &[NameEntry] = &[
    ("altitudemaximum", "altitudeMaximum"),
    ("altitudeminimum", "altitudeMinimum"),
    ("altitudeunits", "altitudeUnits"),
    ("boundingaltitudes", "boundingAltitudes"),
    ("boundingcoordinates", "boundingCoordinates"),
    ("eastboundingcoordinate", "eastBoundingCoordinate"),
    ("geographiccoverage", "geographicCoverage"),
    ("geographicdescription", "geographicDescription"),
    ("northboundingcoordinate", "northBoundingCoordinate"),
    ("southboundingcoordinate", "southBoundingCoordinate"),
    ("westboundingcoordinate", "westBoundingCoordinate"),
];

static GEO_NAMES: NodeNameMap = NodeNameMap::new(&[NAMES, EML_VOCABULARY]);

const COORDINATES: &[&str] = &[
    "westBoundingCoordinate",
    "eastBoundingCoordinate",
    "northBoundingCoordinate",
    "southBoundingCoordinate",
];
const COORDINATE_ORDER: &[&str] = &[
    "westBoundingCoordinate",
    "eastBoundingCoordinate",
    "northBoundingCoordinate",
    "southBoundingCoordinate",
    "boundingAltitudes",
];

pub const NORTH_RANGE: &str = "Northwest latitude out of range, must be >-90 and <90. Please correct the latitude.";
pub const EAST_RANGE: &str = "Southeast longitude out of range (-180 to 180). Please adjust the longitude.";
pub const SOUTH_RANGE: &str = "Southeast latitude out of range, must be >-90 and <90. Please correct the latitude.";
pub const WEST_RANGE: &str = "Northwest longitude out of range (-180 to 180). Check and correct the longitude.";
pub const MISSING: &str = "Latitude and longitude are required for each coordinate. Please complete all fields.";
pub const DESCRIPTION: &str = "Missing location description. Please add a brief description.";
pub const NEED_PAIR: &str = "Location requires at least one coordinate pair. Please add coordinates.";
pub const NORTH_SOUTH_REVERSED: &str = "North latitude should be greater than South. Please swap the values.";
pub const CROSSES_ANTI_MERIDIAN: &str =
    "Bounding box crosses the anti-meridian. Please use multiple boxes that meet at the anti-meridian instead.";

/// Bounds are kept as written; they are only read as numbers to
/// validate them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoCoverage {
    pub description: Option<String>,
    pub north: Option<String>,
    pub south: Option<String>,
    pub east: Option<String>,
    pub west: Option<String>,
}

pub type EmlGeoCoverage = Node<GeoCoverage>;

struct Coordinate<'a> {
    text: Option<&'a str>,
    min: f64,
    max: f64,
}

impl<'a> Coordinate<'a> {
    fn new(value: &'a Option<String>, limit: f64) -> Coordinate<'a> {
        Coordinate {
            text: value.as_deref().map(str::trim).filter(|v| !v.is_empty()),
            min: -limit,
            max: limit,
        }
    }

    fn is_set(&self) -> bool {
        self.text.is_some()
    }

    fn value(&self) -> Option<f64> {
        self.text?.parse::<f64>().ok().filter(|v| (self.min..=self.max).contains(v))
    }

    fn is_valid(&self) -> bool {
        self.value().is_some()
    }
}

fn parse_coordinate(node: Option<Element<'_>>, name: &str) -> Option<String> {
    extract::non_empty_text(node, name).map(|v| v.replacen('+', "", 1))
}

impl GeoCoverage {
    pub fn bounding_box(north: f64, south: f64, east: f64, west: f64) -> GeoCoverage {
        GeoCoverage {
            description: None,
            north: Some(north.to_string()),
            south: Some(south.to_string()),
            east: Some(east.to_string()),
            west: Some(west.to_string()),
        }
    }

    fn north(&self) -> Coordinate<'_> {
        Coordinate::new(&self.north, 90.0)
    }

    fn south(&self) -> Coordinate<'_> {
        Coordinate::new(&self.south, 90.0)
    }

    fn east(&self) -> Coordinate<'_> {
        Coordinate::new(&self.east, 180.0)
    }

    fn west(&self) -> Coordinate<'_> {
        Coordinate::new(&self.west, 180.0)
    }

    /// The four bounds in output order. A single north-west or
    /// south-east point stands for both corners.
    fn bounds(&self) -> [Option<&str>; 4] {
        let (north, south, east, west) = (self.north().text, self.south().text, self.east().text, self.west().text);

        let (north, south, east, west) = match (north, south, east, west) {
            (Some(n), None, None, Some(w)) => (Some(n), Some(n), Some(w), Some(w)),
            (None, Some(s), Some(e), None) => (Some(s), Some(s), Some(e), Some(e)),
            bounds => bounds,
        };
        [west, east, north, south]
    }

    fn write_bounds(&self, coordinates: Element<'_>) {
        let bounds = self.bounds();
        rewrite(coordinates, COORDINATES, COORDINATE_ORDER, |slot| {
            let value = COORDINATES
                .iter()
                .position(|&name| name == slot.name())
                .and_then(|i| bounds[i]);
            slot.optional(value)
        });
    }
}

impl Schema for GeoCoverage {
    const KIND: NodeKind = NodeKind::GeoCoverage;
    const ROOT: &'static str = "geographicCoverage";

    fn names() -> &'static NodeNameMap {
        &GEO_NAMES
    }

    fn node_order() -> &'static [&'static str] {
        &["geographicDescription", "boundingCoordinates"]
    }

    fn schema_order() -> &'static [&'static str] {
        &["geographicDescription", "boundingCoordinates", "datasetGPolygon"]
    }

    fn parse(element: Element<'_>, _cx: &ParseContext<'_>) -> GeoCoverage {
        let bounds = extract::child(Some(element), "boundingCoordinates");

        GeoCoverage {
            description: extract::non_empty_text(Some(element), "geographicDescription"),
            north: parse_coordinate(bounds, "northBoundingCoordinate"),
            south: parse_coordinate(bounds, "southBoundingCoordinate"),
            east: parse_coordinate(bounds, "eastBoundingCoordinate"),
            west: parse_coordinate(bounds, "westBoundingCoordinate"),
        }
    }

    fn inject<'d>(&self, slot: &Slot<'_, 'd>) -> Option<Vec<Element<'d>>> {
        match slot.name() {
            "geographicDescription" => Some(slot.optional(self.description.as_deref())),
            "boundingCoordinates" => {
                let coordinates = slot.reuse();
                self.write_bounds(coordinates);
                Some(vec![coordinates])
            }
            _ => None,
        }
    }

    fn is_empty(&self) -> bool {
        self.description.is_none() && ![self.north(), self.south(), self.east(), self.west()].iter().any(Coordinate::is_set)
    }

    /// Invalid coverage is not written.
    fn emits_output(&self) -> bool {
        self.validate().is_empty()
    }

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        let (north, south, east, west) = (self.north(), self.south(), self.east(), self.west());

        if self.description.as_deref().map_or(true, |d| d.trim().is_empty()) {
            errors.set("description", DESCRIPTION);
        }

        if ![&north, &south, &east, &west].iter().any(|c| c.is_set()) {
            errors.set("north", NEED_PAIR);
        }

        for (field, coordinate, message) in [
            ("north", &north, NORTH_RANGE),
            ("south", &south, SOUTH_RANGE),
            ("east", &east, EAST_RANGE),
            ("west", &west, WEST_RANGE),
        ] {
            if coordinate.is_set() && !coordinate.is_valid() {
                errors.set(field, message);
            }
        }

        match (north.is_set(), west.is_set(), south.is_set(), east.is_set()) {
            (true, false, _, _) => errors.set("west", MISSING),
            (false, true, _, _) => errors.set("north", MISSING),
            (_, _, true, false) => errors.set("east", MISSING),
            (_, _, false, true) => errors.set("south", MISSING),
            _ => {}
        }

        if let (Some(n), Some(s)) = (north.value(), south.value()) {
            if n < s {
                errors.set("north", NORTH_SOUTH_REVERSED);
                errors.set("south", NORTH_SOUTH_REVERSED);
            }
        }

        if let (Some(e), Some(w)) = (east.value(), west.value()) {
            if e < w {
                errors.set("east", CROSSES_ANTI_MERIDIAN);
                errors.set("west", CROSSES_ANTI_MERIDIAN);
            }
        }

        errors
    }
}

impl Node<GeoCoverage> {
    pub fn set_description(&mut self, description: &str) {
        let description = Some(description.trim().to_owned()).filter(|d| !d.is_empty());
        self.update(|g| g.description = description);
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::eml::node::verify;

    fn described(mut coverage: GeoCoverage) -> GeoCoverage {
        coverage.description = Some("Lake Tahoe".into());
        coverage
    }

    #[test]
    fn schema_is_consistent() {
        assert_eq!(Ok(()), verify::<GeoCoverage>());
    }

    #[test]
    fn writes_bounds_west_east_north_south() {
        let mut geo = EmlGeoCoverage::new(described(GeoCoverage::bounding_box(39.3, 38.9, -119.9, -120.2)));

        assert_eq!(
            "<geographicCoverage><geographicDescription>Lake Tahoe</geographicDescription><boundingCoordinates><westBoundingCoordinate>-120.2</westBoundingCoordinate><eastBoundingCoordinate>-119.9</eastBoundingCoordinate><northBoundingCoordinate>39.3</northBoundingCoordinate><southBoundingCoordinate>38.9</southBoundingCoordinate></boundingCoordinates></geographicCoverage>",
            geo.serialize()
        );
    }

    #[test]
    fn a_single_point_is_mirrored() {
        let geo = EmlGeoCoverage::new(described(GeoCoverage {
            north: Some("39".into()),
            west: Some("-120".into()),
            ..GeoCoverage::default()
        }));

        let dom = geo.update_dom().expect("output");
        let parsed = geo.parse(dom.element());
        assert_eq!(Some("39"), parsed.south.as_deref());
        assert_eq!(Some("-120"), parsed.east.as_deref());
    }

    #[test]
    fn leading_plus_signs_are_dropped() {
        let geo = EmlGeoCoverage::from_xml(
            "<geographiccoverage><geographicdescription>x</geographicdescription><boundingcoordinates><westboundingcoordinate>-1</westboundingcoordinate><eastboundingcoordinate>+2</eastboundingcoordinate><northboundingcoordinate>+3</northboundingcoordinate><southboundingcoordinate>1</southboundingcoordinate></boundingcoordinates></geographiccoverage>",
            None,
        )
        .unwrap();

        assert_eq!(Some("2"), geo.attributes().east.as_deref());
        assert_eq!(Some("3"), geo.attributes().north.as_deref());
        assert!(geo.is_valid());
    }

    #[test]
    fn altitudes_are_kept() {
        let mut geo = EmlGeoCoverage::from_xml(
            "<geographicCoverage><geographicDescription>Peak</geographicDescription><boundingCoordinates><westBoundingCoordinate>10</westBoundingCoordinate><eastBoundingCoordinate>11</eastBoundingCoordinate><northBoundingCoordinate>5</northBoundingCoordinate><southBoundingCoordinate>4</southBoundingCoordinate><boundingAltitudes><altitudeMinimum>100</altitudeMinimum><altitudeMaximum>200</altitudeMaximum><altitudeUnits>meter</altitudeUnits></boundingAltitudes></boundingCoordinates></geographicCoverage>",
            None,
        )
        .unwrap();
        geo.update(|g| g.east = Some("12".into()));

        assert_eq!(
            "<geographicCoverage><geographicDescription>Peak</geographicDescription><boundingCoordinates><westBoundingCoordinate>10</westBoundingCoordinate><eastBoundingCoordinate>12</eastBoundingCoordinate><northBoundingCoordinate>5</northBoundingCoordinate><southBoundingCoordinate>4</southBoundingCoordinate><boundingAltitudes><altitudeMinimum>100</altitudeMinimum><altitudeMaximum>200</altitudeMaximum><altitudeUnits>meter</altitudeUnits></boundingAltitudes></boundingCoordinates></geographicCoverage>",
            geo.serialize()
        );
    }

    #[test]
    fn invalid_coverage_is_not_written() {
        let mut geo = EmlGeoCoverage::new(GeoCoverage::bounding_box(10.0, 20.0, 5.0, 1.0));

        let errors = geo.validate();
        assert_eq!(Some(DESCRIPTION), errors.get("description"));
        assert_eq!(Some(NORTH_SOUTH_REVERSED), errors.get("north"));
        assert_eq!("", geo.serialize());
    }

    #[test]
    fn reports_range_and_pairing_problems() {
        let out_of_range = EmlGeoCoverage::new(described(GeoCoverage::bounding_box(95.0, 0.0, 1.0, -181.0)));
        let errors = out_of_range.validate();
        assert_eq!(Some(NORTH_RANGE), errors.get("north"));
        assert_eq!(Some(WEST_RANGE), errors.get("west"));

        let half = EmlGeoCoverage::new(described(GeoCoverage {
            north: Some("1".into()),
            ..GeoCoverage::default()
        }));
        assert_eq!(Some(MISSING), half.validate().get("west"));

        let nothing = EmlGeoCoverage::new(described(GeoCoverage::default()));
        assert_eq!(Some(NEED_PAIR), nothing.validate().get("north"));

        let wrapped = EmlGeoCoverage::new(described(GeoCoverage::bounding_box(1.0, 0.0, -170.0, 170.0)));
        assert_eq!(Some(CROSSES_ANTI_MERIDIAN), wrapped.validate().get("east"));
    }
}
