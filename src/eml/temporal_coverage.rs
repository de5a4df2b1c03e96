//! `<temporalCoverage>`: a single date, or a range of dates, each with
//! an optional time of day.
//!
//! Only one shape is written. A begin date alone becomes a
//! `<singleDateTime>`; a begin and an end date become a
//! `<rangeOfDates>`. Anything else is not written at all.

use super::change::NodeKind;
use super::error::ValidationErrors;
use super::extract;
use super::names::{NameEntry, NodeNameMap, EML_VOCABULARY};
use super::node::{Node, ParseContext, Schema, Slot};
use crate::dom::Element;

pub const NAMES: &[NameEntry] = &[
    ("begindate", "beginDate"),
    ("calendardate", "calendarDate"),
    ("enddate", "endDate"),
    ("rangeofdates", "rangeOfDates"),
    ("singledatetime", "singleDateTime"),
    ("temporalcoverage", "temporalCoverage"),
];

static TEMPORAL_NAMES: NodeNameMap = NodeNameMap::new(&[NAMES, EML_VOCABULARY]);

const DATE_FORMAT: &str = "must be formatted as YYYY-MM-DD or YYYY.";
const TIME_FORMAT: &str = "Time must be formatted as HH:MM:SS";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemporalCoverage {
    pub begin_date: Option<String>,
    pub begin_time: Option<String>,
    pub end_date: Option<String>,
    pub end_time: Option<String>,
}

pub type EmlTemporalCoverage = Node<TemporalCoverage>;

impl TemporalCoverage {
    pub fn single(date: &str) -> TemporalCoverage {
        TemporalCoverage {
            begin_date: Some(date.to_owned()),
            ..TemporalCoverage::default()
        }
    }

    pub fn range(begin: &str, end: &str) -> TemporalCoverage {
        TemporalCoverage {
            begin_date: Some(begin.to_owned()),
            end_date: Some(end.to_owned()),
            ..TemporalCoverage::default()
        }
    }

    fn begin(&self) -> Option<&str> {
        present(&self.begin_date)
    }

    fn end(&self) -> Option<&str> {
        present(&self.end_date)
    }

    fn point<'d>(slot: &Slot<'_, 'd>, name: &str, date: &str, time: Option<&str>) -> Element<'d> {
        let point = slot.create(name);
        point.append_child(slot.create_leaf("calendarDate", date));
        if let Some(time) = time {
            point.append_child(slot.create_leaf("time", time));
        }
        point
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_point(point: Option<Element<'_>>) -> (Option<String>, Option<String>) {
    (
        extract::non_empty_text(point, "calendarDate"),
        extract::non_empty_text(point, "time"),
    )
}

impl Schema for TemporalCoverage {
    const KIND: NodeKind = NodeKind::TemporalCoverage;
    const ROOT: &'static str = "temporalCoverage";
    const EXCLUSIVE: bool = true;

    fn names() -> &'static NodeNameMap {
        &TEMPORAL_NAMES
    }

    fn node_order() -> &'static [&'static str] {
        &["singleDateTime", "rangeOfDates"]
    }

    fn parse(element: Element<'_>, _cx: &ParseContext<'_>) -> TemporalCoverage {
        if let Some(range) = extract::child(Some(element), "rangeOfDates") {
            let (begin_date, begin_time) = parse_point(extract::child(Some(range), "beginDate"));
            let (end_date, end_time) = parse_point(extract::child(Some(range), "endDate"));
            return TemporalCoverage {
                begin_date,
                begin_time,
                end_date,
                end_time,
            };
        }

        let (begin_date, begin_time) = parse_point(extract::child(Some(element), "singleDateTime"));
        TemporalCoverage {
            begin_date,
            begin_time,
            ..TemporalCoverage::default()
        }
    }

    fn inject<'d>(&self, slot: &Slot<'_, 'd>) -> Option<Vec<Element<'d>>> {
        let begin_time = present(&self.begin_time);
        let end_time = present(&self.end_time);

        match slot.name() {
            "singleDateTime" => Some(match (self.begin(), self.end()) {
                (Some(begin), None) => vec![TemporalCoverage::point(slot, slot.name(), begin, begin_time)],
                _ => Vec::new(),
            }),
            "rangeOfDates" => Some(match (self.begin(), self.end()) {
                (Some(begin), Some(end)) => {
                    let range = slot.element();
                    range.append_child(TemporalCoverage::point(slot, "beginDate", begin, begin_time));
                    range.append_child(TemporalCoverage::point(slot, "endDate", end, end_time));
                    vec![range]
                }
                _ => Vec::new(),
            }),
            _ => None,
        }
    }

    fn is_empty(&self) -> bool {
        [&self.begin_date, &self.begin_time, &self.end_date, &self.end_time]
            .iter()
            .all(|v| present(v).is_none())
    }

    fn emits_output(&self) -> bool {
        self.begin().is_some()
    }

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        let begin_date = self.begin();
        let end_date = self.end();
        let begin_time = present(&self.begin_time);
        let end_time = present(&self.end_time);

        if begin_date.is_none() {
            errors.set("beginDate", "Provide a begin date.");
        } else if end_time.is_some() && end_date.is_none() {
            errors.set("endDate", "Provide an end date.");
        }

        if let Some(date) = begin_date {
            if !is_date_format_valid(date) {
                errors.set("beginDate", format!("The begin date {}", DATE_FORMAT));
            }
        }
        if let Some(date) = end_date {
            if !is_date_format_valid(date) {
                errors.set("endDate", format!("The end date {}", DATE_FORMAT));
            }
        }

        if end_date.is_some() {
            if begin_date.map_or(false, is_not_positive) {
                errors.set("beginDate", "The begin date must be greater than zero.");
            }
            if end_date.map_or(false, is_not_positive) {
                errors.set("endDate", "The end date must be greater than zero.");
            }
        }

        if let Some(message) = begin_time.and_then(time_format_error) {
            errors.set("beginTime", message);
        }
        if let Some(message) = end_time.and_then(time_format_error) {
            errors.set("endTime", message);
        }

        if let (Some(begin), Some(end)) = (begin_date, end_date) {
            if is_later_date(begin, end) {
                errors.set("beginDate", "The begin date must be before the end date.");
            }
            if let (Some(begin_time), Some(end_time)) = (begin_time, end_time) {
                if date_parts(begin) == date_parts(end) && time_parts(begin_time) > time_parts(end_time) {
                    errors.set("beginTime", "The begin time must be before the end time.");
                }
            }
        }

        errors
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn is_leap_year(year: u32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// `YYYY`, or a real calendar day as `YYYY-MM-DD`.
pub fn is_date_format_valid(date: &str) -> bool {
    if date.len() == 4 {
        return is_digits(date);
    }

    let parts = date_parts(date);
    let widths_match = parts.len() == 3 && parts[0].len() == 4 && parts[1].len() == 2 && parts[2].len() == 2;
    if !widths_match || !parts.iter().all(|p| is_digits(p)) {
        return false;
    }

    let number = |s: &str| s.parse::<u32>().unwrap_or(0);
    let (year, month, day) = (number(parts[0]), number(parts[1]), number(parts[2]));

    let last_day = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => return false,
    };
    (1..=last_day).contains(&day)
}

/// A problem with an `HH:MM:SS` time, optionally suffixed with `Z`.
pub fn time_format_error(time: &str) -> Option<&'static str> {
    let time = time.trim_end_matches('Z');
    let parts = time_parts(time);
    if time.len() != 8 || parts.len() != 3 || !parts.iter().all(|p| p.len() == 2 && is_digits(p)) {
        return Some(TIME_FORMAT);
    }

    let number = |s: &str| s.parse::<u32>().unwrap_or(0);
    let (hour, minute, second) = (number(parts[0]), number(parts[1]), number(parts[2]));

    if hour == 24 && (minute != 0 || second != 0) {
        Some("The midnight hour starts at 00:00:00 and ends at 00:59:59.")
    } else if hour > 24 {
        Some("Time of the day starts at 00:00 and ends at 23:59.")
    } else if minute > 59 {
        Some("Minutes should be between 00 and 59.")
    } else if second > 59 {
        Some("Seconds should be between 00 and 59.")
    } else {
        None
    }
}

fn is_not_positive(date: &str) -> bool {
    date.parse::<i64>().map_or(false, |n| n <= 0)
}

fn date_parts(date: &str) -> Vec<&str> {
    date.split('-').collect()
}

fn time_parts(time: &str) -> Vec<&str> {
    time.split(':').collect()
}

/// Dates of the same shape compare part by part; otherwise only the
/// years are compared.
fn is_later_date(begin: &str, end: &str) -> bool {
    let begin = date_parts(begin);
    let end = date_parts(end);
    if begin.len() == end.len() {
        begin > end
    } else {
        begin[0] > end[0]
    }
}

impl Node<TemporalCoverage> {
    pub fn set_begin(&mut self, date: Option<&str>, time: Option<&str>) {
        let (date, time) = (date.map(str::to_owned), time.map(str::to_owned));
        self.update(|c| {
            c.begin_date = date;
            c.begin_time = time;
        });
    }

    pub fn set_end(&mut self, date: Option<&str>, time: Option<&str>) {
        let (date, time) = (date.map(str::to_owned), time.map(str::to_owned));
        self.update(|c| {
            c.end_date = date;
            c.end_time = time;
        });
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::eml::node::verify;

    #[test]
    fn schema_is_consistent() {
        assert_eq!(Ok(()), verify::<TemporalCoverage>());
    }

    #[test]
    fn a_begin_date_alone_is_a_single_date() {
        let mut coverage = EmlTemporalCoverage::new(TemporalCoverage::single("2015"));

        assert_eq!(
            "<temporalCoverage><singleDateTime><calendarDate>2015</calendarDate></singleDateTime></temporalCoverage>",
            coverage.serialize()
        );
    }

    #[test]
    fn both_dates_make_a_range() {
        let mut coverage = EmlTemporalCoverage::new(TemporalCoverage::range("2010-01-01", "2012-12-31"));
        coverage.set_begin(Some("2010-01-01"), Some("08:00:00"));

        assert_eq!(
            "<temporalCoverage><rangeOfDates><beginDate><calendarDate>2010-01-01</calendarDate><time>08:00:00</time></beginDate><endDate><calendarDate>2012-12-31</calendarDate></endDate></rangeOfDates></temporalCoverage>",
            coverage.serialize()
        );
    }

    #[test]
    fn an_end_date_alone_writes_nothing() {
        let mut coverage = EmlTemporalCoverage::new(TemporalCoverage {
            end_date: Some("2012".into()),
            ..TemporalCoverage::default()
        });

        assert!(!coverage.is_empty());
        assert_eq!("", coverage.serialize());
        assert_eq!(Some("Provide a begin date."), coverage.validate().get("beginDate"));
    }

    #[test]
    fn an_empty_coverage_is_invalid_and_writes_nothing() {
        let mut coverage = EmlTemporalCoverage::default();

        assert!(!coverage.is_valid());
        assert_eq!("", coverage.serialize());
    }

    #[test]
    fn parsing_prefers_the_range() {
        let coverage = EmlTemporalCoverage::from_xml(
            "<temporalCoverage><singleDateTime><calendarDate>1999</calendarDate></singleDateTime><rangeOfDates><beginDate><calendarDate>2001</calendarDate></beginDate><endDate><calendarDate>2002</calendarDate><time>10:00:00</time></endDate></rangeOfDates></temporalCoverage>",
            None,
        )
        .unwrap();

        assert_eq!(
            &TemporalCoverage {
                begin_date: Some("2001".into()),
                begin_time: None,
                end_date: Some("2002".into()),
                end_time: Some("10:00:00".into()),
            },
            coverage.attributes()
        );
    }

    #[test]
    fn switching_shape_replaces_the_old_one() {
        let mut coverage = EmlTemporalCoverage::from_xml(
            "<temporalCoverage id='t1'><singleDateTime><calendarDate>2001</calendarDate></singleDateTime></temporalCoverage>",
            None,
        )
        .unwrap();
        coverage.set_end(Some("2003"), None);

        assert_eq!(
            r#"<temporalCoverage id="t1"><rangeOfDates><beginDate><calendarDate>2001</calendarDate></beginDate><endDate><calendarDate>2003</calendarDate></endDate></rangeOfDates></temporalCoverage>"#,
            coverage.serialize()
        );
    }

    #[test]
    fn an_end_time_needs_an_end_date() {
        let coverage = EmlTemporalCoverage::new(TemporalCoverage {
            begin_date: Some("2001".into()),
            end_time: Some("10:00:00".into()),
            ..TemporalCoverage::default()
        });

        assert_eq!(Some("Provide an end date."), coverage.validate().get("endDate"));
    }

    #[test]
    fn a_begin_time_needs_a_begin_date() {
        let mut coverage = EmlTemporalCoverage::new(TemporalCoverage {
            begin_time: Some("10:00:00".into()),
            ..TemporalCoverage::default()
        });

        assert_eq!(Some("Provide a begin date."), coverage.validate().get("beginDate"));
        assert_eq!(None, coverage.validate().get("beginTime"));
        assert!(!coverage.is_valid());
        assert_eq!("", coverage.serialize());
    }

    #[test]
    fn dates_are_checked_against_the_calendar() {
        assert!(is_date_format_valid("2015"));
        assert!(is_date_format_valid("2016-02-29"));
        assert!(!is_date_format_valid("2015-02-29"));
        assert!(!is_date_format_valid("1900-02-29"));
        assert!(is_date_format_valid("2000-02-29"));
        assert!(!is_date_format_valid("2015-04-31"));
        assert!(!is_date_format_valid("2015-13-01"));
        assert!(!is_date_format_valid("15-01-01"));
        assert!(!is_date_format_valid("20a5"));
    }

    #[test]
    fn bad_dates_are_reported() {
        let coverage = EmlTemporalCoverage::new(TemporalCoverage::range("2015-02-30", "soon"));
        let errors = coverage.validate();

        assert_eq!(
            Some("The begin date must be formatted as YYYY-MM-DD or YYYY."),
            errors.get("beginDate")
        );
        assert_eq!(Some("The end date must be formatted as YYYY-MM-DD or YYYY."), errors.get("endDate"));
    }

    #[test]
    fn times_are_checked() {
        assert_eq!(None, time_format_error("23:59:59"));
        assert_eq!(None, time_format_error("12:00:00Z"));
        assert_eq!(None, time_format_error("24:00:00"));
        assert_eq!(Some(TIME_FORMAT), time_format_error("9:00"));
        assert_eq!(Some(TIME_FORMAT), time_format_error("ab:cd:ef"));
        assert_eq!(
            Some("The midnight hour starts at 00:00:00 and ends at 00:59:59."),
            time_format_error("24:30:00")
        );
        assert_eq!(Some("Time of the day starts at 00:00 and ends at 23:59."), time_format_error("25:00:00"));
        assert_eq!(Some("Minutes should be between 00 and 59."), time_format_error("10:60:00"));
        assert_eq!(Some("Seconds should be between 00 and 59."), time_format_error("10:00:61"));
    }

    #[test]
    fn the_range_must_run_forwards() {
        let reversed = EmlTemporalCoverage::new(TemporalCoverage::range("2012-05-01", "2012-04-30"));
        assert_eq!(
            Some("The begin date must be before the end date."),
            reversed.validate().get("beginDate")
        );

        let same_day = EmlTemporalCoverage::new(TemporalCoverage {
            begin_date: Some("2012-05-01".into()),
            begin_time: Some("12:00:00".into()),
            end_date: Some("2012-05-01".into()),
            end_time: Some("11:00:00".into()),
        });
        assert_eq!(
            Some("The begin time must be before the end time."),
            same_day.validate().get("beginTime")
        );

        let forwards = EmlTemporalCoverage::new(TemporalCoverage::range("2012", "2013-01-01"));
        assert!(forwards.is_valid());
    }

    #[test]
    fn year_zero_is_rejected_in_a_range() {
        let coverage = EmlTemporalCoverage::new(TemporalCoverage::range("0000", "2000"));

        assert_eq!(Some("The begin date must be greater than zero."), coverage.validate().get("beginDate"));
    }
}
