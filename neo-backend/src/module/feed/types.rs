//! Upstream feed payload and validated query types

use chrono::NaiveDate;
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use super::error::ValidationError;

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("date pattern is a valid regex"));

/// Inclusive calendar date range of a feed query.
///
/// Only constructed through [`DateRange::parse`] / [`DateRange::new`], so
/// `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvertedRange);
        }
        Ok(Self { start, end })
    }

    /// Validate raw `YYYY-MM-DD` strings: syntax first (both bounds), then
    /// calendar validity, then ordering.
    pub fn parse(start: &str, end: &str) -> Result<Self, ValidationError> {
        if !DATE_PATTERN.is_match(start) || !DATE_PATTERN.is_match(end) {
            return Err(ValidationError::InvalidFormat);
        }

        let start = NaiveDate::parse_from_str(start, "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidDate)?;
        let end = NaiveDate::parse_from_str(end, "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidDate)?;

        Self::new(start, end)
    }

    /// Same as [`DateRange::parse`], for optional query parameters.
    pub fn from_params(start: Option<&str>, end: Option<&str>) -> Result<Self, ValidationError> {
        let start = start.ok_or(ValidationError::MissingParameter("start"))?;
        let end = end.ok_or(ValidationError::MissingParameter("end"))?;
        Self::parse(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of calendar days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Response of the upstream `/feed` endpoint.
///
/// Date buckets keep the order in which the provider sent them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFeedResponse {
    #[serde(default)]
    pub element_count: Option<u64>,

    pub near_earth_objects: IndexMap<String, Vec<RawObjectRecord>>,
}

impl RawFeedResponse {
    /// Total number of object records across all date buckets.
    pub fn record_count(&self) -> usize {
        self.near_earth_objects.values().map(Vec::len).sum()
    }
}

/// One object entry inside a date bucket.
///
/// Numeric fields are optional here so a missing value surfaces as
/// malformed data during the transform rather than a decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawObjectRecord {
    pub id: String,

    #[serde(default)]
    pub neo_reference_id: Option<String>,

    pub name: String,

    #[serde(default)]
    pub nasa_jpl_url: Option<String>,

    #[serde(default)]
    pub absolute_magnitude_h: Option<f64>,

    #[serde(default)]
    pub estimated_diameter: EstimatedDiameter,

    /// Required: a record without it does not decode
    pub is_potentially_hazardous_asteroid: bool,

    /// Provider order is kept; the first entry is the one summarized
    #[serde(default)]
    pub close_approach_data: Vec<CloseApproach>,

    #[serde(default)]
    pub is_sentry_object: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EstimatedDiameter {
    #[serde(default)]
    pub kilometers: Option<DiameterRange>,
    #[serde(default)]
    pub meters: Option<DiameterRange>,
    #[serde(default)]
    pub miles: Option<DiameterRange>,
    #[serde(default)]
    pub feet: Option<DiameterRange>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiameterRange {
    #[serde(default)]
    pub estimated_diameter_min: Option<f64>,
    #[serde(default)]
    pub estimated_diameter_max: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CloseApproach {
    #[serde(default)]
    pub close_approach_date: Option<String>,

    #[serde(default)]
    pub close_approach_date_full: Option<String>,

    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub epoch_date_close_approach: Option<i64>,

    #[serde(default)]
    pub relative_velocity: RelativeVelocity,

    #[serde(default)]
    pub miss_distance: MissDistance,

    #[serde(default)]
    pub orbiting_body: Option<String>,
}

/// Provider sends these as decimal strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelativeVelocity {
    #[serde(default)]
    pub kilometers_per_second: Option<String>,
    #[serde(default)]
    pub kilometers_per_hour: Option<String>,
    #[serde(default)]
    pub miles_per_hour: Option<String>,
}

/// Provider sends these as decimal strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MissDistance {
    #[serde(default)]
    pub astronomical: Option<String>,
    #[serde(default)]
    pub lunar: Option<String>,
    #[serde(default)]
    pub kilometers: Option<String>,
    #[serde(default)]
    pub miles: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_range() {
        let range = DateRange::parse("2025-08-21", "2025-08-27").unwrap();
        assert_eq!(range.start().to_string(), "2025-08-21");
        assert_eq!(range.end().to_string(), "2025-08-27");
        assert_eq!(range.days(), 7);
    }

    #[test]
    fn test_parse_single_day() {
        let range = DateRange::parse("2025-08-21", "2025-08-21").unwrap();
        assert_eq!(range.days(), 1);
    }

    #[test]
    fn test_parse_bad_format() {
        for (start, end) in [
            ("2025-8-21", "2025-08-22"),
            ("2025-08-21", "21/08/2025"),
            ("20250821", "2025-08-22"),
            ("2025-08-21T00:00", "2025-08-22"),
            ("", "2025-08-22"),
            (" 2025-08-21", "2025-08-22"),
        ] {
            assert_eq!(
                DateRange::parse(start, end),
                Err(ValidationError::InvalidFormat),
                "{start} / {end}"
            );
        }
    }

    #[test]
    fn test_parse_bad_value() {
        assert_eq!(
            DateRange::parse("2025-13-01", "2025-12-31"),
            Err(ValidationError::InvalidDate)
        );
        assert_eq!(
            DateRange::parse("2025-02-01", "2025-02-30"),
            Err(ValidationError::InvalidDate)
        );
        assert_eq!(
            DateRange::parse("2025-00-10", "2025-01-10"),
            Err(ValidationError::InvalidDate)
        );
    }

    #[test]
    fn test_parse_inverted() {
        assert_eq!(
            DateRange::parse("2025-08-22", "2025-08-21"),
            Err(ValidationError::InvertedRange)
        );
    }

    #[test]
    fn test_from_params_missing() {
        assert_eq!(
            DateRange::from_params(None, Some("2025-08-21")),
            Err(ValidationError::MissingParameter("start"))
        );
        assert_eq!(
            DateRange::from_params(Some("2025-08-21"), None),
            Err(ValidationError::MissingParameter("end"))
        );
    }

    #[test]
    fn test_feed_keeps_bucket_order() {
        let json = r#"{
            "element_count": 2,
            "near_earth_objects": {
                "2025-08-23": [{"id": "b", "name": "B", "is_potentially_hazardous_asteroid": false}],
                "2025-08-21": [{"id": "a", "name": "A", "is_potentially_hazardous_asteroid": true}]
            }
        }"#;
        let feed: RawFeedResponse = serde_json::from_str(json).unwrap();
        let dates: Vec<&str> = feed.near_earth_objects.keys().map(|k| k.as_str()).collect();
        assert_eq!(dates, vec!["2025-08-23", "2025-08-21"]);
        assert_eq!(feed.record_count(), 2);
        assert!(feed.near_earth_objects["2025-08-21"][0].close_approach_data.is_empty());
        assert!(feed.near_earth_objects["2025-08-21"][0].is_potentially_hazardous_asteroid);
    }

    #[test]
    fn test_record_without_hazard_flag_does_not_decode() {
        let json = r#"{
            "near_earth_objects": {
                "2025-08-21": [{"id": "a", "name": "A", "close_approach_data": []}]
            }
        }"#;
        let result = serde_json::from_str::<RawFeedResponse>(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_non_ascii_digits_is_bad_format() {
        assert_eq!(
            DateRange::parse("\u{662}\u{660}\u{662}\u{665}-\u{660}\u{668}-\u{662}\u{661}", "2025-08-22"),
            Err(ValidationError::InvalidFormat)
        );
        assert_eq!(
            DateRange::parse("2025-08-21", "\u{ff12}025-08-22"),
            Err(ValidationError::InvalidFormat)
        );
    }
}
