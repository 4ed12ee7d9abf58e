//! Flattening of the nested feed payload into summary records

use neo_common::NearEarthObjectSummary;

use super::error::NeoError;
use super::types::{CloseApproach, RawFeedResponse, RawObjectRecord};

/// Summaries in upstream order plus the number of records dropped for
/// having no close-approach data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transformed {
    pub objects: Vec<NearEarthObjectSummary>,
    pub skipped: usize,
}

/// Round half away from zero at the second decimal.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Objects without any close approach are skipped, not rejected.
pub fn has_close_approach(record: &RawObjectRecord) -> bool {
    !record.close_approach_data.is_empty()
}

/// Flatten every date bucket, then every record, keeping provider order.
///
/// Fails as a whole on the first record whose required numbers are missing,
/// unparseable, negative or non-finite.
pub fn transform(raw: RawFeedResponse) -> Result<Transformed, NeoError> {
    let mut result = Transformed::default();

    for (date, records) in raw.near_earth_objects {
        for record in records {
            if !has_close_approach(&record) {
                tracing::debug!("Skipping {} ({}) on {}: no close-approach data", record.name, record.id, date);
                result.skipped += 1;
                continue;
            }
            result.objects.push(summarize(record)?);
        }
    }

    Ok(result)
}

fn summarize(record: RawObjectRecord) -> Result<NearEarthObjectSummary, NeoError> {
    let miles = record
        .estimated_diameter
        .miles
        .as_ref()
        .ok_or_else(|| malformed(&record.id, "estimated_diameter.miles"))?;
    let min = check(
        miles.estimated_diameter_min,
        &record.id,
        "estimated_diameter.miles.estimated_diameter_min",
    )?;
    let max = check(
        miles.estimated_diameter_max,
        &record.id,
        "estimated_diameter.miles.estimated_diameter_max",
    )?;

    // Positional first, not the nearest approach
    let approach: &CloseApproach = record
        .close_approach_data
        .first()
        .ok_or_else(|| malformed(&record.id, "close_approach_data"))?;
    let miss = parse_decimal(
        approach.miss_distance.miles.as_deref(),
        &record.id,
        "miss_distance.miles",
    )?;
    let velocity = parse_decimal(
        approach.relative_velocity.miles_per_hour.as_deref(),
        &record.id,
        "relative_velocity.miles_per_hour",
    )?;

    Ok(NearEarthObjectSummary {
        size: round2((min + max) / 2.0),
        close_approach: round2(miss),
        velocity: round2(velocity),
        is_potentially_hazardous: record.is_potentially_hazardous_asteroid,
        id: record.id,
        name: record.name,
    })
}

fn parse_decimal(value: Option<&str>, id: &str, field: &str) -> Result<f64, NeoError> {
    let text = value.ok_or_else(|| malformed(id, field))?;
    let parsed = text
        .trim()
        .parse::<f64>()
        .map_err(|_| malformed(id, &format!("{} = {:?}", field, text)))?;
    check(Some(parsed), id, field)
}

fn check(value: Option<f64>, id: &str, field: &str) -> Result<f64, NeoError> {
    match value {
        Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
        Some(v) => Err(malformed(id, &format!("{} = {}", field, v))),
        None => Err(malformed(id, field)),
    }
}

fn malformed(id: &str, field: &str) -> NeoError {
    NeoError::MalformedUpstreamData(format!("object {}: missing or invalid {}", id, field))
}
