//! Fixtures and test doubles shared by the feed tests.

use async_trait::async_trait;
use neo_common::NearEarthObjectSummary;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::api_client::FeedSource;
use super::cache::ResultCache;
use super::error::{CacheError, UpstreamError};
use super::types::{DateRange, RawFeedResponse};

/// One raw object in the provider's full shape.
pub fn raw_object_json(id: &str, min_miles: f64, max_miles: f64, miss_miles: &str, mph: &str, hazardous: bool) -> Value {
    json!({
        "links": { "self": "http://api.nasa.gov/neo/rest/v1/neo/test" },
        "id": id,
        "neo_reference_id": id,
        "name": format!("({})", id),
        "nasa_jpl_url": "https://ssd.jpl.nasa.gov/tools/sbdb_lookup.html",
        "absolute_magnitude_h": 21.0,
        "estimated_diameter": {
            "kilometers": { "estimated_diameter_min": min_miles * 1.609344, "estimated_diameter_max": max_miles * 1.609344 },
            "meters": { "estimated_diameter_min": min_miles * 1609.344, "estimated_diameter_max": max_miles * 1609.344 },
            "miles": { "estimated_diameter_min": min_miles, "estimated_diameter_max": max_miles },
            "feet": { "estimated_diameter_min": min_miles * 5280.0, "estimated_diameter_max": max_miles * 5280.0 }
        },
        "is_potentially_hazardous_asteroid": hazardous,
        "close_approach_data": [
            {
                "close_approach_date": "2025-08-21",
                "close_approach_date_full": "2025-Aug-21 12:00",
                "epoch_date_close_approach": 1755777600000i64,
                "relative_velocity": {
                    "kilometers_per_second": "10.22",
                    "kilometers_per_hour": "36792.5",
                    "miles_per_hour": mph
                },
                "miss_distance": {
                    "astronomical": "0.0246",
                    "lunar": "9.5644",
                    "kilometers": "3680545.5",
                    "miles": miss_miles
                },
                "orbiting_body": "Earth"
            }
        ],
        "is_sentry_object": false
    })
}

/// Single-object feed matching the documented `(2010 PK9)` example.
pub fn sample_feed_json() -> Value {
    let mut object = raw_object_json("3542519", 0.015, 0.034, "2287123.4", "22856.3", false);
    object["name"] = json!("(2010 PK9)");
    json!({
        "links": { "self": "test" },
        "element_count": 1,
        "near_earth_objects": { "2025-08-21": [object] }
    })
}

pub fn sample_feed() -> RawFeedResponse {
    serde_json::from_value(sample_feed_json()).expect("sample feed decodes")
}

pub fn summary(id: &str, size: f64, close_approach: f64, velocity: f64) -> NearEarthObjectSummary {
    NearEarthObjectSummary {
        id: id.to_string(),
        name: format!("Object {}", id),
        size,
        close_approach,
        velocity,
        is_potentially_hazardous: false,
    }
}

/// Feed source returning a canned result and counting calls.
pub struct CountingSource {
    result: Result<RawFeedResponse, UpstreamError>,
    calls: AtomicUsize,
    delay: Duration,
}

impl CountingSource {
    pub fn ok(feed: RawFeedResponse) -> Self {
        Self {
            result: Ok(feed),
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    pub fn failing(err: UpstreamError) -> Self {
        Self {
            result: Err(err),
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedSource for CountingSource {
    async fn fetch(&self, _range: &DateRange) -> Result<RawFeedResponse, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.result.clone()
    }
}

/// Cache whose every operation fails.
#[derive(Default)]
pub struct BrokenCache {
    pub get_calls: AtomicUsize,
    pub set_calls: AtomicUsize,
}

#[async_trait]
impl ResultCache for BrokenCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn set(&self, _key: &str, _payload: String, _ttl: Duration) -> Result<(), CacheError> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Unavailable("connection refused".to_string()))
    }
}

/// Cache recording writes, optionally pre-seeded, without expiry.
#[derive(Default)]
pub struct RecordingCache {
    pub entries: Mutex<HashMap<String, String>>,
    pub writes: Mutex<Vec<(String, Duration)>>,
}

impl RecordingCache {
    pub fn seeded(key: &str, payload: &str) -> Self {
        let cache = Self::default();
        cache
            .entries
            .lock()
            .expect("cache mutex")
            .insert(key.to_string(), payload.to_string());
        cache
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().expect("cache mutex").len()
    }
}

#[async_trait]
impl ResultCache for RecordingCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.lock().expect("cache mutex").get(key).cloned())
    }

    async fn set(&self, key: &str, payload: String, ttl: Duration) -> Result<(), CacheError> {
        self.writes
            .lock()
            .expect("cache mutex")
            .push((key.to_string(), ttl));
        self.entries
            .lock()
            .expect("cache mutex")
            .insert(key.to_string(), payload);
        Ok(())
    }
}
