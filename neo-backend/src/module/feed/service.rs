//! Query orchestration over the feed source and the result cache

use neo_common::{NearEarthObjectSummary, SortCriterion};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use utoipa::IntoParams;

use super::api_client::FeedSource;
use super::cache::{ResultCache, cache_key};
use super::error::NeoError;
use super::rank::rank;
use super::transform::transform;
use super::types::DateRange;

/// Raw boundary parameters of `GET /objects`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FeedQuery {
    /// First day of the window, `YYYY-MM-DD` (required)
    #[param(example = "2025-08-21")]
    pub start: Option<String>,
    /// Last day of the window, `YYYY-MM-DD` (required)
    #[param(example = "2025-08-27")]
    pub end: Option<String>,
    /// Ranking; unknown values fall back to `closeness`
    #[param(value_type = Option<SortCriterion>)]
    pub sort: Option<String>,
}

/// Where a result list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSource {
    Cache,
    Upstream,
}

/// Ranked result of a query, with the exact JSON body to serve.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub cache_key: String,
    pub source: ResultSource,
    pub objects: Vec<NearEarthObjectSummary>,
    pub payload: String,
}

/// Query orchestrator: validate, consult the cache, otherwise fetch,
/// transform, rank and store.
///
/// Concurrent misses on the same key each go upstream and each write the
/// cache; the last write wins.
pub struct NeoService {
    source: Arc<dyn FeedSource>,
    cache: Arc<dyn ResultCache>,
    cache_ttl: Duration,
}

impl NeoService {
    pub fn new(source: Arc<dyn FeedSource>, cache: Arc<dyn ResultCache>, cache_ttl: Duration) -> Self {
        Self {
            source,
            cache,
            cache_ttl,
        }
    }

    /// Validate raw parameters and run the query. Validation failures never
    /// reach the cache or the upstream.
    #[tracing::instrument(
        name = "neo_query",
        skip_all,
        fields(request_id = %uuid::Uuid::now_v7(), start = ?query.start, end = ?query.end, sort = ?query.sort)
    )]
    pub async fn query(&self, query: &FeedQuery) -> Result<QueryOutcome, NeoError> {
        let range = match DateRange::from_params(query.start.as_deref(), query.end.as_deref()) {
            Ok(range) => range,
            Err(e) => {
                debug!("Rejected query: {}", e);
                return Err(e.into());
            }
        };
        let sort = SortCriterion::from_param(query.sort.as_deref());

        self.query_range(range, sort).await
    }

    /// Run a query for an already validated range.
    pub async fn query_range(&self, range: DateRange, sort: SortCriterion) -> Result<QueryOutcome, NeoError> {
        let key = cache_key(&range, sort);

        if let Some((objects, payload)) = self.lookup(&key).await {
            info!("Cache hit for key: {}", key);
            return Ok(QueryOutcome {
                cache_key: key,
                source: ResultSource::Cache,
                objects,
                payload,
            });
        }

        info!("Cache miss for key: {}. Fetching from NASA API...", key);

        let raw = self.source.fetch(&range).await.map_err(|e| {
            let err = NeoError::from(e);
            error!("Feed fetch failed for {}: {:?}", key, err);
            err
        })?;

        let transformed = transform(raw).map_err(|e| {
            error!("Feed transform failed for {}: {:?}", key, e);
            e
        })?;
        if transformed.skipped > 0 {
            info!(
                "Skipped {} objects without close-approach data for {}",
                transformed.skipped, key
            );
        }

        let objects = rank(&transformed.objects, sort);
        let payload = serde_json::to_string(&objects).map_err(|e| NeoError::Internal(e.to_string()))?;

        self.store(&key, &payload).await;

        info!("Successfully fetched and cached {} objects", objects.len());

        Ok(QueryOutcome {
            cache_key: key,
            source: ResultSource::Upstream,
            objects,
            payload,
        })
    }

    /// Cache read that degrades every failure to a miss.
    async fn lookup(&self, key: &str) -> Option<(Vec<NearEarthObjectSummary>, String)> {
        let payload = match self.cache.get(key).await {
            Ok(Some(payload)) => payload,
            Ok(None) => return None,
            Err(e) => {
                warn!("Cache read failed for {}, treating as miss: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str::<Vec<NearEarthObjectSummary>>(&payload) {
            Ok(objects) => Some((objects, payload)),
            Err(e) => {
                warn!("Discarding undecodable cache entry {}: {}", key, e);
                None
            }
        }
    }

    /// Cache write whose failure never fails the request.
    async fn store(&self, key: &str, payload: &str) {
        if let Err(e) = self.cache.set(key, payload.to_string(), self.cache_ttl).await {
            warn!("Cache write failed for {}: {}", key, e);
        }
    }
}
