//! HTTP surface: `/health`, `/api/v1/objects` and the OpenAPI docs under `/docs`.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderName, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use neo_common::{ErrorResponse, HealthResponse, NearEarthObjectSummary, SortCriterion};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::module::feed::{FeedQuery, NeoError, NeoService, ResultSource};

const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Location of the generated OpenAPI document.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(title = "NEO Feed API", description = "Near-Earth objects approaching Earth, ranked and cached"),
    paths(list_objects, health_check),
    components(schemas(NearEarthObjectSummary, SortCriterion, ErrorResponse, HealthResponse)),
    tags(
        (name = "objects", description = "Near-Earth object feed"),
        (name = "health", description = "Service liveness")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<NeoService>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(service: Arc<NeoService>) -> Self {
        Self {
            service,
            started_at: Instant::now(),
        }
    }
}

/// Build the application router. `cors_origin` restricts CORS to a single
/// origin; any origin is allowed when it is unset or unparseable.
pub fn create_router(state: AppState, cors_origin: Option<&str>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/objects", get(list_objects))
        .merge(SwaggerUi::new("/docs").url(OPENAPI_PATH, ApiDoc::openapi()))
        .with_state(state)
        .layer(cors_layer(cors_origin))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_headers(Any);

    match origin.map(HeaderValue::from_str) {
        Some(Ok(value)) => layer.allow_origin(value),
        Some(Err(e)) => {
            warn!("Ignoring invalid CORS origin: {}", e);
            layer.allow_origin(Any)
        }
        None => layer.allow_origin(Any),
    }
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    summary = "Liveness check",
    responses((status = 200, description = "Service is running", body = HealthResponse))
)]
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        uptime: state.started_at.elapsed().as_secs_f64(),
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/objects",
    tag = "objects",
    summary = "List near-Earth objects approaching in a date window",
    params(FeedQuery),
    responses(
        (status = 200, description = "Objects ranked by the requested criterion", body = Vec<NearEarthObjectSummary>),
        (status = 400, description = "Missing or invalid date parameters", body = ErrorResponse),
        (status = 500, description = "Upstream or internal failure", body = ErrorResponse)
    )
)]
async fn list_objects(
    State(state): State<AppState>,
    query: Result<Query<FeedQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            debug!("Rejected query string: {}", rejection);
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request(rejection.body_text())),
            )
                .into_response();
        }
    };

    match state.service.query(&query).await {
        Ok(outcome) => {
            let cache_status = match outcome.source {
                ResultSource::Cache => "HIT",
                ResultSource::Upstream => "MISS",
            };
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "application/json"),
                    (X_CACHE, cache_status),
                ],
                outcome.payload,
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

impl IntoResponse for NeoError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, body) = if self.is_client_error() {
            debug!("Client error: {}", message);
            (StatusCode::BAD_REQUEST, ErrorResponse::bad_request(message))
        } else {
            error!("Request failed: {:?}", self);
            (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::internal(message))
        };
        (status, Json(body)).into_response()
    }
}
