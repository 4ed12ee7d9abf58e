use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Ranking criterion for a list of near-Earth objects.
///
/// `Closeness` is both an explicit mode and the fallback for any
/// unrecognized query value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Default)]
pub enum SortCriterion {
    #[serde(rename = "size")]
    Size,
    #[serde(rename = "velocity")]
    Velocity,
    #[default]
    #[serde(rename = "closeness")]
    Closeness,
}

impl SortCriterion {
    pub const ALL: [SortCriterion; 3] = [
        SortCriterion::Size,
        SortCriterion::Velocity,
        SortCriterion::Closeness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortCriterion::Size => "size",
            SortCriterion::Velocity => "velocity",
            SortCriterion::Closeness => "closeness",
        }
    }

    /// Normalize a raw `sort` query value. Absent or unknown values map to
    /// `Closeness`; this never fails.
    pub fn from_param(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }
}

impl std::fmt::Display for SortCriterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SortCriterion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "size" => Ok(SortCriterion::Size),
            "velocity" => Ok(SortCriterion::Velocity),
            "closeness" => Ok(SortCriterion::Closeness),
            _ => Err(format!("Unknown sort criterion: {}", s)),
        }
    }
}

/// Flat summary of one near-Earth object, as served to the display client.
///
/// Distances and diameters are in miles, velocity in miles per hour, all
/// rounded to two decimal places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NearEarthObjectSummary {
    pub id: String,
    pub name: String,
    /// Mean estimated diameter (miles)
    pub size: f64,
    /// Miss distance of the selected close approach (miles)
    pub close_approach: f64,
    /// Relative velocity of the selected close approach (mph)
    pub velocity: f64,
    pub is_potentially_hazardous: bool,
}

/// Error body returned for 4xx/5xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status_code: 400,
            error: "Bad Request".to_string(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status_code: 500,
            error: "Internal Server Error".to_string(),
            message: message.into(),
        }
    }
}

/// Liveness report.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    /// Seconds since the process started
    pub uptime: f64,
}
