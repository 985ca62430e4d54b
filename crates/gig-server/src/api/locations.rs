//! Campus location and walking-time endpoints.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gig_core::models::{Coordinate, Location};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::api::error::{failure, malformed_body};
use crate::persistence::locations;
use crate::state::AppState;

/// List all campus locations.
pub async fn list_locations(State(state): State<Arc<AppState>>) -> Response {
    match locations::load_all_locations(state.db().pool()).await {
        Ok(all) => Json(json!({
            "success": true,
            "count": all.len(),
            "data": all,
        }))
        .into_response(),
        Err(err) => {
            tracing::error!("Failed to load locations: {:#}", err);
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Error fetching buildings")
        }
    }
}

/// Create or replace a campus location.
pub async fn upsert_location(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Location>, JsonRejection>,
) -> Response {
    let Json(location) = match payload {
        Ok(body) => body,
        Err(err) => return malformed_body(err),
    };
    if location.location_id.trim().is_empty() || location.name.trim().is_empty() {
        return failure(StatusCode::BAD_REQUEST, "location_id and name are required");
    }
    if let Some(c) = location.coordinate {
        if !valid_coordinate(c) {
            return failure(StatusCode::BAD_REQUEST, "Coordinates out of range");
        }
    }

    match locations::upsert_location(state.db().pool(), &location).await {
        Ok(()) => {
            tracing::info!("Saved location '{}' ({})", location.name, location.location_id);
            (StatusCode::CREATED, Json(location)).into_response()
        }
        Err(err) => {
            tracing::error!("Failed to save location: {:#}", err);
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Error saving building")
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WalkingTimeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WalkingTimeResponse {
    pub from: Location,
    pub to: Location,
    pub walking_time_minutes: u32,
    pub walking_time_formatted: String,
}

/// Walking time between two stored locations.
pub async fn walking_time(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WalkingTimeQuery>,
) -> Response {
    let (Some(from_id), Some(to_id)) = (query.from, query.to) else {
        return failure(
            StatusCode::BAD_REQUEST,
            "Please provide both 'from' and 'to' location ids",
        );
    };

    let pool = state.db().pool();
    let loaded = async {
        let from = locations::load_location(pool, &from_id).await?;
        let to = locations::load_location(pool, &to_id).await?;
        anyhow::Ok((from, to))
    }
    .await;

    let (from, to) = match loaded {
        Ok((Some(from), Some(to))) => (from, to),
        Ok(_) => return failure(StatusCode::NOT_FOUND, "One or both buildings not found"),
        Err(err) => {
            tracing::error!("Failed to load locations: {:#}", err);
            return failure(StatusCode::INTERNAL_SERVER_ERROR, "Error calculating walking time");
        }
    };

    let (Some(a), Some(b)) = (from.coordinate, to.coordinate) else {
        return failure(StatusCode::BAD_REQUEST, "Building coordinates not available");
    };

    let minutes = state.resolver().engine().estimate_travel_minutes(a, b);
    let data = WalkingTimeResponse {
        from,
        to,
        walking_time_minutes: minutes,
        walking_time_formatted: format_minutes(minutes),
    };
    Json(json!({ "success": true, "data": data })).into_response()
}

fn valid_coordinate(c: Coordinate) -> bool {
    c.lat.is_finite()
        && c.lng.is_finite()
        && (-90.0..=90.0).contains(&c.lat)
        && (-180.0..=180.0).contains(&c.lng)
}

fn format_minutes(minutes: u32) -> String {
    if minutes == 1 {
        "1 minute".to_string()
    } else {
        format!("{} minutes", minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(0), "0 minutes");
        assert_eq!(format_minutes(1), "1 minute");
        assert_eq!(format_minutes(12), "12 minutes");
    }

    #[test]
    fn test_coordinate_range() {
        assert!(valid_coordinate(Coordinate::new(33.75, -84.39)));
        assert!(!valid_coordinate(Coordinate::new(91.0, 0.0)));
        assert!(!valid_coordinate(Coordinate::new(0.0, f64::NAN)));
    }
}
