//! Campus location persistence operations.

use anyhow::Result;
use gig_core::models::{Coordinate, Location};
use sqlx::SqlitePool;

/// Upsert a location into the database.
pub async fn upsert_location(pool: &SqlitePool, location: &Location) -> Result<()> {
    let (lat, lng) = location
        .coordinate
        .map(|c| (Some(c.lat), Some(c.lng)))
        .unwrap_or((None, None));

    sqlx::query(
        r#"
        INSERT INTO locations (location_id, name, code, lat, lng, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, CURRENT_TIMESTAMP)
        ON CONFLICT(location_id) DO UPDATE SET
            name = ?2, code = ?3, lat = ?4, lng = ?5,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(&location.location_id)
    .bind(&location.name)
    .bind(&location.code)
    .bind(lat)
    .bind(lng)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a single location by ID.
pub async fn load_location(pool: &SqlitePool, location_id: &str) -> Result<Option<Location>> {
    let row = sqlx::query_as::<_, LocationRow>(
        "SELECT location_id, name, code, lat, lng FROM locations WHERE location_id = ?1",
    )
    .bind(location_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Location::from))
}

/// Load all locations ordered by name.
pub async fn load_all_locations(pool: &SqlitePool) -> Result<Vec<Location>> {
    let rows = sqlx::query_as::<_, LocationRow>(
        "SELECT location_id, name, code, lat, lng FROM locations ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Location::from).collect())
}

// Internal row type for SQLx
#[derive(sqlx::FromRow)]
pub(crate) struct LocationRow {
    pub(crate) location_id: String,
    pub(crate) name: String,
    pub(crate) code: Option<String>,
    pub(crate) lat: Option<f64>,
    pub(crate) lng: Option<f64>,
}

impl From<LocationRow> for Location {
    fn from(row: LocationRow) -> Self {
        // A half-surveyed building has no usable coordinate.
        let coordinate = match (row.lat, row.lng) {
            (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)),
            _ => None,
        };
        Location {
            location_id: row.location_id,
            name: row.name,
            code: row.code,
            coordinate,
        }
    }
}
