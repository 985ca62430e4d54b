//! Booking persistence operations.

use anyhow::Result;
use chrono::{DateTime, Utc};
use gig_core::models::{Booking, BookingInterval, BookingStatus, Location};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::db::{format_range_bound, format_timestamp, parse_timestamp};
use super::locations::LocationRow;

/// Optional filters for listing bookings.
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub provider_id: Option<String>,
    pub customer_id: Option<String>,
    pub status: Option<BookingStatus>,
}

/// Insert a new booking.
pub async fn insert_booking(pool: &SqlitePool, booking: &Booking) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO bookings (
            booking_id, provider_id, customer_id, location_id, service_id,
            start_at, ends_at, status, created_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&booking.booking_id)
    .bind(&booking.provider_id)
    .bind(&booking.customer_id)
    .bind(&booking.location_id)
    .bind(&booking.service_id)
    .bind(format_timestamp(booking.start_at))
    .bind(format_timestamp(booking.ends_at))
    .bind(booking.status.as_str())
    .bind(format_timestamp(booking.created_at))
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a single booking by ID.
pub async fn load_booking(pool: &SqlitePool, booking_id: &str) -> Result<Option<Booking>> {
    let row = sqlx::query_as::<_, BookingRow>(
        "SELECT booking_id, provider_id, customer_id, location_id, service_id, start_at, ends_at, status, created_at FROM bookings WHERE booking_id = ?1",
    )
    .bind(booking_id)
    .fetch_optional(pool)
    .await?;

    row.map(Booking::try_from).transpose()
}

/// List bookings matching `filter`, newest start first.
pub async fn list_bookings(pool: &SqlitePool, filter: &BookingFilter) -> Result<Vec<Booking>> {
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT booking_id, provider_id, customer_id, location_id, service_id, start_at, ends_at, status, created_at FROM bookings WHERE 1 = 1",
    );
    if let Some(provider_id) = &filter.provider_id {
        query.push(" AND provider_id = ").push_bind(provider_id);
    }
    if let Some(customer_id) = &filter.customer_id {
        query.push(" AND customer_id = ").push_bind(customer_id);
    }
    if let Some(status) = filter.status {
        query.push(" AND status = ").push_bind(status.as_str());
    }
    query.push(" ORDER BY start_at DESC");

    let rows = query.build_query_as::<BookingRow>().fetch_all(pool).await?;
    rows.into_iter().map(Booking::try_from).collect()
}

/// Load a provider's active bookings that touch `[window_start, window_end]`,
/// with their locations resolved.
pub async fn load_active_intervals(
    pool: &SqlitePool,
    provider_id: &str,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Result<Vec<BookingInterval>> {
    let rows = sqlx::query_as::<_, IntervalRow>(
        r#"
        SELECT
            b.booking_id, b.provider_id, b.start_at, b.ends_at, b.status,
            l.location_id, l.name, l.code, l.lat, l.lng
        FROM bookings b
        JOIN locations l ON b.location_id = l.location_id
        WHERE b.provider_id = ?1
          AND b.status IN ('pending', 'confirmed')
          AND b.start_at <= ?3
          AND b.ends_at >= ?2
        ORDER BY b.start_at
        "#,
    )
    .bind(provider_id)
    .bind(format_range_bound(window_start))
    .bind(format_range_bound(window_end))
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(BookingInterval::try_from).collect()
}

/// Set a booking's status. Returns false when the booking does not exist.
pub async fn update_booking_status(
    pool: &SqlitePool,
    booking_id: &str,
    status: BookingStatus,
) -> Result<bool> {
    let result = sqlx::query("UPDATE bookings SET status = ?1 WHERE booking_id = ?2")
        .bind(status.as_str())
        .bind(booking_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

// Internal row types for SQLx
#[derive(sqlx::FromRow)]
struct BookingRow {
    booking_id: String,
    provider_id: String,
    customer_id: String,
    location_id: String,
    service_id: Option<String>,
    start_at: String,
    ends_at: String,
    status: String,
    created_at: String,
}

impl TryFrom<BookingRow> for Booking {
    type Error = anyhow::Error;

    fn try_from(row: BookingRow) -> Result<Self> {
        Ok(Booking {
            booking_id: row.booking_id,
            provider_id: row.provider_id,
            customer_id: row.customer_id,
            location_id: row.location_id,
            service_id: row.service_id,
            start_at: parse_timestamp(&row.start_at)?,
            ends_at: parse_timestamp(&row.ends_at)?,
            status: row.status.parse()?,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct IntervalRow {
    booking_id: String,
    provider_id: String,
    start_at: String,
    ends_at: String,
    status: String,
    #[sqlx(flatten)]
    location: LocationRow,
}

impl TryFrom<IntervalRow> for BookingInterval {
    type Error = anyhow::Error;

    fn try_from(row: IntervalRow) -> Result<Self> {
        Ok(BookingInterval {
            booking_id: Some(row.booking_id),
            provider_id: row.provider_id,
            location: Location::from(row.location),
            start: parse_timestamp(&row.start_at)?,
            end: parse_timestamp(&row.ends_at)?,
            status: row.status.parse()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{init_database, locations::upsert_location};
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, hour, minute, 0).unwrap()
    }

    fn booking(id: &str, provider: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Booking {
        Booking {
            booking_id: id.to_string(),
            provider_id: provider.to_string(),
            customer_id: "cust-1".to_string(),
            location_id: "1".to_string(),
            service_id: None,
            start_at: start,
            ends_at: end,
            status: BookingStatus::Pending,
            created_at: at(8, 0),
        }
    }

    async fn seeded() -> SqlitePool {
        let db = init_database(":memory:", 1).await.unwrap();
        let pool = db.pool().clone();
        upsert_location(
            &pool,
            &Location::new("1", "Library South").with_coordinate(33.7530, -84.3860),
        )
        .await
        .unwrap();
        pool
    }

    #[tokio::test]
    async fn test_insert_and_load() {
        let pool = seeded().await;
        let b = booking("b1", "prov-1", at(10, 0), at(11, 0));
        insert_booking(&pool, &b).await.unwrap();

        assert_eq!(load_booking(&pool, "b1").await.unwrap(), Some(b));
        assert!(load_booking(&pool, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_window_excludes_inactive_far_and_foreign() {
        let pool = seeded().await;
        insert_booking(&pool, &booking("near", "prov-1", at(9, 0), at(9, 50))).await.unwrap();
        insert_booking(&pool, &booking("far", "prov-1", at(16, 0), at(17, 0))).await.unwrap();
        insert_booking(&pool, &booking("other", "prov-2", at(10, 0), at(11, 0))).await.unwrap();
        insert_booking(&pool, &booking("gone", "prov-1", at(11, 0), at(11, 30))).await.unwrap();
        update_booking_status(&pool, "gone", BookingStatus::Cancelled).await.unwrap();

        let intervals = load_active_intervals(&pool, "prov-1", at(8, 0), at(13, 0))
            .await
            .unwrap();
        let ids: Vec<_> = intervals
            .iter()
            .filter_map(|i| i.booking_id.as_deref())
            .collect();
        assert_eq!(ids, vec!["near"]);
        assert!(intervals[0].location.coordinate.is_some());
    }

    #[tokio::test]
    async fn test_window_includes_long_booking_started_earlier() {
        let pool = seeded().await;
        insert_booking(&pool, &booking("long", "prov-1", at(5, 0), at(8, 30))).await.unwrap();

        let intervals = load_active_intervals(&pool, "prov-1", at(8, 0), at(13, 0))
            .await
            .unwrap();
        assert_eq!(intervals.len(), 1);
    }

    #[tokio::test]
    async fn test_list_filters() {
        let pool = seeded().await;
        insert_booking(&pool, &booking("b1", "prov-1", at(9, 0), at(10, 0))).await.unwrap();
        insert_booking(&pool, &booking("b2", "prov-1", at(12, 0), at(13, 0))).await.unwrap();
        insert_booking(&pool, &booking("b3", "prov-2", at(9, 0), at(10, 0))).await.unwrap();
        update_booking_status(&pool, "b1", BookingStatus::Confirmed).await.unwrap();

        let filter = BookingFilter {
            provider_id: Some("prov-1".to_string()),
            ..Default::default()
        };
        let listed = list_bookings(&pool, &filter).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].booking_id, "b2");

        let filter = BookingFilter {
            status: Some(BookingStatus::Confirmed),
            ..Default::default()
        };
        let listed = list_bookings(&pool, &filter).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].booking_id, "b1");

        assert!(!update_booking_status(&pool, "nope", BookingStatus::Cancelled).await.unwrap());
    }
}
