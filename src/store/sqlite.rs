use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::ReservationStore;
use crate::error::StoreError;
use crate::reservation::{
    AvailabilityRecord, NewReservation, Reservation, ReservationId, ReservationStatus,
};

// Binds: end_date, start_date, start_date, end_date
const AVAILABLE_ROOMS_SQL: &str = r#"
SELECT room_id, available_date, status FROM availability
WHERE room_id NOT IN (
    SELECT room_id FROM reservations
    WHERE start_date <= ? AND end_date >= ?
)
AND available_date BETWEEN ? AND ?
AND status = 'available'
"#;

const INSERT_RESERVATION_SQL: &str = "INSERT INTO reservations (room_id, customer_name, start_date, end_date, status) VALUES (?, ?, ?, ?, ?) RETURNING id";

#[derive(Debug, Clone)]
pub struct SqlReservationStore {
    pool: SqlitePool,
}

impl SqlReservationStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // One long-lived connection, kept open for the life of the process
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl ReservationStore for SqlReservationStore {
    async fn available_rooms(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<AvailabilityRecord>, StoreError> {
        let rows = sqlx::query_as::<_, AvailabilityRecord>(AVAILABLE_ROOMS_SQL)
            .bind(end_date)
            .bind(start_date)
            .bind(start_date)
            .bind(end_date)
            .fetch_all(&self.pool)
            .await?;
        debug!(rows = rows.len(), "Availability query finished");
        Ok(rows)
    }

    async fn insert_reservation(
        &self,
        rsvp: &NewReservation,
        status: ReservationStatus,
    ) -> Result<ReservationId, StoreError> {
        // Absent fields bind as NULL and are rejected by the table
        let id: ReservationId = sqlx::query(INSERT_RESERVATION_SQL)
            .bind(rsvp.room_id)
            .bind(rsvp.customer_name.as_deref())
            .bind(rsvp.start_date)
            .bind(rsvp.end_date)
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await?
            .try_get(0)?;
        Ok(id)
    }

    async fn get_reservation(
        &self,
        id: ReservationId,
    ) -> Result<Option<Reservation>, StoreError> {
        let rsvp = sqlx::query_as::<_, Reservation>(
            "SELECT id, room_id, customer_name, start_date, end_date, status FROM reservations WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(rsvp)
    }

    async fn count_reservations(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reservations")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
