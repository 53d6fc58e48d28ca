// Reservation data model and the writer that persists new reservations

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{error, info};

use crate::error::PersistenceError;
use crate::store::ReservationStore;

pub type ReservationId = i64;
pub type RoomId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
        }
    }
}

/// Body of POST /reservations.
///
/// Nothing is validated here. A field that is absent, `null` or of the wrong
/// shape is `None` and is passed on as-is: the availability check finds no
/// rows for a missing date, and the insert rejects a missing name or room.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewReservation {
    #[serde(default, deserialize_with = "lenient")]
    pub room_id: Option<RoomId>,
    #[serde(default, deserialize_with = "lenient")]
    pub customer_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient")]
    pub end_date: Option<NaiveDate>,
}

impl NewReservation {
    pub fn new(
        room_id: RoomId,
        customer_name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            room_id: Some(room_id),
            customer_name: Some(customer_name.into()),
            start_date: Some(start_date),
            end_date: Some(end_date),
        }
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reservation {
    pub id: ReservationId,
    pub room_id: RoomId,
    pub customer_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ReservationStatus,
}

impl Reservation {
    // Standard interval overlap, both ends inclusive
    pub fn overlaps(&self, start_date: NaiveDate, end_date: NaiveDate) -> bool {
        self.start_date <= end_date && self.end_date >= start_date
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AvailabilityRecord {
    pub room_id: RoomId,
    pub available_date: NaiveDate,
    pub status: String,
}

pub const AVAILABLE_STATUS: &str = "available";

impl AvailabilityRecord {
    pub fn available(room_id: RoomId, available_date: NaiveDate) -> Self {
        Self {
            room_id,
            available_date,
            status: AVAILABLE_STATUS.to_string(),
        }
    }
}

/// Insert `rsvp` with status `pending` and return the id the store assigned.
pub async fn create_pending_reservation(
    store: &dyn ReservationStore,
    rsvp: &NewReservation,
) -> Result<ReservationId, PersistenceError> {
    match store.insert_reservation(rsvp, ReservationStatus::Pending).await {
        Ok(id) => {
            info!(reservation_id = id, room_id = ?rsvp.room_id, "Reservation created");
            Ok(id)
        }
        Err(e) => {
            error!(room_id = ?rsvp.room_id, error = %e, "Failed to store reservation");
            Err(PersistenceError(e))
        }
    }
}
