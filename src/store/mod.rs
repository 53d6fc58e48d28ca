// Store access for reservations and availability rows

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::StoreError;
use crate::reservation::{
    AvailabilityRecord, NewReservation, Reservation, ReservationId, ReservationStatus,
};

mod in_memory;
mod sqlite;

pub use in_memory::InMemoryReservationStore;
pub use sqlite::SqlReservationStore;

/// Persistence seam used by the reservation flow.
///
/// Constructed once at startup and handed to the HTTP router; nothing in the
/// crate keeps a global handle.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Availability rows with status `available`, dated inside
    /// `[start_date, end_date]`, whose room has no reservation overlapping
    /// that window.
    ///
    /// The filter is per row. A room with one free date in the window counts
    /// even if the rest of the window is not listed as available.
    async fn available_rooms(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<AvailabilityRecord>, StoreError>;

    /// Insert a reservation row and return its assigned id.
    async fn insert_reservation(
        &self,
        rsvp: &NewReservation,
        status: ReservationStatus,
    ) -> Result<ReservationId, StoreError>;

    async fn get_reservation(&self, id: ReservationId)
        -> Result<Option<Reservation>, StoreError>;

    async fn count_reservations(&self) -> Result<i64, StoreError>;
}
