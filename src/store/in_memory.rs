use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use parking_lot::RwLock;

use super::ReservationStore;
use crate::error::StoreError;
use crate::reservation::{
    AvailabilityRecord, NewReservation, Reservation, ReservationId, ReservationStatus,
    AVAILABLE_STATUS,
};

// Process-local store with the same filter semantics as the SQL query
#[derive(Debug, Default)]
pub struct InMemoryReservationStore {
    availability: RwLock<Vec<AvailabilityRecord>>,
    reservations: DashMap<ReservationId, Reservation>,
    last_id: AtomicI64,
    fail_next_reads: AtomicUsize,
    fail_next_writes: AtomicUsize,
}

impl InMemoryReservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_availability(records: Vec<AvailabilityRecord>) -> Self {
        let store = Self::new();
        *store.availability.write() = records;
        store
    }

    pub fn add_availability(&self, record: AvailabilityRecord) {
        self.availability.write().push(record);
    }

    // Make the next `count` availability queries fail
    pub fn fail_next_reads(&self, count: usize) {
        self.fail_next_reads.store(count, Ordering::SeqCst);
    }

    // Make the next `count` inserts fail
    pub fn fail_next_writes(&self, count: usize) {
        self.fail_next_writes.store(count, Ordering::SeqCst);
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

// Same wording as SQLite's NOT NULL failure
fn not_null<T>(value: Option<T>, column: &str) -> Result<T, StoreError> {
    value.ok_or_else(|| {
        StoreError::Constraint(format!("NOT NULL constraint failed: reservations.{}", column))
    })
}

#[async_trait]
impl ReservationStore for InMemoryReservationStore {
    async fn available_rooms(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<AvailabilityRecord>, StoreError> {
        if Self::take_failure(&self.fail_next_reads) {
            return Err(StoreError::Unavailable(
                "availability read failed".to_string(),
            ));
        }

        let booked: HashSet<_> = self
            .reservations
            .iter()
            .filter(|r| r.overlaps(start_date, end_date))
            .map(|r| r.room_id)
            .collect();

        let rows = self
            .availability
            .read()
            .iter()
            .filter(|a| !booked.contains(&a.room_id))
            .filter(|a| a.available_date >= start_date && a.available_date <= end_date)
            .filter(|a| a.status == AVAILABLE_STATUS)
            .cloned()
            .collect();
        Ok(rows)
    }

    async fn insert_reservation(
        &self,
        rsvp: &NewReservation,
        status: ReservationStatus,
    ) -> Result<ReservationId, StoreError> {
        if Self::take_failure(&self.fail_next_writes) {
            return Err(StoreError::Unavailable(
                "reservation write failed".to_string(),
            ));
        }

        let room_id = not_null(rsvp.room_id, "room_id")?;
        let customer_name = not_null(rsvp.customer_name.clone(), "customer_name")?;
        let start_date = not_null(rsvp.start_date, "start_date")?;
        let end_date = not_null(rsvp.end_date, "end_date")?;

        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.reservations.insert(
            id,
            Reservation {
                id,
                room_id,
                customer_name,
                start_date,
                end_date,
                status,
            },
        );
        Ok(id)
    }

    async fn get_reservation(
        &self,
        id: ReservationId,
    ) -> Result<Option<Reservation>, StoreError> {
        Ok(self.reservations.get(&id).map(|r| r.value().clone()))
    }

    async fn count_reservations(&self) -> Result<i64, StoreError> {
        Ok(self.reservations.len() as i64)
    }
}
