// Hotel booking service: reservation endpoint over a SQL store plus a
// standalone SOAP availability client

pub mod api;
pub mod availability;
pub mod config;
pub mod error;
pub mod reservation;
pub mod soap_client;
pub mod store;
pub mod xml_document;

// Re-export key types for convenience
pub use api::{router, serve, CreatedReservation};
pub use availability::check_availability;
pub use config::{Config, DatabaseConfig, ServerConfig, SoapConfig};
pub use error::{
    AvailabilityQueryError, ConfigError, PersistenceError, RemoteCallError, ReservationError,
    StoreError,
};
pub use reservation::{
    create_pending_reservation, AvailabilityRecord, NewReservation, Reservation, ReservationId,
    ReservationStatus,
};
pub use soap_client::{SoapAvailabilityClient, SoapRoom};
pub use store::{InMemoryReservationStore, ReservationStore, SqlReservationStore};
