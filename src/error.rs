// Error types shared by the store, the reservation flow and the SOAP client

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

pub const UNAVAILABLE_MESSAGE: &str = "No hay habitaciones disponibles en las fechas solicitadas.";
pub const PERSISTENCE_MESSAGE: &str = "Error al registrar la reserva en la base de datos";
pub const PROCESSING_MESSAGE: &str = "Error al procesar la reserva";

// Failures coming out of a ReservationStore implementation
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    // Row rejected by a table constraint, e.g. a NULL in a NOT NULL column
    #[error("Constraint violated: {0}")]
    Constraint(String),
}

/// Reading the availability table failed. Distinct from "no rooms".
#[derive(Error, Debug)]
#[error("Availability query failed: {0}")]
pub struct AvailabilityQueryError(#[from] pub StoreError);

/// Writing a reservation row failed.
#[derive(Error, Debug)]
#[error("Reservation insert failed: {0}")]
pub struct PersistenceError(#[from] pub StoreError);

// Outcomes of POST /reservations other than 201
#[derive(Error, Debug)]
pub enum ReservationError {
    #[error("{}", UNAVAILABLE_MESSAGE)]
    Unavailable,

    #[error(transparent)]
    AvailabilityQuery(#[from] AvailabilityQueryError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    // Body that is not a JSON object at all
    #[error("Invalid reservation payload: {0}")]
    InvalidPayload(String),
}

impl ReservationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ReservationError::Unavailable => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ReservationError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ReservationError::Unavailable => json!({ "message": UNAVAILABLE_MESSAGE }),
            ReservationError::Persistence(e) => json!({
                "message": PERSISTENCE_MESSAGE,
                "error": e.0.to_string(),
            }),
            ReservationError::AvailabilityQuery(_) | ReservationError::InvalidPayload(_) => {
                json!({
                    "message": PROCESSING_MESSAGE,
                    "error": self.to_string(),
                })
            }
        };
        (status, Json(body)).into_response()
    }
}

// Errors from the SOAP availability call. Never surfaced past the client.
#[derive(Error, Debug)]
pub enum RemoteCallError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("XML parse error: {0}")]
    XmlParseError(String),
}

impl From<quick_xml::Error> for RemoteCallError {
    fn from(err: quick_xml::Error) -> Self {
        RemoteCallError::XmlParseError(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}
