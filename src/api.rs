//! HTTP surface of the booking service.
//!
//! ## Routes
//!
//! - `POST /reservations` with body
//!   `{ "room_id", "customer_name", "start_date", "end_date" }`
//!   - `201 { "message", "reservation_id" }` when the reservation was stored
//!   - `400 { "message" }` when no room is available in the window, which
//!     includes a missing or unreadable date
//!   - `500 { "message", "error" }` on store failures (a missing room or
//!     name fails the insert) or a body that is not a JSON object

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::availability::check_availability;
use crate::error::ReservationError;
use crate::reservation::{create_pending_reservation, NewReservation, ReservationId};
use crate::store::ReservationStore;

pub const CREATED_MESSAGE: &str = "Reserva creada con éxito";

#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn ReservationStore>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedReservation {
    pub message: String,
    pub reservation_id: ReservationId,
}

/// Build the router with `store` shared by every request.
pub fn router(store: Arc<dyn ReservationStore>) -> Router {
    Router::new()
        .route("/reservations", post(create_reservation))
        .with_state(AppState { store })
}

/// Serve the router on an already bound listener.
pub async fn serve(
    listener: tokio::net::TcpListener,
    store: Arc<dyn ReservationStore>,
) -> Result<(), std::io::Error> {
    axum::serve(listener, router(store)).await
}

async fn create_reservation(
    State(state): State<AppState>,
    payload: Result<Json<NewReservation>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedReservation>), ReservationError> {
    let Json(rsvp) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Unreadable reservation payload");
        ReservationError::InvalidPayload(rejection.body_text())
    })?;

    info!(
        room_id = ?rsvp.room_id,
        start_date = ?rsvp.start_date,
        end_date = ?rsvp.end_date,
        "Reservation requested"
    );

    let store = state.store.as_ref();
    if !check_availability(store, rsvp.start_date, rsvp.end_date).await? {
        return Err(ReservationError::Unavailable);
    }

    // Check and insert are not atomic; two requests can both pass the check.
    let reservation_id = create_pending_reservation(store, &rsvp).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedReservation {
            message: CREATED_MESSAGE.to_string(),
            reservation_id,
        }),
    ))
}
