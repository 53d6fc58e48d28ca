// Availability check run before every reservation insert

use chrono::NaiveDate;
use tracing::{debug, error, info};

use crate::error::AvailabilityQueryError;
use crate::store::ReservationStore;

/// Returns `true` when at least one availability row in the window is not
/// excluded by an overlapping reservation.
///
/// A missing date matches no row, so it is reported as "no rooms" without a
/// query. A store failure is returned as an error and never reported as
/// "no rooms".
pub async fn check_availability(
    store: &dyn ReservationStore,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<bool, AvailabilityQueryError> {
    let (Some(start_date), Some(end_date)) = (start_date, end_date) else {
        info!(?start_date, ?end_date, "No rooms available for an incomplete window");
        return Ok(false);
    };

    let rows = store
        .available_rooms(start_date, end_date)
        .await
        .map_err(|e| {
            error!(%start_date, %end_date, error = %e, "Availability query failed");
            AvailabilityQueryError(e)
        })?;

    if rows.is_empty() {
        info!(%start_date, %end_date, "No rooms available");
        return Ok(false);
    }

    debug!(?rows, "Matching availability rows");
    info!(%start_date, %end_date, matches = rows.len(), "Rooms available");
    Ok(true)
}
