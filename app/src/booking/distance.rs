//! Distance resolution types shared by the browser and the server.
//!
//! Resolution never fails from the caller's point of view: any transport or
//! shape problem is replaced by [`DEFAULT_DISTANCE_KM`].

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::trip::TripType;
use crate::error::{BookingError, Result};

pub const DEFAULT_DISTANCE_KM: f64 = 100.0;

/// Form body sent to the distance backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceRequest {
    #[serde(rename = "tripType")]
    pub trip_type: TripType,
    #[serde(rename = "pickupLocation")]
    pub pickup_location: String,
    #[serde(rename = "dropLocation")]
    pub drop_location: String,
    pub date: String,
    #[serde(rename = "Returndate")]
    pub return_date: String,
    pub time: String,
    /// Always `"0"` on request; the backend fills in the real figure.
    pub distance: String,
}

impl DistanceRequest {
    pub fn new(
        origin: &str,
        destination: &str,
        trip_type: TripType,
        date: String,
        return_date: String,
        time: String,
    ) -> Self {
        Self {
            trip_type,
            pickup_location: origin.to_string(),
            drop_location: destination.to_string(),
            date,
            return_date,
            time,
            distance: "0".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DistanceResponse {
    distance: Option<f64>,
}

/// Extract a usable distance from a backend response body.
pub fn parse_distance_body(body: &str) -> Result<f64> {
    let response: DistanceResponse = serde_json::from_str(body)
        .map_err(|e| BookingError::InvalidResponse(format!("distance body: {e}")))?;

    match response.distance {
        Some(km) if km.is_finite() && km > 0.0 => Ok(km),
        Some(km) => Err(BookingError::InvalidResponse(format!(
            "non-positive distance {km}"
        ))),
        None => Err(BookingError::InvalidResponse(
            "distance missing from response".to_string(),
        )),
    }
}

/// Collapse a resolution attempt into a distance, substituting `default_km`
/// on failure.
pub fn distance_or_default(result: Result<f64>, default_km: f64) -> f64 {
    match result {
        Ok(km) => km,
        Err(e) => {
            warn!("Distance resolution failed, using default of {default_km} km: {e}");
            default_km
        }
    }
}
