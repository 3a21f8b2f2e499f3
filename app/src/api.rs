use leptos::prelude::*;
use serde::{Deserialize, Serialize};

#[cfg(feature = "ssr")]
use std::sync::Arc;

use crate::booking::distance::{DEFAULT_DISTANCE_KM, DistanceRequest};

#[cfg(feature = "ssr")]
use crate::{api_impl, config::AppConfig, distance_client::DistanceClient};

/// Get the [`AppConfig`] from Leptos context
#[cfg(feature = "ssr")]
pub fn get_config_from_context() -> Result<Arc<AppConfig>, ServerFnError> {
    use leptos::prelude::use_context;
    use_context::<Arc<AppConfig>>()
        .ok_or_else(|| ServerFnError::new("application config missing from context"))
}

/// Get the [`DistanceClient`] from Leptos context
#[cfg(feature = "ssr")]
pub fn get_distance_client_from_context() -> Result<Arc<DistanceClient>, ServerFnError> {
    use leptos::prelude::use_context;
    use_context::<Arc<DistanceClient>>()
        .ok_or_else(|| ServerFnError::new("distance client missing from context"))
}

/// Public part of the configuration the booking form needs in the browser.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BookingConfigDto {
    pub places_api_key: Option<String>,
    pub service_country: String,
    pub detailed_submit: bool,
    pub default_distance_km: f64,
}

impl Default for BookingConfigDto {
    fn default() -> Self {
        Self {
            places_api_key: None,
            service_country: "in".to_string(),
            detailed_submit: false,
            default_distance_km: DEFAULT_DISTANCE_KM,
        }
    }
}

#[server(prefix = "/api", endpoint = "get_booking_config")]
pub async fn get_booking_config() -> Result<BookingConfigDto, ServerFnError> {
    let config = get_config_from_context()?;
    Ok(api_impl::booking_config_dto(&config))
}

/// Distance in km between the two locations of `request`. Falls back to the
/// configured default instead of failing.
#[server(prefix = "/api", endpoint = "calculate_distance")]
pub async fn calculate_distance(request: DistanceRequest) -> Result<f64, ServerFnError> {
    let client = get_distance_client_from_context()?;
    Ok(api_impl::calculate_distance_impl(&client, &request).await)
}
