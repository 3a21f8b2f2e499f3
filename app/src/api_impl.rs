//! Business logic extracted from server functions for testability.

use crate::api::BookingConfigDto;
use crate::booking::distance::DistanceRequest;
use crate::config::AppConfig;
use crate::distance_client::DistanceClient;
use tracing::info;

/// Public subset of the server configuration.
pub fn booking_config_dto(config: &AppConfig) -> BookingConfigDto {
    BookingConfigDto {
        places_api_key: config.places_api_key.clone(),
        service_country: config.service_country.clone(),
        detailed_submit: config.detailed_submit,
        default_distance_km: config.default_distance_km,
    }
}

pub async fn calculate_distance_impl(client: &DistanceClient, request: &DistanceRequest) -> f64 {
    info!(
        "Resolving {} distance: {} -> {}",
        request.trip_type, request.pickup_location, request.drop_location
    );
    client.resolve_distance(request).await
}
