use crate::booking::distance::{DistanceRequest, distance_or_default, parse_distance_body};
use crate::config::AppConfig;
use crate::error::{BookingError, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Client for the distance calculation backend.
pub struct DistanceClient {
    client: Client,
    endpoint: String,
    default_km: f64,
}

impl DistanceClient {
    pub fn new(endpoint: String, timeout: Duration, default_km: f64) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(BookingError::Http)?;

        Ok(Self {
            client,
            endpoint,
            default_km,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(
            config.distance_api_url.clone(),
            Duration::from_secs(config.distance_timeout_secs),
            config.default_distance_km,
        )
    }

    /// Ask the backend for the distance. Any failure is returned as an error.
    pub async fn fetch_distance(&self, request: &DistanceRequest) -> Result<f64> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BookingError::InvalidResponse(format!(
                "HTTP {} for url={}",
                response.status(),
                self.endpoint
            )));
        }

        let body = response.text().await?;
        debug!("Distance response body: {}", body);

        parse_distance_body(&body)
    }

    /// Resolve a distance, substituting the default on any failure. Never fails.
    pub async fn resolve_distance(&self, request: &DistanceRequest) -> f64 {
        distance_or_default(self.fetch_distance(request).await, self.default_km)
    }
}
