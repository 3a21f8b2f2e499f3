use crate::booking::distance::DEFAULT_DISTANCE_KM;
use crate::error::{BookingError, Result};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub distance_api_url: String,
    /// Places API key handed to the browser. `None` disables autocomplete.
    pub places_api_key: Option<String>,
    pub service_country: String,
    pub default_distance_km: f64,
    pub distance_timeout_secs: u64,
    pub detailed_submit: bool,
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let distance_api_url = dotenvy::var("DISTANCE_API_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| BookingError::Config("DISTANCE_API_URL is required".to_string()))?;

        let places_api_key = dotenvy::var("PLACES_API_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let service_country = dotenvy::var("SERVICE_COUNTRY")
            .unwrap_or_else(|_| "in".to_string())
            .to_ascii_lowercase();
        if service_country.len() != 2 || !service_country.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(BookingError::Config("Invalid SERVICE_COUNTRY".to_string()));
        }

        let default_distance_km = dotenvy::var("DEFAULT_DISTANCE_KM")
            .unwrap_or_else(|_| DEFAULT_DISTANCE_KM.to_string())
            .parse::<f64>()
            .ok()
            .filter(|km| km.is_finite() && *km > 0.0)
            .ok_or_else(|| BookingError::Config("Invalid DEFAULT_DISTANCE_KM".to_string()))?;

        let distance_timeout_secs = dotenvy::var("DISTANCE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u64>()
            .map_err(|_| BookingError::Config("Invalid DISTANCE_TIMEOUT_SECS".to_string()))?;

        let detailed_submit = dotenvy::var("DETAILED_SUBMIT")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .map_err(|_| BookingError::Config("Invalid DETAILED_SUBMIT".to_string()))?;

        let bind_addr =
            dotenvy::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());

        Ok(AppConfig {
            distance_api_url,
            places_api_key,
            service_country,
            default_distance_km,
            distance_timeout_secs,
            detailed_submit,
            bind_addr,
        })
    }
}
