//! Submission: from a validated booking to the results route.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use super::draft::ValidatedBooking;
use super::trip::TripType;
use crate::error::{BookingError, Result};

pub const GENERIC_SUBMIT_ERROR: &str = "Something went wrong. Please try again.";
pub const DEFAULT_RESULTS_PATH: &str = "/cab-search";

static MOBILE_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^(?:\+91|0)?[6-9]\d{9}$").expect("valid mobile regex")
});

/// How a validated booking reaches the results page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionFlow {
    /// Navigate straight away.
    Direct,
    /// Collect name and mobile in a popup first.
    Detailed,
}

/// The detailed flow only runs when explicitly enabled, and only for visitors
/// who are not logged in.
pub fn choose_flow(detailed_enabled: bool, logged_in: bool) -> SubmissionFlow {
    if detailed_enabled && !logged_in {
        SubmissionFlow::Detailed
    } else {
        SubmissionFlow::Direct
    }
}

/// Prevents a second submission while one is in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmitGuard {
    in_flight: bool,
}

impl SubmitGuard {
    /// Returns `false` when a submission is already running.
    pub fn try_begin(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        true
    }

    pub fn finish(&mut self) {
        self.in_flight = false;
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDetails {
    pub name: String,
    pub mobile: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactError {
    MissingName,
    MissingMobile,
    InvalidMobile,
}

impl fmt::Display for ContactError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingName => write!(f, "Please enter your name"),
            Self::MissingMobile => write!(f, "Please enter your mobile number"),
            Self::InvalidMobile => write!(f, "Please enter a valid 10-digit mobile number"),
        }
    }
}

impl std::error::Error for ContactError {}

impl ContactDetails {
    pub fn parse(name: &str, mobile: &str) -> std::result::Result<Self, ContactError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ContactError::MissingName);
        }
        let mobile: String = mobile.chars().filter(|c| !c.is_whitespace()).collect();
        if mobile.is_empty() {
            return Err(ContactError::MissingMobile);
        }
        if !MOBILE_RE.is_match(&mobile) {
            return Err(ContactError::InvalidMobile);
        }
        Ok(Self {
            name: name.to_string(),
            mobile,
        })
    }
}

/// Query handed to the results route.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub pickup: String,
    pub drop: String,
    pub date: String,
    pub time: String,
    pub trip_type: TripType,
    pub return_date: Option<String>,
    pub distance: f64,
    pub package: Option<String>,
    pub name: Option<String>,
    pub mobile: Option<String>,
}

impl SearchQuery {
    pub fn from_booking(booking: &ValidatedBooking, distance_km: f64) -> Self {
        Self {
            pickup: booking.pickup_location.clone(),
            drop: booking.drop_location.clone(),
            date: booking.date(),
            time: booking.time(),
            trip_type: booking.trip_type,
            return_date: booking.return_date(),
            distance: distance_km,
            package: booking.package.map(|p| p.label().to_string()),
            name: None,
            mobile: None,
        }
    }

    pub fn with_contact(mut self, contact: ContactDetails) -> Self {
        self.name = Some(contact.name);
        self.mobile = Some(contact.mobile);
        self
    }

    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("pickup", self.pickup.clone()),
            ("drop", self.drop.clone()),
            ("date", self.date.clone()),
            ("time", self.time.clone()),
            ("tripType", self.trip_type.wire_name().to_string()),
        ];
        if let Some(return_date) = &self.return_date {
            pairs.push(("Returndate", return_date.clone()));
        }
        pairs.push(("distance", self.distance.to_string()));
        if let Some(name) = &self.name {
            pairs.push(("name", name.clone()));
        }
        if let Some(mobile) = &self.mobile {
            pairs.push(("mobile", mobile.clone()));
        }
        if let Some(package) = &self.package {
            pairs.push(("packageName", package.clone()));
        }
        pairs
    }

    pub fn to_query_string(&self) -> String {
        self.pairs()
            .into_iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(&v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Client-side route for this query under `results_path`.
    pub fn results_url(&self, results_path: &str) -> Result<String> {
        if !results_path.starts_with('/') || results_path.contains('?') {
            return Err(BookingError::Config(format!(
                "results path must be an absolute path without query: {results_path}"
            )));
        }
        Ok(format!("{results_path}?{}", self.to_query_string()))
    }

    /// Rebuild a query on the results page. `get` looks up a decoded parameter.
    pub fn from_params(get: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let non_empty = |key: &str| get(key).filter(|v| !v.is_empty());
        Some(Self {
            pickup: non_empty("pickup")?,
            drop: get("drop").unwrap_or_default(),
            date: non_empty("date")?,
            time: non_empty("time")?,
            trip_type: TripType::from_wire(&get("tripType")?)?,
            return_date: non_empty("Returndate"),
            distance: get("distance")
                .and_then(|d| d.parse::<f64>().ok())
                .filter(|d| d.is_finite() && *d > 0.0)?,
            package: non_empty("packageName"),
            name: non_empty("name"),
            mobile: non_empty("mobile"),
        })
    }
}
