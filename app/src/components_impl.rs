//! Business logic extracted from Leptos components for testability.
//!
//! This module contains pure functions used by the `#[component]` functions,
//! kept outside the view macros so they can be unit tested.

use chrono::NaiveDate;

use crate::booking::draft::DATE_FORMAT;
use crate::booking::places::{IntegrationStatus, PlacesError};
use crate::booking::submission::SearchQuery;
use crate::booking::trip::TripType;

// === Service Tabs ===

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceMode {
    Cab,
    Bus,
    Flight,
    Hotel,
    Homestay,
    Holiday,
}

impl ServiceMode {
    pub const ALL: [ServiceMode; 6] = [
        ServiceMode::Cab,
        ServiceMode::Bus,
        ServiceMode::Flight,
        ServiceMode::Hotel,
        ServiceMode::Homestay,
        ServiceMode::Holiday,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Cab => "Cab",
            Self::Bus => "Bus",
            Self::Flight => "Flight",
            Self::Hotel => "Hotel",
            Self::Homestay => "Homestay",
            Self::Holiday => "Holiday",
        }
    }

    /// Only cabs can be booked from the site for now.
    pub fn is_bookable(self) -> bool {
        self == Self::Cab
    }
}

/// CSS class for a tab (service or trip type) depending on selection.
pub fn tab_class(active: bool) -> &'static str {
    if active { "tab tab-active" } else { "tab" }
}

// === Form Helpers ===

/// Value for the `min` attribute of the date inputs.
pub fn min_date_attr(today: NaiveDate) -> String {
    today.format(DATE_FORMAT).to_string()
}

pub fn drop_placeholder(trip_type: TripType) -> &'static str {
    if trip_type == TripType::Rental {
        "Drop location (optional)"
    } else {
        "Drop location"
    }
}

pub fn submit_label(in_flight: bool) -> &'static str {
    if in_flight { "Searching..." } else { "Search Cabs" }
}

/// Banner shown while autocomplete is unavailable. The form stays usable.
pub fn integration_banner(status: &IntegrationStatus) -> Option<String> {
    match status {
        IntegrationStatus::Pending | IntegrationStatus::Ready => None,
        IntegrationStatus::Degraded(PlacesError::MissingApiKey) => Some(
            "Location suggestions are not configured. You can still type addresses manually."
                .to_string(),
        ),
        IntegrationStatus::Degraded(_) => Some(
            "Location suggestions are unavailable right now. You can still type addresses manually."
                .to_string(),
        ),
    }
}

// === Results Page ===

/// Label/value rows summarising a search.
pub fn trip_summary_rows(query: &SearchQuery) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("Trip", query.trip_type.label().to_string()),
        ("Pickup", query.pickup.clone()),
    ];
    if !query.drop.is_empty() {
        rows.push(("Drop", query.drop.clone()));
    }
    rows.push(("Date", format!("{} {}", query.date, query.time)));
    if let Some(return_date) = &query.return_date {
        rows.push(("Return", return_date.clone()));
    }
    if let Some(package) = &query.package {
        rows.push(("Package", package.clone()));
    }
    rows.push(("Distance", format!("{} km", query.distance)));
    rows
}
