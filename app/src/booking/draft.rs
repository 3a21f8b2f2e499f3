//! The booking draft and its trip-type dependent validation.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::distance::DistanceRequest;
use super::trip::{DraftField, RentalPackage, Requirement, TripType};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// In-memory state of one booking form mount.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingDraft {
    pub trip_type: TripType,
    pub pickup_location: String,
    pub drop_location: String,
    pub pickup_date: String,
    pub return_date: String,
    pub pickup_time: String,
    pub package: Option<RentalPackage>,
    /// `None` until the first distance attempt, always `Some` afterwards.
    pub calculated_distance: Option<f64>,
    pub error: Option<String>,
    pub location_error: Option<String>,
}

impl BookingDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch trip type. Entered values are kept so the user does not have to
    /// retype locations. Returns `false` when `trip_type` was already active.
    pub fn select_trip_type(&mut self, trip_type: TripType) -> bool {
        if self.trip_type == trip_type {
            return false;
        }
        self.trip_type = trip_type;
        self.error = None;
        true
    }

    /// Store raw user input for `field`. Any pending validation error is
    /// cleared since the user is correcting the form. Typing into a location
    /// also clears the out-of-country rejection.
    pub fn set_field(&mut self, field: DraftField, value: String) {
        match field {
            DraftField::Pickup => {
                self.pickup_location = value;
                self.location_error = None;
            }
            DraftField::Drop => {
                self.drop_location = value;
                self.location_error = None;
            }
            DraftField::PickupDate => self.pickup_date = value,
            DraftField::ReturnDate => self.return_date = value,
            DraftField::PickupTime => self.pickup_time = value,
            DraftField::Package => self.package = RentalPackage::from_label(&value),
        }
        self.error = None;
    }

    pub fn field(&self, field: DraftField) -> &str {
        match field {
            DraftField::Pickup => &self.pickup_location,
            DraftField::Drop => &self.drop_location,
            DraftField::PickupDate => &self.pickup_date,
            DraftField::ReturnDate => &self.return_date,
            DraftField::PickupTime => &self.pickup_time,
            DraftField::Package => self.package.map_or("", RentalPackage::label),
        }
    }

    /// Validate the draft against the rules of its trip type.
    ///
    /// Fields are checked in a fixed order (pickup, drop, pickup date, return
    /// date, pickup time, package) and the first failure is returned; errors
    /// are never aggregated.
    pub fn validate(&self, today: NaiveDate) -> Result<ValidatedBooking, FieldError> {
        let trip = self.trip_type;

        let pickup = self.pickup_location.trim();
        if pickup.is_empty() {
            return Err(FieldError::MissingPickup);
        }

        let drop = self.drop_location.trim();
        if drop.is_empty() && trip.requirement(DraftField::Drop) == Requirement::Required {
            return Err(FieldError::MissingDrop);
        }

        let pickup_date = parse_date(&self.pickup_date, FieldError::MissingPickupDate)?;
        if pickup_date < today {
            return Err(FieldError::PickupDateInPast);
        }

        let return_date = if trip.requirement(DraftField::ReturnDate) == Requirement::Required {
            let date = parse_date(&self.return_date, FieldError::MissingReturnDate)?;
            if date < pickup_date {
                return Err(FieldError::ReturnBeforePickup);
            }
            Some(date)
        } else {
            None
        };

        let time = self.pickup_time.trim();
        if time.is_empty() {
            return Err(FieldError::MissingPickupTime);
        }
        let pickup_time = NaiveTime::parse_from_str(time, TIME_FORMAT)
            .map_err(|_| FieldError::InvalidPickupTime)?;

        let package = if trip.requirement(DraftField::Package) == Requirement::Required {
            Some(self.package.ok_or(FieldError::MissingPackage)?)
        } else {
            None
        };

        Ok(ValidatedBooking {
            trip_type: trip,
            pickup_location: pickup.to_string(),
            drop_location: drop.to_string(),
            pickup_date,
            return_date,
            pickup_time,
            package,
        })
    }

    /// Record a failed validation or submission attempt.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Back to a fresh draft: one-way, every field empty, no distance.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn parse_date(value: &str, missing: FieldError) -> Result<NaiveDate, FieldError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(missing);
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| match missing {
        FieldError::MissingReturnDate => FieldError::InvalidReturnDate,
        _ => FieldError::InvalidPickupDate,
    })
}

/// First failing field of a booking draft. `Display` is the message shown to
/// the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    MissingPickup,
    MissingDrop,
    MissingPickupDate,
    InvalidPickupDate,
    PickupDateInPast,
    MissingReturnDate,
    InvalidReturnDate,
    ReturnBeforePickup,
    MissingPickupTime,
    InvalidPickupTime,
    MissingPackage,
}

impl FieldError {
    pub fn field(self) -> DraftField {
        match self {
            Self::MissingPickup => DraftField::Pickup,
            Self::MissingDrop => DraftField::Drop,
            Self::MissingPickupDate | Self::InvalidPickupDate | Self::PickupDateInPast => {
                DraftField::PickupDate
            }
            Self::MissingReturnDate | Self::InvalidReturnDate | Self::ReturnBeforePickup => {
                DraftField::ReturnDate
            }
            Self::MissingPickupTime | Self::InvalidPickupTime => DraftField::PickupTime,
            Self::MissingPackage => DraftField::Package,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPickup => write!(f, "Please enter a pickup location"),
            Self::MissingDrop => write!(f, "Please enter a drop location"),
            Self::MissingPickupDate => write!(f, "Please select a pickup date"),
            Self::InvalidPickupDate => write!(f, "Pickup date must be in YYYY-MM-DD format"),
            Self::PickupDateInPast => write!(f, "Pickup date cannot be in the past"),
            Self::MissingReturnDate => write!(f, "Please select a return date"),
            Self::InvalidReturnDate => write!(f, "Return date must be in YYYY-MM-DD format"),
            Self::ReturnBeforePickup => write!(f, "Return date cannot be before the pickup date"),
            Self::MissingPickupTime => write!(f, "Please select a pickup time"),
            Self::InvalidPickupTime => write!(f, "Pickup time must be in HH:MM format"),
            Self::MissingPackage => write!(f, "Please select a rental package"),
        }
    }
}

impl std::error::Error for FieldError {}

/// A draft that passed validation. Only the fields relevant to its trip type
/// are carried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedBooking {
    pub trip_type: TripType,
    pub pickup_location: String,
    /// Empty for a rental without a drop location.
    pub drop_location: String,
    pub pickup_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub pickup_time: NaiveTime,
    pub package: Option<RentalPackage>,
}

impl ValidatedBooking {
    pub fn date(&self) -> String {
        self.pickup_date.format(DATE_FORMAT).to_string()
    }

    pub fn return_date(&self) -> Option<String> {
        self.return_date
            .map(|d| d.format(DATE_FORMAT).to_string())
    }

    pub fn time(&self) -> String {
        self.pickup_time.format(TIME_FORMAT).to_string()
    }

    pub fn distance_request(&self) -> DistanceRequest {
        DistanceRequest::new(
            &self.pickup_location,
            &self.drop_location,
            self.trip_type,
            self.date(),
            self.return_date().unwrap_or_default(),
            self.time(),
        )
    }
}
