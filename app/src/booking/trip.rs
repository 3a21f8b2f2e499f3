use serde::{Deserialize, Serialize};
use std::fmt;

/// Trip type selected on the booking form. Governs which fields are required.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TripType {
    #[default]
    #[serde(rename = "oneWay")]
    OneWay,
    #[serde(rename = "roundTrip")]
    RoundTrip,
    #[serde(rename = "rentalTrip")]
    Rental,
}

impl TripType {
    pub const ALL: [TripType; 3] = [TripType::OneWay, TripType::RoundTrip, TripType::Rental];

    /// Name used on the wire, both for the distance backend and the results query.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::OneWay => "oneWay",
            Self::RoundTrip => "roundTrip",
            Self::Rental => "rentalTrip",
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.wire_name() == value)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::OneWay => "One Way",
            Self::RoundTrip => "Round Trip",
            Self::Rental => "Rental",
        }
    }

    /// Requirement of `field` for this trip type.
    ///
    /// | trip      | pickup | drop     | date | return | time | package |
    /// |-----------|--------|----------|------|--------|------|---------|
    /// | OneWay    | req    | req      | req  | -      | req  | -       |
    /// | RoundTrip | req    | req      | req  | req    | req  | -       |
    /// | Rental    | req    | optional | req  | -      | req  | req     |
    pub fn requirement(self, field: DraftField) -> Requirement {
        match (self, field) {
            (_, DraftField::Pickup | DraftField::PickupDate | DraftField::PickupTime) => {
                Requirement::Required
            }
            (Self::Rental, DraftField::Drop) => Requirement::Optional,
            (_, DraftField::Drop) => Requirement::Required,
            (Self::RoundTrip, DraftField::ReturnDate) | (Self::Rental, DraftField::Package) => {
                Requirement::Required
            }
            (_, DraftField::ReturnDate | DraftField::Package) => Requirement::NotApplicable,
        }
    }

    /// Whether `field` is shown on the form for this trip type.
    pub fn shows(self, field: DraftField) -> bool {
        self.requirement(field) != Requirement::NotApplicable
    }
}

impl fmt::Display for TripType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Fields of the booking draft that carry user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    Pickup,
    Drop,
    PickupDate,
    ReturnDate,
    PickupTime,
    Package,
}

impl DraftField {
    pub fn label(self) -> &'static str {
        match self {
            Self::Pickup => "pickup location",
            Self::Drop => "drop location",
            Self::PickupDate => "pickup date",
            Self::ReturnDate => "return date",
            Self::PickupTime => "pickup time",
            Self::Package => "package",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Required,
    Optional,
    NotApplicable,
}

/// Hourly rental packages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RentalPackage {
    #[serde(rename = "4hrs/40Km")]
    FourHours,
    #[serde(rename = "8hrs/80Km")]
    EightHours,
}

impl RentalPackage {
    pub const ALL: [RentalPackage; 2] = [RentalPackage::FourHours, RentalPackage::EightHours];

    pub fn label(self) -> &'static str {
        match self {
            Self::FourHours => "4hrs/40Km",
            Self::EightHours => "8hrs/80Km",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.label() == value)
    }
}

impl fmt::Display for RentalPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(TripType::OneWay.wire_name(), "oneWay");
        assert_eq!(TripType::RoundTrip.wire_name(), "roundTrip");
        assert_eq!(TripType::Rental.wire_name(), "rentalTrip");
    }

    #[test]
    fn test_from_wire_unknown() {
        assert_eq!(TripType::from_wire("rental"), None);
        assert_eq!(TripType::from_wire("rentalTrip"), Some(TripType::Rental));
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&TripType::Rental).unwrap();
        assert_eq!(json, "\"rentalTrip\"");
        let parsed: TripType = serde_json::from_str("\"roundTrip\"").unwrap();
        assert_eq!(parsed, TripType::RoundTrip);
    }

    #[test]
    fn test_drop_optional_only_for_rental() {
        assert_eq!(
            TripType::OneWay.requirement(DraftField::Drop),
            Requirement::Required
        );
        assert_eq!(
            TripType::RoundTrip.requirement(DraftField::Drop),
            Requirement::Required
        );
        assert_eq!(
            TripType::Rental.requirement(DraftField::Drop),
            Requirement::Optional
        );
    }

    #[test]
    fn test_conditional_fields() {
        assert!(TripType::RoundTrip.shows(DraftField::ReturnDate));
        assert!(!TripType::OneWay.shows(DraftField::ReturnDate));
        assert!(!TripType::Rental.shows(DraftField::ReturnDate));

        assert!(TripType::Rental.shows(DraftField::Package));
        assert!(!TripType::OneWay.shows(DraftField::Package));
        assert!(!TripType::RoundTrip.shows(DraftField::Package));
    }

    #[test]
    fn test_package_labels() {
        assert_eq!(
            RentalPackage::from_label("8hrs/80Km"),
            Some(RentalPackage::EightHours)
        );
        assert_eq!(RentalPackage::from_label("12hrs/120Km"), None);
        assert_eq!(RentalPackage::FourHours.to_string(), "4hrs/40Km");
    }
}
