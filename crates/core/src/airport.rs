//! Airport reference data and coordinate validation.

use serde::{Deserialize, Serialize};

use crate::distance::haversine_km;
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Coordinate validation
// ---------------------------------------------------------------------------

/// Validate that a coordinate pair lies within the valid decimal-degree
/// ranges (`-90..=90` latitude, `-180..=180` longitude).
///
/// Run at the ingestion edge (airport upsert, customer-entered data) so
/// that downstream distance math can treat valid ranges as a precondition.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), CoreError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(CoreError::Validation(format!(
            "Latitude {latitude} out of range -90..90"
        )));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(CoreError::Validation(format!(
            "Longitude {longitude} out of range -180..180"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// IATA code
// ---------------------------------------------------------------------------

/// A validated three-letter IATA airport code, stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IataCode(String);

impl IataCode {
    /// Parse a raw string into an IATA code.
    ///
    /// Accepts exactly three ASCII letters in any case; normalizes to
    /// uppercase. Anything else is a validation error.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CoreError::Validation(format!(
                "Invalid IATA code '{raw}': expected exactly 3 letters"
            )));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for IataCode {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<IataCode> for String {
    fn from(code: IataCode) -> Self {
        code.0
    }
}

impl std::fmt::Display for IataCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Airport
// ---------------------------------------------------------------------------

/// Airport reference data, externally sourced and read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Airport {
    pub iata: IataCode,
    pub name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Airport {
    /// Great-circle distance in kilometres to another airport.
    pub fn distance_km_to(&self, other: &Airport) -> f64 {
        haversine_km(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iata_code_parses_and_uppercases() {
        let code = IataCode::parse("fra").unwrap();
        assert_eq!(code.as_str(), "FRA");
    }

    #[test]
    fn iata_code_trims_whitespace() {
        assert_eq!(IataCode::parse(" jfk ").unwrap().as_str(), "JFK");
    }

    #[test]
    fn iata_code_rejects_wrong_length() {
        assert!(IataCode::parse("FR").is_err());
        assert!(IataCode::parse("FRAN").is_err());
        assert!(IataCode::parse("").is_err());
    }

    #[test]
    fn iata_code_rejects_non_letters() {
        assert!(IataCode::parse("F1A").is_err());
        assert!(IataCode::parse("-RA").is_err());
    }

    #[test]
    fn coordinates_in_range_accepted() {
        assert!(validate_coordinates(0.0, 0.0).is_ok());
        assert!(validate_coordinates(-90.0, 180.0).is_ok());
        assert!(validate_coordinates(90.0, -180.0).is_ok());
    }

    #[test]
    fn latitude_out_of_range_rejected() {
        assert!(validate_coordinates(90.1, 0.0).is_err());
        assert!(validate_coordinates(-90.1, 0.0).is_err());
    }

    #[test]
    fn longitude_out_of_range_rejected() {
        assert!(validate_coordinates(0.0, 180.1).is_err());
        assert!(validate_coordinates(0.0, -180.1).is_err());
    }

    #[test]
    fn airport_distance_uses_great_circle() {
        let fra = Airport {
            iata: IataCode::parse("FRA").unwrap(),
            name: "Frankfurt".into(),
            country: "DE".into(),
            latitude: 50.0379,
            longitude: 8.5622,
        };
        let jfk = Airport {
            iata: IataCode::parse("JFK").unwrap(),
            name: "New York JFK".into(),
            country: "US".into(),
            latitude: 40.6413,
            longitude: -73.7781,
        };
        let d = fra.distance_km_to(&jfk);
        assert!((6100.0..6300.0).contains(&d));
        assert!((d - jfk.distance_km_to(&fra)).abs() < 1e-9);
    }
}
