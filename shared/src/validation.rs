//! Validation utilities for EcoGuardian requests

use crate::types::GpsCoordinates;

// ============================================================================
// Location Validations
// ============================================================================

/// Validate a requested field location.
///
/// A zero latitude or longitude is treated as "not provided", matching what
/// the dashboard sends before the map has been clicked.
pub fn validate_coordinates(coords: &GpsCoordinates) -> Result<(), (&'static str, &'static str)> {
    if !coords.latitude.is_finite() || coords.latitude == 0.0 {
        return Err(("lat", "Latitude is required"));
    }
    if !coords.longitude.is_finite() || coords.longitude == 0.0 {
        return Err(("lon", "Longitude is required"));
    }
    if !(-90.0..=90.0).contains(&coords.latitude) {
        return Err(("lat", "Latitude must be between -90 and 90"));
    }
    if !(-180.0..=180.0).contains(&coords.longitude) {
        return Err(("lon", "Longitude must be between -180 and 180"));
    }
    Ok(())
}

// ============================================================================
// Sensor Validations
// ============================================================================

/// Validate that every sensor value is a real number
pub fn validate_sensor_values(
    temperature: f64,
    humidity: f64,
    precipitation: f64,
) -> Result<(), (&'static str, &'static str)> {
    if !temperature.is_finite() {
        return Err(("temperatura", "Temperature must be a finite number"));
    }
    if !humidity.is_finite() {
        return Err(("humedad", "Humidity must be a finite number"));
    }
    if !precipitation.is_finite() {
        return Err(("precipitacion", "Precipitation must be a finite number"));
    }
    Ok(())
}

/// Check if humidity is within the physical 0-100% range
pub fn is_plausible_humidity(humidity: f64) -> bool {
    (0.0..=100.0).contains(&humidity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_coordinates_valid() {
        // Cusco, Huancayo, Cajamarca
        assert!(validate_coordinates(&GpsCoordinates::new(-13.5319, -71.9675)).is_ok());
        assert!(validate_coordinates(&GpsCoordinates::new(-12.0651, -75.2049)).is_ok());
        assert!(validate_coordinates(&GpsCoordinates::new(-7.1638, -78.5003)).is_ok());
        assert!(validate_coordinates(&GpsCoordinates::new(90.0, 180.0)).is_ok());
    }

    #[test]
    fn test_validate_coordinates_missing() {
        assert_eq!(
            validate_coordinates(&GpsCoordinates::new(0.0, -71.9)).unwrap_err().0,
            "lat"
        );
        assert_eq!(
            validate_coordinates(&GpsCoordinates::new(-13.5, 0.0)).unwrap_err().0,
            "lon"
        );
        assert!(validate_coordinates(&GpsCoordinates::new(f64::NAN, -71.9)).is_err());
    }

    #[test]
    fn test_validate_coordinates_out_of_range() {
        assert!(validate_coordinates(&GpsCoordinates::new(-91.0, -71.9)).is_err());
        assert!(validate_coordinates(&GpsCoordinates::new(-13.5, 181.0)).is_err());
    }

    #[test]
    fn test_validate_sensor_values() {
        assert!(validate_sensor_values(14.0, 92.0, 0.0).is_ok());
        assert!(validate_sensor_values(-40.0, 120.0, -1.0).is_ok());
        assert_eq!(
            validate_sensor_values(f64::INFINITY, 92.0, 0.0).unwrap_err().0,
            "temperatura"
        );
        assert_eq!(
            validate_sensor_values(14.0, f64::NAN, 0.0).unwrap_err().0,
            "humedad"
        );
    }

    #[test]
    fn test_plausible_humidity() {
        assert!(is_plausible_humidity(0.0));
        assert!(is_plausible_humidity(100.0));
        assert!(!is_plausible_humidity(100.5));
        assert!(!is_plausible_humidity(-1.0));
    }
}
