use serde::{Deserialize, Serialize};

use crate::models::error::GeoError;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    #[serde(alias = "lon")]
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn try_new(lat: f64, lng: f64) -> Result<Self, GeoError> {
        let point = Self::new(lat, lng);
        point.validate()?;
        Ok(point)
    }

    /// Rejects non-finite values and anything outside `[-90, 90]` x `[-180, 180]`.
    pub fn validate(&self) -> Result<(), GeoError> {
        let lat_ok = self.lat.is_finite() && (-90.0..=90.0).contains(&self.lat);
        let lng_ok = self.lng.is_finite() && (-180.0..=180.0).contains(&self.lng);

        if lat_ok && lng_ok {
            Ok(())
        } else {
            Err(GeoError::InvalidCoordinate {
                lat: self.lat,
                lng: self.lng,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_range_bounds() {
        assert!(GeoPoint::try_new(90.0, 180.0).is_ok());
        assert!(GeoPoint::try_new(-90.0, -180.0).is_ok());
        assert!(GeoPoint::try_new(40.7128, -74.0060).is_ok());
    }

    #[test]
    fn rejects_out_of_range_and_non_finite() {
        assert_eq!(
            GeoPoint::try_new(90.5, 0.0),
            Err(GeoError::InvalidCoordinate { lat: 90.5, lng: 0.0 })
        );
        assert!(GeoPoint::try_new(0.0, -180.1).is_err());
        assert!(GeoPoint::try_new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::try_new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn deserializes_lon_alias() {
        let point: GeoPoint = serde_json::from_str(r#"{"lat": 1.5, "lon": 2.5}"#).unwrap();
        assert_eq!(point, GeoPoint::new(1.5, 2.5));

        let point: GeoPoint = serde_json::from_str(r#"{"lat": 1.5, "lng": 2.5}"#).unwrap();
        assert_eq!(point, GeoPoint::new(1.5, 2.5));
    }
}
