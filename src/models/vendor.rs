use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::geo::Located;
use crate::models::error::GeoError;
use crate::models::geo_point::GeoPoint;

/// A restaurant or store as supplied by the vendor source.
///
/// Coordinates are optional on the wire; records without them are rejected
/// by [`Located::location`] rather than producing a meaningless distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub is_open: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VendorRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lat: Some(lat),
            lng: Some(lng),
            rating: None,
            is_open: true,
            category: None,
            extra: Map::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn closed(mut self) -> Self {
        self.is_open = false;
        self
    }

    pub fn in_category(&self, category: &str) -> bool {
        self.category
            .as_deref()
            .map_or(false, |c| c.eq_ignore_ascii_case(category))
    }
}

impl Located for VendorRecord {
    fn location(&self) -> Result<GeoPoint, GeoError> {
        let lat = self.lat.ok_or(GeoError::MissingCoordinate("lat"))?;
        let lng = self.lng.ok_or(GeoError::MissingCoordinate("lng"))?;
        GeoPoint::try_new(lat, lng)
    }
}
