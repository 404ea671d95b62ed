use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::geo::{self, format_distance, DistanceUnit, Nearby};
use crate::models::error::ApiError;
use crate::models::geo_point::GeoPoint;
use crate::models::vendor::VendorRecord;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyParams {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Radius expressed in `unit`.
    pub max_distance: Option<f64>,
    #[serde(default)]
    pub unit: DistanceUnit,
    pub category: Option<String>,
    #[serde(default)]
    pub open_only: bool,
    pub limit: Option<usize>,
}

impl NearbyParams {
    fn origin(&self) -> Result<GeoPoint, ApiError> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Ok(GeoPoint::try_new(lat, lng)?),
            _ => Err(ApiError::BadRequest(
                "Query parameters lat and lng are required".to_string(),
            )),
        }
    }

    fn accepts(&self, vendor: &VendorRecord) -> bool {
        if self.open_only && !vendor.is_open {
            return false;
        }
        match &self.category {
            Some(category) => vendor.in_category(category),
            None => true,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyVendor {
    #[serde(flatten)]
    pub vendor: VendorRecord,
    pub distance: f64,
    pub distance_label: String,
}

impl NearbyVendor {
    fn new(nearby: Nearby<VendorRecord>, unit: DistanceUnit) -> Self {
        Self {
            vendor: nearby.entity,
            distance: unit.from_km(nearby.distance),
            distance_label: format_distance(nearby.distance, unit),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NearbyResponse {
    pub restaurants: Vec<NearbyVendor>,
    pub excluded: usize,
    pub unit: DistanceUnit,
}

pub async fn nearby_restaurants(
    State(state): State<AppState>,
    query: Result<Query<NearbyParams>, QueryRejection>,
) -> Result<Json<NearbyResponse>, ApiError> {
    let Query(params) = query?;
    let origin = params.origin()?;
    let unit = params.unit;
    let max_distance_km = params
        .max_distance
        .map(|d| unit.to_km(d))
        .unwrap_or(state.config.default_max_distance_km);

    let candidates: Vec<VendorRecord> = state
        .vendors
        .vendors()
        .await?
        .into_iter()
        .filter(|vendor| params.accepts(vendor))
        .collect();

    let result = geo::nearby(&candidates, origin, max_distance_km)?;
    if result.excluded > 0 {
        warn!(
            "Skipped {} vendors with missing or invalid coordinates",
            result.excluded
        );
    }

    let limit = params.limit.unwrap_or(usize::MAX);
    let restaurants: Vec<NearbyVendor> = result
        .entities
        .into_iter()
        .take(limit)
        .map(|n| NearbyVendor::new(n, unit))
        .collect();

    info!(
        "Nearby query at ({}, {}) within {} km: {} of {} vendors",
        origin.lat,
        origin.lng,
        max_distance_km,
        restaurants.len(),
        candidates.len()
    );

    Ok(Json(NearbyResponse {
        restaurants,
        excluded: result.excluded,
        unit,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceParams {
    pub from_lat: f64,
    pub from_lng: f64,
    pub to_lat: f64,
    pub to_lng: f64,
    #[serde(default)]
    pub unit: DistanceUnit,
}

#[derive(Debug, Serialize)]
pub struct DistanceResponse {
    pub distance: f64,
    pub unit: DistanceUnit,
}

pub async fn distance(
    query: Result<Query<DistanceParams>, QueryRejection>,
) -> Result<Json<DistanceResponse>, ApiError> {
    let Query(params) = query?;
    let from = GeoPoint::try_new(params.from_lat, params.from_lng)?;
    let to = GeoPoint::try_new(params.to_lat, params.to_lng)?;

    Ok(Json(DistanceResponse {
        distance: params.unit.from_km(geo::distance_km(from, to)),
        unit: params.unit,
    }))
}
