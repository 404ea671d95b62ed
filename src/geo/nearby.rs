use serde::Serialize;
use tracing::debug;

use crate::geo::distance::distance_km;
use crate::models::error::GeoError;
use crate::models::geo_point::GeoPoint;

/// Anything with a position that can be placed on the map.
pub trait Located {
    fn location(&self) -> Result<GeoPoint, GeoError>;
}

impl Located for GeoPoint {
    fn location(&self) -> Result<GeoPoint, GeoError> {
        self.validate()?;
        Ok(*self)
    }
}

/// An entity together with its distance (km) from the query origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Nearby<T> {
    #[serde(flatten)]
    pub entity: T,
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearbyResult<T> {
    pub entities: Vec<Nearby<T>>,
    /// Entities skipped because their location could not be resolved.
    pub excluded: usize,
}

/// Keeps the entities within `max_distance_km` of `origin`, closest first.
///
/// The comparison is exact: a radius of zero only keeps entities sitting on
/// the origin coordinates. Entities without a valid location are skipped and
/// counted in [`NearbyResult::excluded`].
pub fn nearby<T: Located + Clone>(
    entities: &[T],
    origin: GeoPoint,
    max_distance_km: f64,
) -> Result<NearbyResult<T>, GeoError> {
    origin.validate()?;
    if max_distance_km.is_nan() || max_distance_km < 0.0 {
        return Err(GeoError::InvalidRadius(max_distance_km));
    }

    let mut excluded = 0;
    let mut retained = Vec::new();

    for entity in entities {
        let location = match entity.location() {
            Ok(location) => location,
            Err(e) => {
                debug!("Skipping entity without usable location: {}", e);
                excluded += 1;
                continue;
            }
        };

        let distance = distance_km(location, origin);
        if distance <= max_distance_km {
            retained.push(Nearby {
                entity: entity.clone(),
                distance,
            });
        }
    }

    // sort_by is stable, ties keep input order
    retained.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    Ok(NearbyResult {
        entities: retained,
        excluded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Spot {
        id: &'static str,
        lat: Option<f64>,
        lng: Option<f64>,
    }

    impl Spot {
        fn at(id: &'static str, lat: f64, lng: f64) -> Self {
            Self {
                id,
                lat: Some(lat),
                lng: Some(lng),
            }
        }
    }

    impl Located for Spot {
        fn location(&self) -> Result<GeoPoint, GeoError> {
            let lat = self.lat.ok_or(GeoError::MissingCoordinate("lat"))?;
            let lng = self.lng.ok_or(GeoError::MissingCoordinate("lng"))?;
            GeoPoint::try_new(lat, lng)
        }
    }

    const NYC: GeoPoint = GeoPoint::new(40.7128, -74.0060);

    fn ids<T>(result: &NearbyResult<T>, id: impl Fn(&T) -> &'static str) -> Vec<&'static str> {
        result.entities.iter().map(|n| id(&n.entity)).collect()
    }

    fn restaurants() -> Vec<Spot> {
        vec![
            Spot::at("rest-001", 40.7128, -74.0060),
            Spot::at("rest-002", 40.7135, -74.0046),
        ]
    }

    #[test]
    fn both_restaurants_within_ten_km() {
        let result = nearby(&restaurants(), NYC, 10.0).unwrap();

        assert_eq!(ids(&result, |s| s.id), vec!["rest-001", "rest-002"]);
        assert_eq!(result.entities[0].distance, 0.0);
        let second = result.entities[1].distance;
        assert!(second > 0.1 && second < 0.2, "got {second}");
        assert_eq!(result.excluded, 0);
    }

    #[test]
    fn zero_radius_keeps_only_exact_match() {
        let result = nearby(&restaurants(), NYC, 0.0).unwrap();
        assert_eq!(ids(&result, |s| s.id), vec!["rest-001"]);
    }

    #[test]
    fn empty_input() {
        let result = nearby::<Spot>(&[], NYC, 25.0).unwrap();
        assert!(result.entities.is_empty());
        assert_eq!(result.excluded, 0);
    }

    #[test]
    fn filter_matches_distance_predicate() {
        let spots = vec![
            Spot::at("a", 40.80, -74.00),
            Spot::at("b", 40.7128, -73.90),
            Spot::at("c", 41.50, -74.00),
            Spot::at("d", 40.60, -74.10),
            Spot::at("e", 40.7128, -74.0060),
        ];
        let radius = 12.0;
        let result = nearby(&spots, NYC, radius).unwrap();
        let kept = ids(&result, |s| s.id);

        for spot in &spots {
            let inside = distance_km(spot.location().unwrap(), NYC) <= radius;
            assert_eq!(kept.contains(&spot.id), inside, "spot {}", spot.id);
        }
    }

    #[test]
    fn sorted_by_distance() {
        let spots = vec![
            Spot::at("far", 40.90, -74.00),
            Spot::at("near", 40.72, -74.00),
            Spot::at("mid", 40.80, -74.00),
        ];
        let result = nearby(&spots, NYC, 100.0).unwrap();

        assert_eq!(ids(&result, |s| s.id), vec!["near", "mid", "far"]);
        assert!(result
            .entities
            .windows(2)
            .all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn ties_keep_input_order() {
        let spots = vec![
            Spot::at("first", 40.72, -74.0060),
            Spot::at("second", 40.72, -74.0060),
            Spot::at("third", 40.72, -74.0060),
        ];
        let result = nearby(&spots, NYC, 5.0).unwrap();
        assert_eq!(ids(&result, |s| s.id), vec!["first", "second", "third"]);
    }

    #[test]
    fn input_left_untouched() {
        let spots = restaurants();
        let before = spots.clone();
        let _ = nearby(&spots, NYC, 10.0).unwrap();
        assert_eq!(spots, before);
    }

    #[test]
    fn invalid_entities_are_excluded_and_counted() {
        let spots = vec![
            Spot::at("ok", 40.7128, -74.0060),
            Spot {
                id: "no-lat",
                lat: None,
                lng: Some(-74.0),
            },
            Spot::at("out-of-range", 123.0, -74.0),
            Spot::at("nan", f64::NAN, -74.0),
        ];
        let result = nearby(&spots, NYC, 10.0).unwrap();

        assert_eq!(ids(&result, |s| s.id), vec!["ok"]);
        assert_eq!(result.excluded, 3);
        assert!(result.entities.iter().all(|n| n.distance.is_finite()));
    }

    #[test]
    fn rejects_bad_radius_and_origin() {
        assert_eq!(
            nearby(&restaurants(), NYC, -1.0),
            Err(GeoError::InvalidRadius(-1.0))
        );
        assert!(matches!(
            nearby(&restaurants(), NYC, f64::NAN),
            Err(GeoError::InvalidRadius(_))
        ));
        assert!(matches!(
            nearby(&restaurants(), GeoPoint::new(0.0, 200.0), 10.0),
            Err(GeoError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn unbounded_radius_keeps_everything() {
        let result = nearby(&restaurants(), GeoPoint::new(-33.86, 151.2), f64::INFINITY).unwrap();
        assert_eq!(result.entities.len(), 2);
    }

    #[test]
    fn antipodal_entity_is_kept_by_unbounded_radius() {
        let origin = GeoPoint::new(-51.99999999999997, -179.0);
        let spots = vec![Spot::at("antipode", 51.99999999999997, 1.0)];

        let result = nearby(&spots, origin, f64::INFINITY).unwrap();
        assert_eq!(ids(&result, |s| s.id), vec!["antipode"]);
        assert!(result.entities[0].distance.is_finite());
        assert_eq!(result.excluded, 0);
    }

    #[test]
    fn points_are_located() {
        let points = [GeoPoint::new(40.7135, -74.0046), GeoPoint::new(95.0, 0.0)];
        let result = nearby(&points, NYC, 1.0).unwrap();
        assert_eq!(result.entities.len(), 1);
        assert_eq!(result.excluded, 1);
    }
}
