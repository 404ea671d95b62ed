use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::models::geo_point::GeoPoint;

// Order States

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OrderState {
    OrderCreated,
    OrderInTransit,
    OrderDelivered,
}

impl Display for OrderState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OrderState::OrderCreated => "OrderCreated",
            OrderState::OrderInTransit => "OrderInTransit",
            OrderState::OrderDelivered => "OrderDelivered",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    pub km: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub enum InboundCourierUpdate {
    TookOrder,
    InTransit(GeoPoint),
    Delivered,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub enum InboundCustomerUpdate {
    DeliveryConfirmed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum OutboundCustomerUpdate {
    TookOrder,
    #[serde(rename_all = "camelCase")]
    InTransit {
        position: GeoPoint,
        distance_km: f64,
    },
    OrderNearby(Distance),
    Delivered,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum OutboundCourierUpdate {
    DeliveryConfirmed,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn courier_updates_are_externally_tagged() {
        let update: InboundCourierUpdate = serde_json::from_str("\"TookOrder\"").unwrap();
        assert_eq!(update, InboundCourierUpdate::TookOrder);

        let update: InboundCourierUpdate =
            serde_json::from_value(json!({"InTransit": {"lat": 40.0, "lon": -74.0}})).unwrap();
        assert_eq!(update, InboundCourierUpdate::InTransit(GeoPoint::new(40.0, -74.0)));
    }

    #[test]
    fn customer_notices_serialize() {
        let notice = OutboundCustomerUpdate::InTransit {
            position: GeoPoint::new(1.0, 2.0),
            distance_km: 0.5,
        };
        assert_eq!(
            serde_json::to_value(&notice).unwrap(),
            json!({"InTransit": {"position": {"lat": 1.0, "lng": 2.0}, "distanceKm": 0.5}})
        );
        let nearby = OutboundCustomerUpdate::OrderNearby(Distance { km: 0.3 });
        assert_eq!(
            serde_json::to_value(&nearby).unwrap(),
            json!({"OrderNearby": {"km": 0.3}})
        );
    }
}
