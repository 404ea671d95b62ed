use tracing::debug;

use crate::geo::distance_km;
use crate::handlers::events::Command;
use crate::models::geo_point::GeoPoint;
use crate::models::updates::{
    Distance, InboundCourierUpdate, InboundCustomerUpdate, OrderState, OutboundCourierUpdate,
    OutboundCustomerUpdate,
};

/// Per-order tracking state machine. Knows where the order is headed and
/// turns courier positions into distance notices for the customer.
pub struct UpdateProcessor {
    state: OrderState,
    destination: GeoPoint,
    notify_within_km: f64,
    nearby_sent: bool,
}

impl UpdateProcessor {
    pub fn new(destination: GeoPoint, notify_within_km: f64) -> Self {
        Self {
            state: OrderState::OrderCreated,
            destination,
            notify_within_km,
            nearby_sent: false,
        }
    }

    pub fn state(&self) -> OrderState {
        self.state
    }

    pub fn process_courier_update(&mut self, update: InboundCourierUpdate) -> Vec<Command> {
        match (self.state, update) {
            (OrderState::OrderCreated, InboundCourierUpdate::TookOrder) => {
                self.state = OrderState::OrderInTransit;
                vec![
                    Command::SendCustomerNotify(OutboundCustomerUpdate::TookOrder),
                    Command::Transition(OrderState::OrderInTransit),
                ]
            }
            (OrderState::OrderInTransit, InboundCourierUpdate::InTransit(position)) => {
                if let Err(e) = position.validate() {
                    return vec![Command::CourierError(e.to_string())];
                }

                let km = distance_km(position, self.destination);
                debug!("Courier is {:.3} km from destination", km);

                let mut commands = vec![Command::SendCustomerNotify(
                    OutboundCustomerUpdate::InTransit {
                        position,
                        distance_km: km,
                    },
                )];
                if !self.nearby_sent && km <= self.notify_within_km {
                    self.nearby_sent = true;
                    commands.push(Command::SendCustomerNotify(
                        OutboundCustomerUpdate::OrderNearby(Distance { km }),
                    ));
                }
                commands.push(Command::ProcessedCourierUpdate);
                commands
            }
            (OrderState::OrderInTransit, InboundCourierUpdate::Delivered) => {
                self.state = OrderState::OrderDelivered;
                vec![
                    Command::SendCustomerNotify(OutboundCustomerUpdate::Delivered),
                    Command::Transition(OrderState::OrderDelivered),
                ]
            }
            (state, update) => vec![Command::CourierError(format!(
                "Update {:?} not accepted in state {}",
                update, state
            ))],
        }
    }

    pub fn process_customer_update(&mut self, update: InboundCustomerUpdate) -> Vec<Command> {
        match (self.state, update) {
            (OrderState::OrderDelivered, InboundCustomerUpdate::DeliveryConfirmed) => vec![
                Command::SendCourierNotify(OutboundCourierUpdate::DeliveryConfirmed),
                Command::OrderComplete,
            ],
            (state, update) => vec![Command::CustomerError(format!(
                "Update {:?} not accepted in state {}",
                update, state
            ))],
        }
    }
}
