use crate::models::updates::{OrderState, OutboundCourierUpdate, OutboundCustomerUpdate};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SendCourierNotify(OutboundCourierUpdate),
    SendCustomerNotify(OutboundCustomerUpdate),
    Transition(OrderState),
    ProcessedCourierUpdate,
    CourierError(String),
    CustomerError(String),
    OrderComplete,
}
