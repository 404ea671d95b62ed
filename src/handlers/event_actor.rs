use std::time::Duration;

use serde_json::json;
use tokio::select;
use tokio::sync::{broadcast, mpsc};
use tokio::time::sleep;
use tracing::{debug, info};

use crate::handlers::events::Command;
use crate::handlers::processor::UpdateProcessor;
use crate::models::updates::OrderState;

pub const PROCESSED: &str = "\"PROCESSED\"";
pub const ORDER_COMPLETE: &str = "\"ORDER_COMPLETE\"";
pub const SESSION_EXPIRED: &str = "\"SESSION_EXPIRED\"";

/// Drives one order's [`UpdateProcessor`]: reads raw websocket text from both
/// parties, and publishes the resulting JSON messages back to them.
pub struct EventActor {
    order_id: String,
    inbound_customer: mpsc::Receiver<String>,
    inbound_courier: mpsc::Receiver<String>,
    outbound_customer: broadcast::Sender<String>,
    outbound_courier: broadcast::Sender<String>,
    processor: UpdateProcessor,
    idle_timeout: Duration,
}

impl EventActor {
    pub fn new(
        order_id: String,
        processor: UpdateProcessor,
        inbound_customer: mpsc::Receiver<String>,
        inbound_courier: mpsc::Receiver<String>,
        outbound_customer: broadcast::Sender<String>,
        outbound_courier: broadcast::Sender<String>,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            order_id,
            inbound_customer,
            inbound_courier,
            outbound_customer,
            outbound_courier,
            processor,
            idle_timeout,
        }
    }

    pub async fn run_actor(mut self) {
        enum Message {
            Customer(String),
            Courier(String),
            Idle,
        }

        loop {
            // any message from either party restarts the idle timer
            let message = select! {
                message = self.inbound_customer.recv() => message.map(Message::Customer),
                message = self.inbound_courier.recv() => message.map(Message::Courier),
                _ = sleep(self.idle_timeout) => Some(Message::Idle),
            };

            let commands = match message {
                Some(Message::Customer(text)) => match serde_json::from_str(&text) {
                    Ok(update) => self.processor.process_customer_update(update),
                    Err(e) => vec![Command::CustomerError(format!(
                        "Error deserializing update: {}",
                        e
                    ))],
                },
                Some(Message::Courier(text)) => match serde_json::from_str(&text) {
                    Ok(update) => self.processor.process_courier_update(update),
                    Err(e) => vec![Command::CourierError(format!(
                        "Error deserializing update: {}",
                        e
                    ))],
                },
                Some(Message::Idle) => {
                    info!(
                        "Order {}: no traffic for {:?}, closing session",
                        self.order_id, self.idle_timeout
                    );
                    self.send_customer(SESSION_EXPIRED.to_string());
                    self.send_courier(SESSION_EXPIRED.to_string());
                    return;
                }
                None => {
                    info!("Order {}: channel closed", self.order_id);
                    return;
                }
            };

            for command in commands {
                match command {
                    Command::SendCourierNotify(update) => {
                        self.send_courier(self.wrap(json!(update)).to_string())
                    }
                    Command::SendCustomerNotify(update) => {
                        self.send_customer(self.wrap(json!(update)).to_string())
                    }
                    Command::Transition(state) => self.transition(state),
                    Command::ProcessedCourierUpdate => self.send_courier(PROCESSED.to_string()),
                    Command::CourierError(e) => {
                        self.send_courier(json!({ "error": e }).to_string())
                    }
                    Command::CustomerError(e) => {
                        self.send_customer(json!({ "error": e }).to_string())
                    }
                    Command::OrderComplete => {
                        info!("Order {} complete", self.order_id);
                        self.send_customer(ORDER_COMPLETE.to_string());
                        self.send_courier(ORDER_COMPLETE.to_string());
                        return;
                    }
                }
            }
        }
    }

    fn wrap(&self, update: serde_json::Value) -> serde_json::Value {
        json!({
            "update": update,
            "order_state": self.processor.state().to_string(),
        })
    }

    // Nobody listening is fine, the party may not have connected yet.
    fn send_customer(&self, msg: String) {
        if self.outbound_customer.send(msg).is_err() {
            debug!("Order {}: no customer connected", self.order_id);
        }
    }

    fn send_courier(&self, msg: String) {
        if self.outbound_courier.send(msg).is_err() {
            debug!("Order {}: no courier connected", self.order_id);
        }
    }

    fn transition(&self, state: OrderState) {
        info!("Order {}: transitioning to {}", self.order_id, state);
        let transition_msg = json!({ "transition": state.to_string() }).to_string();

        self.send_customer(transition_msg.clone());
        self.send_courier(transition_msg);
    }
}
