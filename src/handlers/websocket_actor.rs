use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::handlers::event_actor::EventActor;
use crate::handlers::processor::UpdateProcessor;
use crate::models::geo_point::GeoPoint;

const INBOUND_CAPACITY: usize = 8;
const OUTBOUND_CAPACITY: usize = 64;

struct AutoCancelTask<T>(pub JoinHandle<T>);

impl<T> Drop for AutoCancelTask<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Registry entry for an order being tracked.
pub struct OrderSessionHandler {
    pub customer_id: String,
    pub courier_id: String,
    pub destination: GeoPoint,
    _handle: AutoCancelTask<()>,
    inbound_customer: mpsc::Sender<String>,
    inbound_courier: mpsc::Sender<String>,
    outbound_customer: broadcast::Sender<String>,
    outbound_courier: broadcast::Sender<String>,
}

impl OrderSessionHandler {
    pub fn new(
        order_id: String,
        customer_id: String,
        courier_id: String,
        destination: GeoPoint,
        notify_within_km: f64,
        idle_timeout: Duration,
        end: oneshot::Sender<()>,
    ) -> Self {
        let (inbound_customer, inbound_customer_recv) = mpsc::channel(INBOUND_CAPACITY);
        let (inbound_courier, inbound_courier_recv) = mpsc::channel(INBOUND_CAPACITY);
        let (outbound_customer, _) = broadcast::channel(OUTBOUND_CAPACITY);
        let (outbound_courier, _) = broadcast::channel(OUTBOUND_CAPACITY);

        let operator = EventActor::new(
            order_id,
            UpdateProcessor::new(destination, notify_within_km),
            inbound_customer_recv,
            inbound_courier_recv,
            outbound_customer.clone(),
            outbound_courier.clone(),
            idle_timeout,
        );

        Self {
            customer_id,
            courier_id,
            destination,
            _handle: AutoCancelTask(tokio::spawn(async move {
                operator.run_actor().await;
                end.send(()).ok();
            })),
            inbound_customer,
            inbound_courier,
            outbound_customer,
            outbound_courier,
        }
    }

    /// Subscribes before the upgrade completes so nothing sent after the
    /// handshake is missed.
    pub fn customer_channels(&self) -> (mpsc::Sender<String>, broadcast::Receiver<String>) {
        (
            self.inbound_customer.clone(),
            self.outbound_customer.subscribe(),
        )
    }

    pub fn courier_channels(&self) -> (mpsc::Sender<String>, broadcast::Receiver<String>) {
        (
            self.inbound_courier.clone(),
            self.outbound_courier.subscribe(),
        )
    }
}

/// Pumps one websocket until either side goes away.
pub async fn run_websocket(
    socket: WebSocket,
    inbound: mpsc::Sender<String>,
    mut outbound: broadcast::Receiver<String>,
) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let mut recv_task = AutoCancelTask(tokio::spawn(async move {
        while let Some(Ok(msg)) = ws_receiver.next().await {
            debug!("Received message: {:?}", msg);
            if let Message::Text(text) = msg {
                if inbound.send(text).await.is_err() {
                    break;
                }
            }
        }
    }));

    let mut send_task = AutoCancelTask(tokio::spawn(async move {
        loop {
            match outbound.recv().await {
                Ok(msg) => {
                    debug!("Sending message: {:?}", msg);
                    if ws_sender.send(Message::Text(msg)).await.is_err() {
                        return;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Websocket fell behind, skipped {} messages", skipped)
                }
                Err(RecvError::Closed) => break,
            }
        }
        ws_sender.send(Message::Close(None)).await.ok();
    }));

    tokio::select! {
        _ = &mut recv_task.0 => (),
        _ = &mut send_task.0 => (),
    }
}
