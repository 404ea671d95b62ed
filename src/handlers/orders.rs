use axum::extract::rejection::JsonRejection;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::{Json, TypedHeader};
use dashmap::mapref::entry::Entry;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::handlers::websocket_actor::{run_websocket, OrderSessionHandler};
use crate::models::error::ApiError;
use crate::models::geo_point::GeoPoint;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInfo {
    pub order_id: String,
    pub customer_id: String,
    pub courier_id: String,
    pub destination: GeoPoint,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeolocationLinks {
    pub order_id: String,
    pub customer: String,
    pub courier: String,
}

pub async fn create_order(
    State(state): State<AppState>,
    body: Result<Json<OrderInfo>, JsonRejection>,
) -> Result<(StatusCode, Json<GeolocationLinks>), ApiError> {
    let Json(order) = body?;
    order.destination.validate()?;

    let permit = state
        .order_permits
        .clone()
        .try_acquire_owned()
        .map_err(|_| ApiError::Unavailable("Too many active orders".to_string()))?;

    let (end, completed) = oneshot::channel::<()>();

    match state.sessions.entry(order.order_id.clone()) {
        Entry::Occupied(_) => {
            return Err(ApiError::Conflict(format!(
                "Order {} is already being tracked",
                order.order_id
            )))
        }
        Entry::Vacant(entry) => {
            entry.insert(OrderSessionHandler::new(
                order.order_id.clone(),
                order.customer_id,
                order.courier_id,
                order.destination,
                state.config.nearby_notify_km,
                state.config.session_idle_timeout,
                end,
            ));
        }
    }

    let sessions = state.sessions.clone();
    let order_id = order.order_id.clone();
    tokio::spawn(async move {
        completed.await.ok();
        drop(permit);
        sessions.remove(&order_id);
        info!("Order {} finished, session released", order_id);
    });

    let base = &state.config.public_ws_base;
    let links = GeolocationLinks {
        customer: format!("{}/ws/{}/customer", base, order.order_id),
        courier: format!("{}/ws/{}/courier", base, order.order_id),
        order_id: order.order_id,
    };
    info!("Tracking order {}", links.order_id);

    Ok((StatusCode::CREATED, Json(links)))
}

pub async fn courier_ws_handler(
    ws: WebSocketUpgrade,
    user_agent: Option<TypedHeader<headers::UserAgent>>,
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Response, ApiError> {
    let session = state
        .sessions
        .get(&order_id)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown order {}", order_id)))?;

    debug!(
        "Courier {} connecting to order {} ({:?})",
        session.courier_id,
        order_id,
        user_agent.map(|TypedHeader(ua)| ua.as_str().to_owned())
    );
    let (inbound, outbound) = session.courier_channels();
    drop(session);

    Ok(ws.on_upgrade(move |socket| run_websocket(socket, inbound, outbound)))
}

pub async fn customer_ws_handler(
    ws: WebSocketUpgrade,
    user_agent: Option<TypedHeader<headers::UserAgent>>,
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Response, ApiError> {
    let session = state
        .sessions
        .get(&order_id)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown order {}", order_id)))?;

    debug!(
        "Customer {} connecting to order {} heading to ({}, {}) ({:?})",
        session.customer_id,
        order_id,
        session.destination.lat,
        session.destination.lng,
        user_agent.map(|TypedHeader(ua)| ua.as_str().to_owned())
    );
    let (inbound, outbound) = session.customer_channels();
    drop(session);

    Ok(ws.on_upgrade(move |socket| run_websocket(socket, inbound, outbound)))
}
