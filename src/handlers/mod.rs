pub mod event_actor;
pub mod events;
pub mod nearby;
pub mod orders;
pub mod processor;
pub mod websocket_actor;


use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/restaurants/nearby", get(nearby::nearby_restaurants))
        .route("/api/distance", get(nearby::distance))
        .route("/api/orders", post(orders::create_order))
        .route("/ws/:order_id/courier", get(orders::courier_ws_handler))
        .route("/ws/:order_id/customer", get(orders::customer_ws_handler))
        // logging so we can see whats going on
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .with_state(state)
}
