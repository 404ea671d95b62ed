//! Geolocation service for the delivery app.
//!
//! Answers "which restaurants are near me" queries and relays live courier
//! positions to customers while an order is on its way.
//!
//! Run the server with
//! ```not_rust
//! VENDORS_FILE=vendors.json cargo run
//! ```
//!
//! Then query it with
//! ```not_rust
//! curl 'http://localhost:3000/api/restaurants/nearby?lat=40.7128&lng=-74.0060&maxDistance=5'
//! ```

mod config;
mod geo;
mod handlers;
mod models;
mod state;
mod vendors;

use std::net::SocketAddr;
use std::process;
use std::sync::Arc;

use axum::Server;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, CONFIG};
use crate::state::AppState;
use crate::vendors::InMemoryVendorStore;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nearby_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::clone(&CONFIG);

    let vendors = match &config.vendors_file {
        Some(path) => match InMemoryVendorStore::from_file(path) {
            Ok(store) if store.is_empty() => {
                warn!("{} holds no vendors", path.display());
                store
            }
            Ok(store) => store,
            Err(e) => {
                error!("Unable to load vendors: {}", e);
                process::exit(1);
            }
        },
        None => {
            warn!("VENDORS_FILE not set, serving an empty vendor list");
            InMemoryVendorStore::default()
        }
    };

    let address: SocketAddr = match config.bind_address().parse() {
        Ok(address) => address,
        Err(e) => {
            error!("Invalid bind address {}: {}", config.bind_address(), e);
            process::exit(1);
        }
    };

    let app = handlers::router(AppState::new(config, Arc::new(vendors)));

    info!("listening on {}", address);
    if let Err(e) = Server::bind(&address)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        process::exit(1);
    }

    info!("Server shut down");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
