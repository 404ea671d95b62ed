use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Semaphore;

use crate::config::Config;
use crate::handlers::websocket_actor::OrderSessionHandler;
use crate::vendors::VendorSource;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub vendors: Arc<dyn VendorSource>,
    pub sessions: Arc<DashMap<String, OrderSessionHandler>>,
    pub order_permits: Arc<Semaphore>,
}

impl AppState {
    pub fn new(config: Config, vendors: Arc<dyn VendorSource>) -> Self {
        let order_permits = Arc::new(Semaphore::new(config.max_concurrent_orders));

        Self {
            config: Arc::new(config),
            vendors,
            sessions: Arc::new(DashMap::new()),
            order_permits,
        }
    }
}
