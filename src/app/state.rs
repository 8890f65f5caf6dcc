//! Application state shared across routes

use std::sync::Arc;

use crate::config::Config;
use crate::relay::RelayService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub relay: Arc<RelayService>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let relay = Arc::new(RelayService::new(config.max_room_size));

        Self {
            config: Arc::new(config),
            relay,
        }
    }
}
