pub mod covers;
pub mod error;
pub mod health;
pub mod media;
pub mod response;

use std::sync::Arc;

use crate::database::Database;
use crate::events::EventBus;
use crate::services::covers::{ConfigManager, CoverCacheService};

#[derive(Clone)]
pub struct AppState {
    pub database: Database,
    pub cover_service: Arc<CoverCacheService>,
    pub config_manager: Arc<ConfigManager>,
    pub event_bus: EventBus,
}
