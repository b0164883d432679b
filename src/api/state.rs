use tokio_rusqlite::Connection;

use crate::core::AppConfig;
use crate::scheduling::{EventCache, QueryMemory};

pub struct AppState {
    pub db: Connection,
    pub config: AppConfig,
    // Fetched events per account, reused until the TTL runs out
    pub event_cache: EventCache,
    pub query_memory: QueryMemory,
}

impl AppState {
    pub fn new(db: Connection, config: AppConfig) -> Self {
        Self {
            db,
            event_cache: EventCache::new(config.cache_ttl()),
            query_memory: QueryMemory::new(config.history_capacity),
            config,
        }
    }
}
