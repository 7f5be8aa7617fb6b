use std::sync::Arc;

use boardwalk_core::service::BoardService;
use boardwalk_events::{BoardEvent, EventBus};

use crate::cache::BoardListCache;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database pool, absent when running on the memory store.
    pub pool: Option<boardwalk_db::DbPool>,
    pub config: Arc<ServerConfig>,
    pub boards: BoardService,
    pub list_cache: Arc<BoardListCache>,
    pub event_bus: Arc<EventBus>,
}

impl AppState {
    /// Announce a persisted board mutation.
    ///
    /// Clears the listing cache before broadcasting, so the next read after
    /// a successful write always sees it.
    pub async fn publish(&self, event: BoardEvent) {
        self.list_cache.clear().await;
        self.event_bus.publish(event);
    }
}
