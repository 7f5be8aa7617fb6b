//! Per-viewer cache of board listings.
//!
//! Entries are keyed by listing kind and viewer. Every published board
//! event clears the whole cache (see [`AppState::publish`]), so a listing is
//! never served across a mutation. A generation counter stops a load that
//! started before a clear from repopulating the cache with stale rows.
//!
//! [`AppState::publish`]: crate::state::AppState::publish

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use boardwalk_core::board::scope::Viewer;
use boardwalk_core::board::Board;
use boardwalk_core::error::CoreError;
use boardwalk_core::types::DbId;
use tokio::sync::RwLock;

/// Which board listing an entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Listing {
    /// The default read path for a viewer.
    Visible,
    /// Public boards; identical for every viewer.
    Public,
}

type CacheKey = (Listing, Option<DbId>);

pub struct BoardListCache {
    enabled: bool,
    generation: AtomicU64,
    entries: RwLock<HashMap<CacheKey, Vec<Board>>>,
}

impl BoardListCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            generation: AtomicU64::new(0),
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn key(listing: Listing, viewer: &Viewer) -> CacheKey {
        match listing {
            Listing::Visible => (listing, viewer.account_id()),
            Listing::Public => (listing, None),
        }
    }

    /// Return the cached listing, or run `load` and cache its result.
    pub async fn get_or_load<F, Fut>(
        &self,
        listing: Listing,
        viewer: &Viewer,
        load: F,
    ) -> Result<Vec<Board>, CoreError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Board>, CoreError>>,
    {
        if !self.enabled {
            return load().await;
        }

        let key = Self::key(listing, viewer);
        if let Some(boards) = self.entries.read().await.get(&key) {
            tracing::trace!(?listing, viewer = ?viewer.account_id(), "Board list cache hit");
            return Ok(boards.clone());
        }

        let generation = self.generation.load(Ordering::Acquire);
        let boards = load().await?;

        let mut entries = self.entries.write().await;
        if self.generation.load(Ordering::Acquire) == generation {
            entries.insert(key, boards.clone());
        }
        Ok(boards)
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        self.generation.fetch_add(1, Ordering::AcqRel);
        entries.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
