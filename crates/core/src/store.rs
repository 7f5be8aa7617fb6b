//! Board persistence collaborator.
//!
//! The store is the sole arbiter of write ordering for a board. Writes carry
//! the version the caller read; a store must reject the write with
//! [`StoreError::Conflict`] if the board changed in between, so that two
//! concurrent membership edits never silently overwrite each other.

use async_trait::async_trait;

use crate::board::scope::Viewer;
use crate::board::{Board, BoardPatch, NewBoard};
use crate::error::CoreError;
use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Board {id} not found")]
    NotFound { id: DbId },

    #[error("Board {id} was modified concurrently (expected version {expected})")]
    Conflict { id: DbId, expected: i64 },

    #[error("Board store error: {0}")]
    Backend(String),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id } => CoreError::NotFound { entity: "Board", id },
            StoreError::Conflict { .. } => CoreError::Conflict(err.to_string()),
            StoreError::Backend(msg) => CoreError::Internal(msg),
        }
    }
}

#[async_trait]
pub trait BoardStore: Send + Sync {
    /// Insert a new board at version 1.
    async fn insert_board(&self, board: NewBoard) -> Result<Board, StoreError>;

    /// Read a board by id, including archived and soft-deleted ones.
    async fn read_board(&self, id: DbId) -> Result<Option<Board>, StoreError>;

    /// Apply `patch` atomically if the stored version equals
    /// `expected_version`, bumping the version. Returns the updated board.
    async fn write_board(
        &self,
        id: DbId,
        expected_version: i64,
        patch: &BoardPatch,
    ) -> Result<Board, StoreError>;

    /// Candidate boards a viewer might see.
    ///
    /// May return a superset; callers always apply a
    /// [`ScopeChain`](crate::board::scope::ScopeChain) afterwards. Ordered by
    /// `position`, then id.
    async fn list_candidates(&self, viewer: &Viewer) -> Result<Vec<Board>, StoreError>;
}
