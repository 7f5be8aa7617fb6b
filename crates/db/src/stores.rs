//! PostgreSQL implementations of the core collaborator traits.

use async_trait::async_trait;
use boardwalk_core::account::{AccountDirectory, AccountSummary, DirectoryError};
use boardwalk_core::board::scope::Viewer;
use boardwalk_core::board::{Board, BoardPatch, NewBoard};
use boardwalk_core::store::{BoardStore, StoreError};
use boardwalk_core::types::DbId;

use crate::repositories::{AccountRepo, BoardRepo};
use crate::DbPool;

fn backend(err: sqlx::Error) -> StoreError {
    tracing::error!(error = %err, "Board query failed");
    StoreError::Backend(err.to_string())
}

/// [`BoardStore`] over the `boards` table. Version checks happen inside the
/// `UPDATE` statement, so concurrent writers are serialized by the row lock.
#[derive(Clone)]
pub struct PgBoardStore {
    pool: DbPool,
}

impl PgBoardStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BoardStore for PgBoardStore {
    async fn insert_board(&self, board: NewBoard) -> Result<Board, StoreError> {
        let row = BoardRepo::create(&self.pool, &board).await.map_err(backend)?;
        Ok(row.into())
    }

    async fn read_board(&self, id: DbId) -> Result<Option<Board>, StoreError> {
        let row = BoardRepo::find_by_id(&self.pool, id).await.map_err(backend)?;
        Ok(row.map(Board::from))
    }

    async fn write_board(
        &self,
        id: DbId,
        expected_version: i64,
        patch: &BoardPatch,
    ) -> Result<Board, StoreError> {
        match BoardRepo::update_versioned(&self.pool, id, expected_version, patch)
            .await
            .map_err(backend)?
        {
            Some(row) => Ok(row.into()),
            None => {
                // Tell a missing row apart from a lost race.
                match BoardRepo::current_version(&self.pool, id)
                    .await
                    .map_err(backend)?
                {
                    Some(_) => Err(StoreError::Conflict {
                        id,
                        expected: expected_version,
                    }),
                    None => Err(StoreError::NotFound { id }),
                }
            }
        }
    }

    async fn list_candidates(&self, viewer: &Viewer) -> Result<Vec<Board>, StoreError> {
        let rows = BoardRepo::list_candidates(&self.pool, viewer.account_id())
            .await
            .map_err(backend)?;
        Ok(rows.into_iter().map(Board::from).collect())
    }
}

/// [`AccountDirectory`] over the local `accounts` projection.
#[derive(Clone)]
pub struct PgAccountDirectory {
    pool: DbPool,
}

impl PgAccountDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountDirectory for PgAccountDirectory {
    async fn resolve_accounts(
        &self,
        ids: &[DbId],
        fail_if_any_missing: bool,
    ) -> Result<Vec<AccountSummary>, DirectoryError> {
        let rows = AccountRepo::find_by_ids(&self.pool, ids)
            .await
            .map_err(|e| DirectoryError::Backend(e.to_string()))?;
        let found: Vec<AccountSummary> = rows.into_iter().map(AccountSummary::from).collect();

        if fail_if_any_missing {
            let missing = missing_ids(ids, &found);
            if !missing.is_empty() {
                return Err(DirectoryError::Missing { missing });
            }
        }
        Ok(found)
    }
}

/// Requested ids that did not resolve, in request order.
fn missing_ids(requested: &[DbId], found: &[AccountSummary]) -> Vec<DbId> {
    requested
        .iter()
        .copied()
        .filter(|id| !found.iter().any(|a| a.id == *id))
        .collect()
}
