//! In-memory collaborators.
//!
//! Used by tests across the workspace and by the API when started with
//! `BOARD_STORE=memory`. Both types are cheap to share behind an `Arc`.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::account::{AccountDirectory, AccountStatus, AccountSummary, DirectoryError};
use crate::board::scope::Viewer;
use crate::board::{Board, BoardPatch, NewBoard};
use crate::store::{BoardStore, StoreError};
use crate::types::DbId;

/// Board store backed by a map guarded by a single lock, which makes every
/// write a read-modify-write under exclusion.
#[derive(Default)]
pub struct InMemoryBoardStore {
    boards: RwLock<BTreeMap<DbId, Board>>,
    next_id: AtomicI64,
}

impl InMemoryBoardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored boards, including deleted ones.
    pub async fn len(&self) -> usize {
        self.boards.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.boards.read().await.is_empty()
    }
}

#[async_trait]
impl BoardStore for InMemoryBoardStore {
    async fn insert_board(&self, board: NewBoard) -> Result<Board, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = chrono::Utc::now();
        let board = Board {
            id,
            owner: board.owner,
            title: board.title,
            slug: board.slug,
            description: board.description,
            position: board.position,
            public: board.public,
            labels: board.labels,
            label_seq: board.label_seq,
            members: board.members,
            options: board.options,
            archived: false,
            archived_at: None,
            deleted_at: None,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        self.boards.write().await.insert(id, board.clone());
        Ok(board)
    }

    async fn read_board(&self, id: DbId) -> Result<Option<Board>, StoreError> {
        Ok(self.boards.read().await.get(&id).cloned())
    }

    async fn write_board(
        &self,
        id: DbId,
        expected_version: i64,
        patch: &BoardPatch,
    ) -> Result<Board, StoreError> {
        let mut boards = self.boards.write().await;
        let board = boards.get_mut(&id).ok_or(StoreError::NotFound { id })?;
        if board.version != expected_version {
            return Err(StoreError::Conflict {
                id,
                expected: expected_version,
            });
        }
        board.apply(patch);
        board.version += 1;
        board.updated_at = chrono::Utc::now();
        Ok(board.clone())
    }

    async fn list_candidates(&self, _viewer: &Viewer) -> Result<Vec<Board>, StoreError> {
        let mut boards: Vec<Board> = self.boards.read().await.values().cloned().collect();
        boards.sort_by_key(|b| (b.position, b.id));
        Ok(boards)
    }
}

/// Account directory backed by a map.
#[derive(Default)]
pub struct InMemoryAccountDirectory {
    accounts: RwLock<HashMap<DbId, AccountSummary>>,
}

impl InMemoryAccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory pre-populated with active accounts `user<id>`.
    pub async fn with_active(ids: &[DbId]) -> Self {
        let directory = Self::new();
        for &id in ids {
            directory.insert(active_account(id)).await;
        }
        directory
    }

    pub async fn insert(&self, account: AccountSummary) {
        self.accounts.write().await.insert(account.id, account);
    }

    pub async fn set_status(&self, id: DbId, status: AccountStatus) -> bool {
        match self.accounts.write().await.get_mut(&id) {
            Some(account) => {
                account.status = status;
                true
            }
            None => false,
        }
    }
}

/// An active account summary named `user<id>`.
pub fn active_account(id: DbId) -> AccountSummary {
    AccountSummary {
        id,
        username: format!("user{id}"),
        full_name: None,
        avatar: None,
        status: AccountStatus::Active,
    }
}

#[async_trait]
impl AccountDirectory for InMemoryAccountDirectory {
    async fn resolve_accounts(
        &self,
        ids: &[DbId],
        fail_if_any_missing: bool,
    ) -> Result<Vec<AccountSummary>, DirectoryError> {
        let accounts = self.accounts.read().await;
        let mut found = Vec::with_capacity(ids.len());
        let mut missing = Vec::new();
        for id in ids {
            match accounts.get(id) {
                Some(account) => found.push(account.clone()),
                None => missing.push(*id),
            }
        }
        if fail_if_any_missing && !missing.is_empty() {
            return Err(DirectoryError::Missing { missing });
        }
        Ok(found)
    }
}
