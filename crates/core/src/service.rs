//! Board orchestration entry point.
//!
//! [`BoardService`] composes the collaborators (a [`BoardStore`] and an
//! [`AccountDirectory`]) with the pure rule modules. Every mutation follows
//! the same shape:
//!
//! 1. read the board through the action's scope chain,
//! 2. check the action's permission,
//! 3. compute the patch from the freshly read state,
//! 4. resolve any newly introduced accounts,
//! 5. write the patch against the version that was read.
//!
//! Nothing is written until every check has passed. If the write loses a
//! version race, the whole sequence runs again against the new state, so a
//! membership delta is never applied to a stale member list.

use std::sync::Arc;

use crate::account::{AccountDirectory, AccountSummary, DirectoryError};
use crate::board::membership::{self, check_owner_active, validate_members_field};
use crate::board::permissions::{check_permission, BoardPermission};
use crate::board::scope::{Scope, ScopeChain, Viewer};
use crate::board::{
    archive, stages, Board, BoardAccounts, BoardFilter, BoardPatch, BoardView, CreateBoard,
    UpdateBoard,
};
use crate::error::{BoardError, CoreError};
use crate::store::{BoardStore, StoreError};
use crate::types::DbId;

/// How many times a mutation is recomputed after losing a version race.
pub const MAX_WRITE_ATTEMPTS: usize = 3;

/// A computed mutation, not yet validated against the account directory.
#[derive(Debug, Default)]
struct Plan {
    patch: BoardPatch,
    /// Account that must resolve as an active owner.
    new_owner: Option<DbId>,
    /// Accounts entering `members` with this write.
    introduced: Vec<DbId>,
}

impl Plan {
    fn patch(patch: BoardPatch) -> Self {
        Self {
            patch,
            ..Default::default()
        }
    }
}

#[derive(Clone)]
pub struct BoardService {
    store: Arc<dyn BoardStore>,
    accounts: Arc<dyn AccountDirectory>,
}

impl BoardService {
    pub fn new(store: Arc<dyn BoardStore>, accounts: Arc<dyn AccountDirectory>) -> Self {
        Self { store, accounts }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Boards the viewer can see on the default read path.
    pub async fn list_visible_boards(&self, viewer: &Viewer) -> Result<Vec<Board>, CoreError> {
        self.list_scoped(viewer, &ScopeChain::default_read()).await
    }

    /// Public boards, regardless of membership.
    pub async fn list_public_boards(&self, viewer: &Viewer) -> Result<Vec<Board>, CoreError> {
        self.list_scoped(viewer, &ScopeChain::public_listing()).await
    }

    /// Visible boards matching `filter`.
    pub async fn find_boards(
        &self,
        viewer: &Viewer,
        filter: &BoardFilter,
    ) -> Result<Vec<Board>, CoreError> {
        let boards = self.list_visible_boards(viewer).await?;
        Ok(boards.into_iter().filter(|b| filter.matches(b)).collect())
    }

    pub async fn count_visible_boards(&self, viewer: &Viewer) -> Result<usize, CoreError> {
        Ok(self.list_visible_boards(viewer).await?.len())
    }

    /// A single board, if visible to the viewer.
    pub async fn get_board(&self, viewer: &Viewer, id: DbId) -> Result<Board, CoreError> {
        let board = self.load(id, viewer, &ScopeChain::default_read()).await?;
        check_permission(BoardPermission::Public, viewer, Some(&board))?;
        Ok(board)
    }

    /// Attach owner and member account summaries to already-visible boards.
    ///
    /// All ids are resolved in one directory call. Inactive accounts are
    /// included; ids that no longer resolve are skipped.
    pub async fn populate(&self, boards: Vec<Board>) -> Result<Vec<BoardView>, CoreError> {
        let ids: Vec<DbId> = boards
            .iter()
            .flat_map(|b| std::iter::once(b.owner).chain(b.members.iter().copied()))
            .collect();
        let ids = membership::dedup_members(&ids);
        let found = if ids.is_empty() {
            Vec::new()
        } else {
            self.accounts
                .resolve_accounts(&ids, false)
                .await
                .map_err(|e| CoreError::Internal(e.to_string()))?
        };

        let lookup = |id: DbId| found.iter().find(|a| a.id == id).cloned();
        Ok(boards
            .into_iter()
            .map(|board| {
                let accounts = BoardAccounts {
                    owner: lookup(board.owner),
                    members: board.members.iter().filter_map(|&id| lookup(id)).collect(),
                };
                BoardView {
                    board,
                    accounts: Some(accounts),
                }
            })
            .collect())
    }

    async fn list_scoped(&self, viewer: &Viewer, scopes: &ScopeChain) -> Result<Vec<Board>, CoreError> {
        let candidates = self.store.list_candidates(viewer).await?;
        Ok(scopes.filter(candidates, viewer))
    }

    async fn load(&self, id: DbId, viewer: &Viewer, scopes: &ScopeChain) -> Result<Board, CoreError> {
        self.store
            .read_board(id)
            .await?
            .filter(|board| scopes.admits(board, viewer))
            .ok_or(CoreError::NotFound { entity: "Board", id })
    }

    // -----------------------------------------------------------------------
    // Create / update / remove
    // -----------------------------------------------------------------------

    /// Create a board owned by the viewer. `input.members` are added next to
    /// the creator and must all be active accounts.
    pub async fn create_board(&self, viewer: &Viewer, input: CreateBoard) -> Result<Board, CoreError> {
        check_permission(BoardPermission::Authenticated, viewer, None)?;
        let new_board = stages::prepare_create(input, viewer)?;

        self.validate_owner(None, new_board.owner).await?;
        let others: Vec<DbId> = new_board
            .members
            .iter()
            .copied()
            .filter(|id| *id != new_board.owner)
            .collect();
        let resolved = self.resolve(None, &others).await?;
        validate_members_field(None, &new_board.members, &others, &resolved, None)?;

        Ok(self.store.insert_board(new_board).await?)
    }

    /// Update title, description, position, visibility, labels, or options.
    pub async fn update_board(
        &self,
        viewer: &Viewer,
        id: DbId,
        input: UpdateBoard,
    ) -> Result<Board, CoreError> {
        self.mutate(id, viewer, ScopeChain::default_read(), BoardPermission::Member, |board| {
            Ok(Plan::patch(stages::prepare_update(board, input.clone(), viewer)?))
        })
        .await
    }

    /// Soft-delete a board. The row stays in the store with `deleted_at` set.
    pub async fn remove_board(&self, viewer: &Viewer, id: DbId) -> Result<Board, CoreError> {
        self.mutate(id, viewer, ScopeChain::default_read(), BoardPermission::Owner, |_| {
            Ok(Plan::patch(BoardPatch {
                deleted_at: Some(Some(chrono::Utc::now())),
                ..Default::default()
            }))
        })
        .await
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    pub async fn add_members(
        &self,
        viewer: &Viewer,
        id: DbId,
        to_add: &[DbId],
    ) -> Result<Board, CoreError> {
        self.mutate(id, viewer, ScopeChain::default_read(), BoardPermission::Owner, |board| {
            let members = membership::add_members(&board.members, to_add);
            Ok(Plan {
                introduced: introduced(&board.members, &members),
                patch: BoardPatch {
                    members: Some(members),
                    ..Default::default()
                },
                new_owner: None,
            })
        })
        .await
    }

    pub async fn remove_members(
        &self,
        viewer: &Viewer,
        id: DbId,
        to_remove: &[DbId],
    ) -> Result<Board, CoreError> {
        self.mutate(id, viewer, ScopeChain::default_read(), BoardPermission::Owner, |board| {
            let members = membership::remove_members(board.id, &board.members, board.owner, to_remove)?;
            Ok(Plan::patch(BoardPatch {
                members: Some(members),
                ..Default::default()
            }))
        })
        .await
    }

    /// Hand the board to `new_owner`, who becomes a member in the same write.
    pub async fn transfer_ownership(
        &self,
        viewer: &Viewer,
        id: DbId,
        new_owner: DbId,
    ) -> Result<Board, CoreError> {
        self.mutate(id, viewer, ScopeChain::default_read(), BoardPermission::Owner, |board| {
            let change = membership::transfer_ownership(&board.members, new_owner);
            let introduced = introduced(&board.members, &change.members)
                .into_iter()
                .filter(|id| *id != new_owner)
                .collect();
            Ok(Plan {
                patch: BoardPatch {
                    owner: Some(change.owner),
                    members: Some(change.members),
                    ..Default::default()
                },
                new_owner: Some(new_owner),
                introduced,
            })
        })
        .await
    }

    // -----------------------------------------------------------------------
    // Archival
    // -----------------------------------------------------------------------

    pub async fn archive(&self, viewer: &Viewer, id: DbId) -> Result<Board, CoreError> {
        let scopes = ScopeChain::default_read().without(Scope::NotArchived);
        self.mutate(id, viewer, scopes, BoardPermission::Owner, |board| {
            Ok(Plan::patch(archive::archive(board, chrono::Utc::now())?))
        })
        .await
    }

    pub async fn unarchive(&self, viewer: &Viewer, id: DbId) -> Result<Board, CoreError> {
        let scopes = ScopeChain::default_read().without(Scope::NotArchived);
        self.mutate(id, viewer, scopes, BoardPermission::Owner, |board| {
            Ok(Plan::patch(archive::unarchive(board)?))
        })
        .await
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    async fn mutate<F>(
        &self,
        id: DbId,
        viewer: &Viewer,
        scopes: ScopeChain,
        permission: BoardPermission,
        plan: F,
    ) -> Result<Board, CoreError>
    where
        F: Fn(&Board) -> Result<Plan, CoreError>,
    {
        for _ in 0..MAX_WRITE_ATTEMPTS {
            let board = self.load(id, viewer, &scopes).await?;
            check_permission(permission, viewer, Some(&board))?;

            let planned = plan(&board)?;
            if let Some(owner) = planned.new_owner {
                self.validate_owner(Some(id), owner).await?;
            }
            if let Some(members) = planned.patch.members.as_deref() {
                let resolved = self.resolve(Some(id), &planned.introduced).await?;
                let owner = planned.patch.owner.unwrap_or(board.owner);
                validate_members_field(
                    Some(id),
                    members,
                    &planned.introduced,
                    &resolved,
                    Some(owner),
                )?;
            }

            match self.store.write_board(id, board.version, &planned.patch).await {
                Ok(updated) => return Ok(updated),
                Err(StoreError::Conflict { .. }) => continue,
                Err(err) => return Err(err.into()),
            }
        }
        Err(CoreError::Conflict(format!(
            "Board {id} is being modified concurrently, try again"
        )))
    }

    async fn resolve(
        &self,
        board_id: Option<DbId>,
        ids: &[DbId],
    ) -> Result<Vec<AccountSummary>, CoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        match self.accounts.resolve_accounts(ids, true).await {
            Ok(accounts) => Ok(accounts),
            Err(DirectoryError::Missing { missing }) => Err(BoardError::MemberNotValid {
                board: board_id,
                members: missing,
            }
            .into()),
            Err(DirectoryError::Backend(msg)) => Err(CoreError::Internal(msg)),
        }
    }

    async fn validate_owner(&self, board_id: Option<DbId>, owner: DbId) -> Result<(), CoreError> {
        let resolved = match self.resolve(board_id, &[owner]).await {
            Err(CoreError::Board(BoardError::MemberNotValid { .. })) => Vec::new(),
            other => other?,
        };
        check_owner_active(board_id, owner, resolved.iter().find(|a| a.id == owner))?;
        Ok(())
    }
}

/// Ids present in `after` but not in `before`.
fn introduced(before: &[DbId], after: &[DbId]) -> Vec<DbId> {
    after
        .iter()
        .copied()
        .filter(|id| !before.contains(id))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assert_matches::assert_matches;
    use async_trait::async_trait;

    use super::*;
    use crate::account::AccountStatus;
    use crate::board::NewBoard;
    use crate::memory::{InMemoryAccountDirectory, InMemoryBoardStore};

    struct Harness {
        service: BoardService,
        store: Arc<InMemoryBoardStore>,
        accounts: Arc<InMemoryAccountDirectory>,
    }

    async fn harness() -> Harness {
        let store = Arc::new(InMemoryBoardStore::new());
        let accounts = Arc::new(InMemoryAccountDirectory::with_active(&[1, 2, 3, 4]).await);
        let service = BoardService::new(store.clone(), accounts.clone());
        Harness {
            service,
            store,
            accounts,
        }
    }

    fn create(title: &str, members: Vec<DbId>) -> CreateBoard {
        CreateBoard {
            title: title.to_string(),
            description: None,
            position: None,
            public: None,
            labels: None,
            members,
            options: None,
        }
    }

    const OWNER: Viewer = Viewer::Account(1);

    #[tokio::test]
    async fn create_seeds_owner_and_members() {
        let h = harness().await;
        let board = h.service.create_board(&OWNER, create("Roadmap", vec![2])).await.unwrap();
        assert_eq!(board.owner, 1);
        assert_eq!(board.members, vec![1, 2]);
        assert_eq!(board.labels.len(), 6);
        assert_eq!(board.slug, "roadmap");
    }

    #[tokio::test]
    async fn create_with_unknown_member_writes_nothing() {
        let h = harness().await;
        let err = h
            .service
            .create_board(&OWNER, create("Roadmap", vec![2, 99]))
            .await
            .unwrap_err();
        assert_matches!(
            err,
            CoreError::Board(BoardError::MemberNotValid { board: None, ref members }) if members == &vec![99]
        );
        assert!(h.store.is_empty().await);
    }

    #[tokio::test]
    async fn create_by_inactive_account_fails() {
        let h = harness().await;
        h.accounts.set_status(1, AccountStatus::Inactive).await;
        assert_matches!(
            h.service.create_board(&OWNER, create("Roadmap", vec![])).await,
            Err(CoreError::Board(BoardError::OwnerNotActive { owner: 1, .. }))
        );
    }

    #[tokio::test]
    async fn anonymous_cannot_create() {
        let h = harness().await;
        assert_matches!(
            h.service.create_board(&Viewer::Anonymous, create("x", vec![])).await,
            Err(CoreError::Unauthorized(_))
        );
    }

    #[tokio::test]
    async fn removing_owner_fails_and_keeps_members() {
        let h = harness().await;
        let board = h.service.create_board(&OWNER, create("B1", vec![2])).await.unwrap();

        let err = h.service.remove_members(&OWNER, board.id, &[1]).await.unwrap_err();
        assert_matches!(err, CoreError::Board(BoardError::OwnerCantBeRemoved { owner: 1, .. }));

        let stored = h.store.read_board(board.id).await.unwrap().unwrap();
        assert_eq!(stored.members, vec![1, 2]);
        assert_eq!(stored.version, board.version);
    }

    #[tokio::test]
    async fn remove_members_keeps_owner() {
        let h = harness().await;
        let board = h.service.create_board(&OWNER, create("B1", vec![2, 3])).await.unwrap();
        let updated = h.service.remove_members(&OWNER, board.id, &[2, 3]).await.unwrap();
        assert_eq!(updated.members, vec![1]);
        assert!(updated.members.contains(&updated.owner));
    }

    #[tokio::test]
    async fn add_unresolvable_member_leaves_board_unchanged() {
        let h = harness().await;
        let board = h.service.create_board(&OWNER, create("B1", vec![2])).await.unwrap();

        let err = h.service.add_members(&OWNER, board.id, &[3, 77]).await.unwrap_err();
        assert_matches!(
            err,
            CoreError::Board(BoardError::MemberNotValid { board: Some(id), ref members })
                if id == board.id && members == &vec![77]
        );
        let stored = h.store.read_board(board.id).await.unwrap().unwrap();
        assert_eq!(stored.members, vec![1, 2]);
    }

    #[tokio::test]
    async fn add_inactive_member_fails() {
        let h = harness().await;
        let board = h.service.create_board(&OWNER, create("B1", vec![])).await.unwrap();
        h.accounts.set_status(3, AccountStatus::Inactive).await;
        assert_matches!(
            h.service.add_members(&OWNER, board.id, &[3]).await,
            Err(CoreError::Board(BoardError::MemberNotValid { .. }))
        );
    }

    #[tokio::test]
    async fn add_members_twice_is_idempotent() {
        let h = harness().await;
        let board = h.service.create_board(&OWNER, create("B1", vec![])).await.unwrap();
        let once = h.service.add_members(&OWNER, board.id, &[3, 4]).await.unwrap();
        let twice = h.service.add_members(&OWNER, board.id, &[3, 4]).await.unwrap();
        assert_eq!(once.members, twice.members);
        assert_eq!(twice.members, vec![1, 3, 4]);
    }

    #[tokio::test]
    async fn only_owner_manages_members() {
        let h = harness().await;
        let board = h.service.create_board(&OWNER, create("B1", vec![2])).await.unwrap();
        assert_matches!(
            h.service.add_members(&Viewer::Account(2), board.id, &[3]).await,
            Err(CoreError::Forbidden(_))
        );
        // Non-members cannot even see the board.
        assert_matches!(
            h.service.add_members(&Viewer::Account(3), board.id, &[4]).await,
            Err(CoreError::NotFound { entity: "Board", .. })
        );
    }

    #[tokio::test]
    async fn transfer_ownership_adds_new_owner() {
        let h = harness().await;
        let board = h.service.create_board(&OWNER, create("B1", vec![2])).await.unwrap();
        let updated = h.service.transfer_ownership(&OWNER, board.id, 3).await.unwrap();
        assert_eq!(updated.owner, 3);
        assert_eq!(updated.members, vec![1, 2, 3]);

        // The previous owner is now a plain member.
        assert_matches!(
            h.service.archive(&OWNER, board.id).await,
            Err(CoreError::Forbidden(_))
        );
    }

    #[tokio::test]
    async fn transfer_to_unknown_or_inactive_account_fails() {
        let h = harness().await;
        let board = h.service.create_board(&OWNER, create("B1", vec![])).await.unwrap();
        assert_matches!(
            h.service.transfer_ownership(&OWNER, board.id, 50).await,
            Err(CoreError::Board(BoardError::MemberNotValid { .. }))
        );
        h.accounts.set_status(4, AccountStatus::Inactive).await;
        assert_matches!(
            h.service.transfer_ownership(&OWNER, board.id, 4).await,
            Err(CoreError::Board(BoardError::OwnerNotActive { owner: 4, .. }))
        );
        let stored = h.store.read_board(board.id).await.unwrap().unwrap();
        assert_eq!(stored.owner, 1);
    }

    #[tokio::test]
    async fn archive_lifecycle() {
        let h = harness().await;
        let board = h.service.create_board(&OWNER, create("B1", vec![])).await.unwrap();

        let archived = h.service.archive(&OWNER, board.id).await.unwrap();
        assert!(archived.archived);
        assert!(archived.archived_at.is_some());

        assert_matches!(
            h.service.archive(&OWNER, board.id).await,
            Err(CoreError::Board(BoardError::AlreadyArchived { .. }))
        );
        // Archived boards drop out of the default read path.
        assert!(h.service.list_visible_boards(&OWNER).await.unwrap().is_empty());

        let restored = h.service.unarchive(&OWNER, board.id).await.unwrap();
        assert!(!restored.archived);
        assert!(restored.archived_at.is_none());
        assert_eq!(restored.members, board.members);
        assert_eq!(restored.labels, board.labels);
        assert_eq!(restored.title, board.title);

        assert_matches!(
            h.service.unarchive(&OWNER, board.id).await,
            Err(CoreError::Board(BoardError::NotArchived { .. }))
        );
    }

    #[tokio::test]
    async fn anonymous_sees_only_public_boards() {
        let h = harness().await;
        h.service.create_board(&OWNER, create("Private", vec![])).await.unwrap();
        let mut public = create("Public", vec![]);
        public.public = Some(true);
        let public = h.service.create_board(&Viewer::Account(2), public).await.unwrap();

        let visible = h.service.list_visible_boards(&Viewer::Anonymous).await.unwrap();
        let ids: Vec<DbId> = visible.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![public.id]);
    }

    #[tokio::test]
    async fn public_listing_ignores_membership() {
        let h = harness().await;
        let mut public = create("Public", vec![]);
        public.public = Some(true);
        h.service.create_board(&Viewer::Account(2), public).await.unwrap();

        assert!(h.service.list_visible_boards(&OWNER).await.unwrap().is_empty());
        assert_eq!(h.service.list_public_boards(&OWNER).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn removed_board_is_hidden() {
        let h = harness().await;
        let board = h.service.create_board(&OWNER, create("B1", vec![])).await.unwrap();
        h.service.remove_board(&OWNER, board.id).await.unwrap();
        assert_eq!(h.service.count_visible_boards(&OWNER).await.unwrap(), 0);
        assert_matches!(
            h.service.get_board(&OWNER, board.id).await,
            Err(CoreError::NotFound { .. })
        );
        // Soft delete only: the row is still there.
        assert!(h.store.read_board(board.id).await.unwrap().unwrap().is_deleted());
    }

    #[tokio::test]
    async fn members_update_but_only_owner_removes() {
        let h = harness().await;
        let board = h.service.create_board(&OWNER, create("B1", vec![2])).await.unwrap();
        let member = Viewer::Account(2);
        let updated = h
            .service
            .update_board(
                &member,
                board.id,
                UpdateBoard {
                    title: Some("Renamed".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.slug, "renamed");
        assert_matches!(
            h.service.remove_board(&member, board.id).await,
            Err(CoreError::Forbidden(_))
        );
    }

    #[tokio::test]
    async fn find_filters_by_title() {
        let h = harness().await;
        h.service.create_board(&OWNER, create("Sprint 1", vec![])).await.unwrap();
        h.service.create_board(&OWNER, create("Backlog", vec![])).await.unwrap();
        let found = h
            .service
            .find_boards(
                &OWNER,
                &BoardFilter {
                    title: Some("sprint".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Sprint 1");
    }

    #[tokio::test]
    async fn populate_attaches_owner_and_member_accounts() {
        let h = harness().await;
        let board = h.service.create_board(&OWNER, create("B1", vec![2, 3])).await.unwrap();
        h.accounts.set_status(3, AccountStatus::Inactive).await;

        let views = h.service.populate(vec![board.clone()]).await.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].board, board);
        let accounts = views[0].accounts.as_ref().unwrap();
        assert_eq!(accounts.owner.as_ref().map(|a| a.username.as_str()), Some("user1"));
        let ids: Vec<DbId> = accounts.members.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(!accounts.members[2].is_active());
    }

    #[tokio::test]
    async fn populate_skips_ids_that_no_longer_resolve() {
        let store = Arc::new(InMemoryBoardStore::new());
        let accounts = Arc::new(InMemoryAccountDirectory::with_active(&[1]).await);
        let service = BoardService::new(store, accounts);
        let mut board = crate::board::fixtures::board(1);
        board.members = vec![1, 8];

        let views = service.populate(vec![board]).await.unwrap();
        let populated = views[0].accounts.as_ref().unwrap();
        assert_eq!(populated.owner.as_ref().map(|a| a.id), Some(1));
        assert_eq!(populated.members.len(), 1);
        assert!(service.populate(Vec::new()).await.unwrap().is_empty());
    }

    /// Lets another writer add `rival` to the board right before each of
    /// the next `races` writes, so those writes lose the version check.
    struct RacingStore {
        inner: Arc<InMemoryBoardStore>,
        rival: DbId,
        races: AtomicUsize,
        writes: AtomicUsize,
    }

    impl RacingStore {
        fn new(inner: Arc<InMemoryBoardStore>, rival: DbId, races: usize) -> Self {
            Self {
                inner,
                rival,
                races: AtomicUsize::new(races),
                writes: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl BoardStore for RacingStore {
        async fn insert_board(&self, board: NewBoard) -> Result<Board, StoreError> {
            self.inner.insert_board(board).await
        }

        async fn read_board(&self, id: DbId) -> Result<Option<Board>, StoreError> {
            self.inner.read_board(id).await
        }

        async fn write_board(
            &self,
            id: DbId,
            expected_version: i64,
            patch: &BoardPatch,
        ) -> Result<Board, StoreError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            let race = self
                .races
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if race {
                let current = self.inner.read_board(id).await?.ok_or(StoreError::NotFound { id })?;
                let competing = BoardPatch {
                    members: Some(membership::add_members(&current.members, &[self.rival])),
                    ..Default::default()
                };
                self.inner.write_board(id, current.version, &competing).await?;
            }
            self.inner.write_board(id, expected_version, patch).await
        }

        async fn list_candidates(&self, viewer: &Viewer) -> Result<Vec<Board>, StoreError> {
            self.inner.list_candidates(viewer).await
        }
    }

    async fn racing_harness(races: usize) -> (BoardService, Arc<RacingStore>, Board) {
        let h = harness().await;
        let board = h.service.create_board(&OWNER, create("B1", vec![])).await.unwrap();
        let racing = Arc::new(RacingStore::new(h.store.clone(), 3, races));
        let service = BoardService::new(racing.clone(), h.accounts.clone());
        (service, racing, board)
    }

    #[tokio::test]
    async fn lost_race_recomputes_membership_delta() {
        let (service, racing, board) = racing_harness(1).await;

        let updated = service.add_members(&OWNER, board.id, &[2]).await.unwrap();

        // The retry started from the rival's member list, not the stale one.
        assert_eq!(updated.members, vec![1, 3, 2]);
        assert_eq!(updated.version, board.version + 2);
        assert_eq!(racing.writes.load(Ordering::SeqCst), 2);
        let stored = racing.inner.read_board(board.id).await.unwrap().unwrap();
        assert_eq!(stored.members, vec![1, 3, 2]);
    }

    #[tokio::test]
    async fn exhausted_retries_return_conflict_and_write_nothing() {
        let (service, racing, board) = racing_harness(MAX_WRITE_ATTEMPTS).await;

        assert_matches!(
            service.add_members(&OWNER, board.id, &[2]).await,
            Err(CoreError::Conflict(_))
        );

        assert_eq!(racing.writes.load(Ordering::SeqCst), MAX_WRITE_ATTEMPTS);
        let stored = racing.inner.read_board(board.id).await.unwrap().unwrap();
        assert_eq!(stored.members, vec![1, 3]);
        // Only the rival's writes landed.
        assert_eq!(stored.version, board.version + MAX_WRITE_ATTEMPTS as i64);
    }
}
