//! Board archival: a two-state machine driven only by explicit owner action.

use serde::Serialize;

use super::{Board, BoardPatch};
use crate::error::BoardError;
use crate::types::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveState {
    Active,
    Archived,
}

impl ArchiveState {
    pub fn of(board: &Board) -> Self {
        if board.archived {
            ArchiveState::Archived
        } else {
            ArchiveState::Active
        }
    }
}

/// `Active -> Archived`, stamping `archived_at` with `now`.
pub fn archive(board: &Board, now: Timestamp) -> Result<BoardPatch, BoardError> {
    match ArchiveState::of(board) {
        ArchiveState::Archived => Err(BoardError::AlreadyArchived { board: board.id }),
        ArchiveState::Active => Ok(BoardPatch {
            archived: Some(true),
            archived_at: Some(Some(now)),
            ..Default::default()
        }),
    }
}

/// `Archived -> Active`, clearing `archived_at`.
pub fn unarchive(board: &Board) -> Result<BoardPatch, BoardError> {
    match ArchiveState::of(board) {
        ArchiveState::Active => Err(BoardError::NotArchived { board: board.id }),
        ArchiveState::Archived => Ok(BoardPatch {
            archived: Some(false),
            archived_at: Some(None),
            ..Default::default()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::fixtures;

    #[test]
    fn archive_active_board() {
        let board = fixtures::board(4);
        let now = chrono::Utc::now();
        let patch = archive(&board, now).unwrap();
        assert_eq!(patch.archived, Some(true));
        assert_eq!(patch.archived_at, Some(Some(now)));
    }

    #[test]
    fn archive_twice_fails() {
        let mut board = fixtures::board(4);
        board.apply(&archive(&board, chrono::Utc::now()).unwrap());
        assert_eq!(
            archive(&board, chrono::Utc::now()),
            Err(BoardError::AlreadyArchived { board: 4 })
        );
    }

    #[test]
    fn unarchive_active_board_fails() {
        let board = fixtures::board(4);
        assert_eq!(unarchive(&board), Err(BoardError::NotArchived { board: 4 }));
    }

    #[test]
    fn archive_then_unarchive_restores_everything_else() {
        let original = fixtures::board(4);
        let mut board = original.clone();
        board.apply(&archive(&board, chrono::Utc::now()).unwrap());
        assert_eq!(ArchiveState::of(&board), ArchiveState::Archived);
        board.apply(&unarchive(&board).unwrap());

        assert!(!board.archived);
        assert!(board.archived_at.is_none());
        assert_eq!(board, original);
    }
}
