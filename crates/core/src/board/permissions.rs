//! Per-action access requirements for boards.

use super::scope::Viewer;
use super::Board;
use crate::error::CoreError;
use crate::roles::{ROLE_AUTHENTICATED, ROLE_BOARD_MEMBER, ROLE_BOARD_OWNER};

/// The minimum standing a viewer needs to run an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardPermission {
    /// No requirement; visibility is left to the scope chain.
    Public,
    Authenticated,
    Member,
    Owner,
}

impl BoardPermission {
    pub fn role_name(&self) -> Option<&'static str> {
        match self {
            BoardPermission::Public => None,
            BoardPermission::Authenticated => Some(ROLE_AUTHENTICATED),
            BoardPermission::Member => Some(ROLE_BOARD_MEMBER),
            BoardPermission::Owner => Some(ROLE_BOARD_OWNER),
        }
    }
}

/// Check `viewer` against `permission` for `board`.
///
/// Anonymous viewers fail any non-public permission with `Unauthorized`;
/// signed-in viewers lacking the board role fail with `Forbidden`.
pub fn check_permission(
    permission: BoardPermission,
    viewer: &Viewer,
    board: Option<&Board>,
) -> Result<(), CoreError> {
    if permission == BoardPermission::Public {
        return Ok(());
    }
    let account_id = viewer
        .account_id()
        .ok_or_else(|| CoreError::Unauthorized("Authentication required".into()))?;

    let allowed = match (permission, board) {
        (BoardPermission::Authenticated, _) => true,
        (BoardPermission::Member, Some(board)) => board.is_member(account_id),
        (BoardPermission::Owner, Some(board)) => board.is_owner(account_id),
        (_, None) => false,
        (BoardPermission::Public, _) => true,
    };

    if allowed {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "Requires role {}",
            permission.role_name().unwrap_or_default()
        )))
    }
}
