use serde_json::json;

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// A board membership, ownership, or archival rule was violated.
    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Rule violations raised by the board invariant engine.
///
/// Every variant is a caller/input error: it is detected before any write
/// and is never retried. The `Display` output is the human-readable reason
/// returned to the client; [`BoardError::code`] is the stable machine code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("One member is not a valid user.")]
    MemberNotValid {
        board: Option<DbId>,
        members: Vec<DbId>,
    },

    #[error("The board owner can't be removed from the members.")]
    OwnerCantBeRemoved {
        board: DbId,
        owner: DbId,
        members: Vec<DbId>,
    },

    #[error("Board is already archived")]
    AlreadyArchived { board: DbId },

    #[error("Board is not archived")]
    NotArchived { board: DbId },

    #[error("The owner '{owner}' is not an active user.")]
    OwnerNotActive { board: Option<DbId>, owner: DbId },
}

impl BoardError {
    /// Stable error code exposed to API clients.
    pub fn code(&self) -> &'static str {
        match self {
            BoardError::MemberNotValid { .. } => "MEMBER_NOT_VALID",
            BoardError::OwnerCantBeRemoved { .. } => "OWNER_CANT_BE_REMOVED",
            BoardError::AlreadyArchived { .. } => "BOARD_ALREADY_ARCHIVED",
            BoardError::NotArchived { .. } => "BOARD_NOT_ARCHIVED",
            BoardError::OwnerNotActive { .. } => "OWNER_NOT_ACTIVE",
        }
    }

    /// The board the violation refers to, if it already exists.
    pub fn board_id(&self) -> Option<DbId> {
        match self {
            BoardError::MemberNotValid { board, .. } | BoardError::OwnerNotActive { board, .. } => {
                *board
            }
            BoardError::OwnerCantBeRemoved { board, .. }
            | BoardError::AlreadyArchived { board }
            | BoardError::NotArchived { board } => Some(*board),
        }
    }

    /// Structured context (board id, owner, offending members) for the
    /// error response body.
    pub fn details(&self) -> serde_json::Value {
        match self {
            BoardError::MemberNotValid { board, members } => {
                json!({ "board": board, "members": members })
            }
            BoardError::OwnerCantBeRemoved {
                board,
                owner,
                members,
            } => json!({ "board": board, "owner": owner, "members": members }),
            BoardError::AlreadyArchived { board } | BoardError::NotArchived { board } => {
                json!({ "board": board })
            }
            BoardError::OwnerNotActive { board, owner } => {
                json!({ "board": board, "owner": owner })
            }
        }
    }
}
