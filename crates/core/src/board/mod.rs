//! Board entity, DTOs, and the rule modules that guard it.
//!
//! - [`labels`] -- label id allocation.
//! - [`membership`] -- member-set transforms and ownership checks.
//! - [`archive`] -- the `Active`/`Archived` state machine.
//! - [`scope`] -- viewer visibility predicates.
//! - [`permissions`] -- per-action access requirements.
//! - [`stages`] -- ordered create/update pipeline stages.

pub mod archive;
pub mod labels;
pub mod membership;
pub mod permissions;
pub mod scope;
pub mod slug;
pub mod stages;

use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::account::AccountSummary;
use crate::types::{DbId, Timestamp};

/// Maximum board title length in characters.
pub const MAX_TITLE_LEN: u64 = 200;

/// A coloured tag attached to cards within a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Unique within the board. Non-positive values count as "unassigned".
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub color: String,
}

/// A label as supplied by a client; `id` is optional for new labels.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LabelInput {
    /// Anything other than a JSON integer reads as unassigned.
    #[serde(default, deserialize_with = "lenient_label_id")]
    pub id: Option<i64>,
    pub name: String,
    pub color: String,
}

fn lenient_label_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_i64()))
}

impl From<Label> for LabelInput {
    fn from(label: Label) -> Self {
        Self {
            id: Some(label.id),
            name: label.name,
            color: label.color,
        }
    }
}

/// A persisted board.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Board {
    pub id: DbId,
    pub owner: DbId,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub position: i32,
    pub public: bool,
    pub labels: Vec<Label>,
    /// Highest label id ever handed out on this board.
    #[serde(skip_serializing)]
    pub label_seq: i64,
    pub members: Vec<DbId>,
    pub options: serde_json::Value,
    pub archived: bool,
    pub archived_at: Option<Timestamp>,
    pub deleted_at: Option<Timestamp>,
    /// Optimistic concurrency counter, bumped by every write.
    pub version: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Board {
    pub fn is_member(&self, account_id: DbId) -> bool {
        self.members.contains(&account_id)
    }

    pub fn is_owner(&self, account_id: DbId) -> bool {
        self.owner == account_id
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Apply a patch in place. Used by stores that hold boards in memory.
    pub fn apply(&mut self, patch: &BoardPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(slug) = &patch.slug {
            self.slug = slug.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(public) = patch.public {
            self.public = public;
        }
        if let Some(labels) = &patch.labels {
            self.labels = labels.clone();
        }
        if let Some(label_seq) = patch.label_seq {
            self.label_seq = label_seq;
        }
        if let Some(owner) = patch.owner {
            self.owner = owner;
        }
        if let Some(members) = &patch.members {
            self.members = members.clone();
        }
        if let Some(options) = &patch.options {
            self.options = options.clone();
        }
        if let Some(archived) = patch.archived {
            self.archived = archived;
        }
        if let Some(archived_at) = patch.archived_at {
            self.archived_at = archived_at;
        }
        if let Some(deleted_at) = patch.deleted_at {
            self.deleted_at = deleted_at;
        }
    }
}

/// Accounts behind a board's `owner` and `members` ids.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardAccounts {
    pub owner: Option<AccountSummary>,
    /// In `members` order. Ids that no longer resolve are left out.
    pub members: Vec<AccountSummary>,
}

/// A board as returned by read endpoints, with accounts attached on request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardView {
    #[serde(flatten)]
    pub board: Board,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accounts: Option<BoardAccounts>,
}

impl From<Board> for BoardView {
    fn from(board: Board) -> Self {
        Self {
            board,
            accounts: None,
        }
    }
}

/// A fully prepared board ready to be inserted by a [`BoardStore`](crate::store::BoardStore).
#[derive(Debug, Clone, PartialEq)]
pub struct NewBoard {
    pub owner: DbId,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub position: i32,
    pub public: bool,
    pub labels: Vec<Label>,
    pub label_seq: i64,
    pub members: Vec<DbId>,
    pub options: serde_json::Value,
}

/// A partial write. `None` leaves a field untouched; for nullable columns
/// the inner `Option` is the new value.
///
/// A patch is always applied as a single persisted write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardPatch {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<Option<String>>,
    pub position: Option<i32>,
    pub public: Option<bool>,
    pub labels: Option<Vec<Label>>,
    pub label_seq: Option<i64>,
    pub owner: Option<DbId>,
    pub members: Option<Vec<DbId>>,
    pub options: Option<serde_json::Value>,
    pub archived: Option<bool>,
    pub archived_at: Option<Option<Timestamp>>,
    pub deleted_at: Option<Option<Timestamp>>,
}

/// DTO for creating a board. Owner and initial membership come from the
/// requesting principal.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBoard {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    pub position: Option<i32>,
    pub public: Option<bool>,
    /// Replaces the default label set when provided.
    pub labels: Option<Vec<LabelInput>>,
    /// Extra members besides the creator.
    #[serde(default)]
    pub members: Vec<DbId>,
    pub options: Option<serde_json::Value>,
}

/// DTO for updating a board. Owner and members are read-only here and
/// change only through the membership actions.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateBoard {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub position: Option<i32>,
    pub public: Option<bool>,
    pub labels: Option<Vec<LabelInput>>,
    pub options: Option<serde_json::Value>,
}

/// Free-text filter for the board finder.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoardFilter {
    /// Case-insensitive substring match on the title.
    pub title: Option<String>,
}

impl BoardFilter {
    pub fn matches(&self, board: &Board) -> bool {
        match &self.title {
            Some(needle) => board
                .title
                .to_lowercase()
                .contains(&needle.trim().to_lowercase()),
            None => true,
        }
    }
}
