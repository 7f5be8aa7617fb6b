//! Board row model.

use boardwalk_core::board::{Board, Label};
use boardwalk_core::types::{DbId, Timestamp};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `boards` table.
///
/// `labels` and `options` are JSONB; `members` is `BIGINT[]`.
#[derive(Debug, Clone, FromRow)]
pub struct BoardRow {
    pub id: DbId,
    pub owner_id: DbId,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub position: i32,
    pub public: bool,
    pub labels: Json<Vec<Label>>,
    pub label_seq: i64,
    pub members: Vec<DbId>,
    pub options: Json<serde_json::Value>,
    pub archived: bool,
    pub archived_at: Option<Timestamp>,
    pub deleted_at: Option<Timestamp>,
    pub version: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<BoardRow> for Board {
    fn from(row: BoardRow) -> Self {
        Board {
            id: row.id,
            owner: row.owner_id,
            title: row.title,
            slug: row.slug,
            description: row.description,
            position: row.position,
            public: row.public,
            labels: row.labels.0,
            label_seq: row.label_seq,
            members: row.members,
            options: row.options.0,
            archived: row.archived,
            archived_at: row.archived_at,
            deleted_at: row.deleted_at,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
