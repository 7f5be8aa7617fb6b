//! Repository for the `boards` table.

use boardwalk_core::board::{BoardPatch, NewBoard};
use boardwalk_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::board::BoardRow;

const COLUMNS: &str = "id, owner_id, title, slug, description, position, public, labels, \
    label_seq, members, options, archived, archived_at, deleted_at, version, created_at, updated_at";

/// Provides versioned reads and writes for boards.
pub struct BoardRepo;

impl BoardRepo {
    /// Insert a new board at version 1, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewBoard) -> Result<BoardRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO boards
                (owner_id, title, slug, description, position, public, labels, label_seq, members, options)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BoardRow>(&query)
            .bind(input.owner)
            .bind(&input.title)
            .bind(&input.slug)
            .bind(&input.description)
            .bind(input.position)
            .bind(input.public)
            .bind(Json(&input.labels))
            .bind(input.label_seq)
            .bind(&input.members)
            .bind(Json(&input.options))
            .fetch_one(pool)
            .await
    }

    /// Find a board by id, including archived and soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<BoardRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM boards WHERE id = $1");
        sqlx::query_as::<_, BoardRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Boards an account belongs to plus every public board.
    ///
    /// Pass `None` for anonymous viewers, which only narrows to public boards.
    pub async fn list_candidates(
        pool: &PgPool,
        account_id: Option<DbId>,
    ) -> Result<Vec<BoardRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM boards
             WHERE public OR ($1::BIGINT IS NOT NULL AND $1 = ANY(members))
             ORDER BY position, id"
        );
        sqlx::query_as::<_, BoardRow>(&query)
            .bind(account_id)
            .fetch_all(pool)
            .await
    }

    /// Apply `patch` if the stored version still equals `expected_version`.
    ///
    /// Only `Some` fields are written; nullable columns use a presence flag so
    /// they can be cleared. Bumps `version`. Returns `None` when the row is
    /// missing or the version moved.
    pub async fn update_versioned(
        pool: &PgPool,
        id: DbId,
        expected_version: i64,
        patch: &BoardPatch,
    ) -> Result<Option<BoardRow>, sqlx::Error> {
        let query = format!(
            "UPDATE boards SET
                title = COALESCE($3, title),
                slug = COALESCE($4, slug),
                description = CASE WHEN $5 THEN $6 ELSE description END,
                position = COALESCE($7, position),
                public = COALESCE($8, public),
                labels = COALESCE($9, labels),
                label_seq = COALESCE($10, label_seq),
                owner_id = COALESCE($11, owner_id),
                members = COALESCE($12, members),
                options = COALESCE($13, options),
                archived = COALESCE($14, archived),
                archived_at = CASE WHEN $15 THEN $16 ELSE archived_at END,
                deleted_at = CASE WHEN $17 THEN $18 ELSE deleted_at END,
                version = version + 1,
                updated_at = NOW()
             WHERE id = $1 AND version = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BoardRow>(&query)
            .bind(id)
            .bind(expected_version)
            .bind(&patch.title)
            .bind(&patch.slug)
            .bind(patch.description.is_some())
            .bind(patch.description.clone().flatten())
            .bind(patch.position)
            .bind(patch.public)
            .bind(patch.labels.as_ref().map(Json))
            .bind(patch.label_seq)
            .bind(patch.owner)
            .bind(&patch.members)
            .bind(patch.options.as_ref().map(Json))
            .bind(patch.archived)
            .bind(patch.archived_at.is_some())
            .bind(patch.archived_at.flatten())
            .bind(patch.deleted_at.is_some())
            .bind(patch.deleted_at.flatten())
            .fetch_optional(pool)
            .await
    }

    /// Current version of a board, or `None` if it does not exist.
    pub async fn current_version(pool: &PgPool, id: DbId) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT version FROM boards WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
