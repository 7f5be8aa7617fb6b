//! Repository for the `accounts` table.

use boardwalk_core::types::DbId;
use sqlx::PgPool;

use crate::models::account::AccountRow;

const COLUMNS: &str = "id, username, full_name, avatar, is_active, created_at, updated_at";

/// Read-only lookups over the local account projection. Rows are written
/// by the accounts service.
pub struct AccountRepo;

impl AccountRepo {
    /// Find all accounts whose id is in `ids`. Unknown ids are skipped.
    pub async fn find_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<AccountRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE id = ANY($1) ORDER BY id");
        sqlx::query_as::<_, AccountRow>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }
}
