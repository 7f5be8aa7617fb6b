//! Account row model.

use boardwalk_core::account::{AccountStatus, AccountSummary};
use boardwalk_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `accounts` table.
#[derive(Debug, Clone, FromRow)]
pub struct AccountRow {
    pub id: DbId,
    pub username: String,
    pub full_name: Option<String>,
    pub avatar: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<AccountRow> for AccountSummary {
    fn from(row: AccountRow) -> Self {
        AccountSummary {
            id: row.id,
            username: row.username,
            full_name: row.full_name,
            avatar: row.avatar,
            status: AccountStatus::from_active_flag(row.is_active),
        }
    }
}
