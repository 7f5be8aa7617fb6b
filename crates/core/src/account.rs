//! Account summaries and the account-resolution collaborator.
//!
//! Accounts are owned by an external service. The board engine only needs
//! to know whether an id resolves and whether the account is active.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Lifecycle status of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Active,
    Inactive,
}

impl AccountStatus {
    /// Map the `is_active` column used by the accounts table.
    pub fn from_active_flag(is_active: bool) -> Self {
        if is_active {
            AccountStatus::Active
        } else {
            AccountStatus::Inactive
        }
    }
}

/// Public view of an account, as populated into board responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub id: DbId,
    pub username: String,
    pub full_name: Option<String>,
    pub avatar: Option<String>,
    pub status: AccountStatus,
}

impl AccountSummary {
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// Raised only when resolving with `fail_if_any_missing = true`.
    #[error("Accounts not found: {missing:?}")]
    Missing { missing: Vec<DbId> },

    #[error("Account directory unavailable: {0}")]
    Backend(String),
}

/// Resolves account ids to summaries.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Resolve `ids` to account summaries, in no particular order.
    ///
    /// With `fail_if_any_missing`, an id that does not exist fails the whole
    /// call with [`DirectoryError::Missing`]; otherwise missing ids are
    /// skipped and the caller compares lengths.
    async fn resolve_accounts(
        &self,
        ids: &[DbId],
        fail_if_any_missing: bool,
    ) -> Result<Vec<AccountSummary>, DirectoryError>;
}
