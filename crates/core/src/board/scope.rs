//! Visibility predicates for board reads.
//!
//! A [`ScopeChain`] is a set of [`Scope`]s evaluated in a fixed order; a
//! board is visible only if every scope admits it. The default read path
//! uses membership, not-archived, and not-deleted. The public listing uses
//! the public scope alone.

use serde::{Deserialize, Serialize};

use super::Board;
use crate::types::DbId;

/// Who is looking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Viewer {
    Anonymous,
    Account(DbId),
}

impl Viewer {
    pub fn account_id(&self) -> Option<DbId> {
        match self {
            Viewer::Anonymous => None,
            Viewer::Account(id) => Some(*id),
        }
    }
}

impl From<Option<DbId>> for Viewer {
    fn from(id: Option<DbId>) -> Self {
        id.map_or(Viewer::Anonymous, Viewer::Account)
    }
}

/// A single visibility predicate. Declaration order is evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scope {
    /// Members see their boards; anonymous viewers see public boards.
    Membership,
    NotArchived,
    NotDeleted,
    /// Public boards, regardless of membership.
    Public,
}

impl Scope {
    pub fn admits(&self, board: &Board, viewer: &Viewer) -> bool {
        match self {
            Scope::Membership => match viewer {
                Viewer::Account(id) => board.is_member(*id),
                Viewer::Anonymous => board.public,
            },
            Scope::NotArchived => !board.archived,
            Scope::NotDeleted => !board.is_deleted(),
            Scope::Public => board.public,
        }
    }
}

/// Scopes applied to every read unless an action relaxes them.
pub const DEFAULT_SCOPES: &[Scope] = &[Scope::Membership, Scope::NotArchived, Scope::NotDeleted];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeChain {
    scopes: Vec<Scope>,
}

impl ScopeChain {
    pub fn new(scopes: &[Scope]) -> Self {
        let mut scopes = scopes.to_vec();
        scopes.sort();
        scopes.dedup();
        Self { scopes }
    }

    /// Membership, not-archived, not-deleted.
    pub fn default_read() -> Self {
        Self::new(DEFAULT_SCOPES)
    }

    /// Public boards only.
    pub fn public_listing() -> Self {
        Self::new(&[Scope::Public])
    }

    /// Drop one scope, e.g. to let unarchive find an archived board.
    pub fn without(mut self, scope: Scope) -> Self {
        self.scopes.retain(|s| *s != scope);
        self
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    pub fn admits(&self, board: &Board, viewer: &Viewer) -> bool {
        self.scopes.iter().all(|s| s.admits(board, viewer))
    }

    pub fn filter(&self, boards: Vec<Board>, viewer: &Viewer) -> Vec<Board> {
        boards
            .into_iter()
            .filter(|b| self.admits(b, viewer))
            .collect()
    }
}

impl Default for ScopeChain {
    fn default() -> Self {
        Self::default_read()
    }
}
