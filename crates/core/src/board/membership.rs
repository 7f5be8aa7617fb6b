//! Member-set transforms and ownership checks.
//!
//! Every function here is pure: it takes the current state explicitly and
//! returns either the new `members`/`owner` values or a [`BoardError`]. The
//! caller applies the result as one persisted write after all checks pass.
//!
//! Account existence is not known here. The service resolves accounts
//! through an [`AccountDirectory`](crate::account::AccountDirectory) and
//! hands the summaries to [`check_resolved_members`] / [`check_owner_active`].

use std::collections::HashSet;

use crate::account::AccountSummary;
use crate::error::BoardError;
use crate::types::DbId;

/// Result of an ownership transfer: both fields are written together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipChange {
    pub owner: DbId,
    pub members: Vec<DbId>,
}

/// Collapse duplicates, keeping the first occurrence of each id.
pub fn dedup_members(members: &[DbId]) -> Vec<DbId> {
    let mut seen = HashSet::with_capacity(members.len());
    members.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Union of `current` and `to_add`, in first-appearance order.
///
/// Idempotent: adding the same ids twice yields the same set.
pub fn add_members(current: &[DbId], to_add: &[DbId]) -> Vec<DbId> {
    let combined: Vec<DbId> = current.iter().chain(to_add).copied().collect();
    dedup_members(&combined)
}

/// `current` minus `to_remove`.
///
/// Fails with [`BoardError::OwnerCantBeRemoved`] when the result would no
/// longer contain `owner`.
pub fn remove_members(
    board_id: DbId,
    current: &[DbId],
    owner: DbId,
    to_remove: &[DbId],
) -> Result<Vec<DbId>, BoardError> {
    let members: Vec<DbId> = dedup_members(current)
        .into_iter()
        .filter(|id| !to_remove.contains(id))
        .collect();
    check_owner_retained(board_id, owner, &members)?;
    Ok(members)
}

/// Make `new_owner` the owner and ensure it is a member.
pub fn transfer_ownership(current: &[DbId], new_owner: DbId) -> OwnershipChange {
    OwnershipChange {
        owner: new_owner,
        members: add_members(current, &[new_owner]),
    }
}

/// The owner must be part of `members`.
pub fn check_owner_retained(
    board_id: DbId,
    owner: DbId,
    members: &[DbId],
) -> Result<(), BoardError> {
    if members.contains(&owner) {
        Ok(())
    } else {
        Err(BoardError::OwnerCantBeRemoved {
            board: board_id,
            owner,
            members: members.to_vec(),
        })
    }
}

/// All-or-nothing account check for a member list.
///
/// Every requested id must appear in `resolved` as an active account. A
/// single missing or inactive id fails the whole list; the error lists the
/// offending ids.
pub fn check_resolved_members(
    board_id: Option<DbId>,
    requested: &[DbId],
    resolved: &[AccountSummary],
) -> Result<(), BoardError> {
    let invalid: Vec<DbId> = dedup_members(requested)
        .into_iter()
        .filter(|id| !resolved.iter().any(|a| a.id == *id && a.is_active()))
        .collect();
    if invalid.is_empty() {
        Ok(())
    } else {
        Err(BoardError::MemberNotValid {
            board: board_id,
            members: invalid,
        })
    }
}

/// Check for the `owner` field.
///
/// An id that does not resolve is [`BoardError::MemberNotValid`]; an
/// account that resolves but is not active is [`BoardError::OwnerNotActive`].
pub fn check_owner_active(
    board_id: Option<DbId>,
    owner: DbId,
    resolved: Option<&AccountSummary>,
) -> Result<(), BoardError> {
    match resolved {
        None => Err(BoardError::MemberNotValid {
            board: board_id,
            members: vec![owner],
        }),
        Some(account) if !account.is_active() => Err(BoardError::OwnerNotActive {
            board: board_id,
            owner,
        }),
        Some(_) => Ok(()),
    }
}

/// Full `members` field check run on every create/update touching members.
///
/// (a) every id in `introduced` resolves to an active account, all-or-nothing.
/// Ids already on the board were checked when they joined;
/// (b) when updating an existing board, `owner_if_updating` is in the final
/// `members` set.
pub fn validate_members_field(
    board_id: Option<DbId>,
    members: &[DbId],
    introduced: &[DbId],
    resolved: &[AccountSummary],
    owner_if_updating: Option<DbId>,
) -> Result<(), BoardError> {
    check_resolved_members(board_id, introduced, resolved)?;
    if let (Some(id), Some(owner)) = (board_id, owner_if_updating) {
        check_owner_retained(id, owner, members)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::account::AccountStatus;

    fn account(id: DbId, status: AccountStatus) -> AccountSummary {
        AccountSummary {
            id,
            username: format!("user{id}"),
            full_name: None,
            avatar: None,
            status,
        }
    }

    fn active(ids: &[DbId]) -> Vec<AccountSummary> {
        ids.iter()
            .map(|&id| account(id, AccountStatus::Active))
            .collect()
    }

    #[test]
    fn add_members_preserves_first_appearance_order() {
        assert_eq!(add_members(&[1, 2], &[3, 1, 4, 3]), vec![1, 2, 3, 4]);
    }

    #[test]
    fn add_members_is_idempotent() {
        let once = add_members(&[1, 2], &[3, 4]);
        let twice = add_members(&once, &[3, 4]);
        assert_eq!(once, twice);
    }

    #[test]
    fn add_members_collapses_existing_duplicates() {
        assert_eq!(add_members(&[1, 1, 2], &[]), vec![1, 2]);
    }

    #[test]
    fn remove_members_drops_requested_ids() {
        let members = remove_members(10, &[1, 2, 3], 1, &[2, 9]).unwrap();
        assert_eq!(members, vec![1, 3]);
    }

    #[test]
    fn removing_the_owner_fails() {
        let err = remove_members(10, &[1, 2], 1, &[1]).unwrap_err();
        assert_matches!(
            err,
            BoardError::OwnerCantBeRemoved { board: 10, owner: 1, ref members } if members == &vec![2]
        );
    }

    #[test]
    fn owner_is_always_retained_after_successful_removal() {
        let current = [1, 2, 3, 4];
        for to_remove in [vec![2], vec![3, 4], vec![2, 3, 4], vec![]] {
            let members = remove_members(1, &current, 1, &to_remove).unwrap();
            assert!(members.contains(&1));
        }
    }

    #[test]
    fn transfer_adds_new_owner_to_members() {
        let change = transfer_ownership(&[1, 2], 5);
        assert_eq!(change.owner, 5);
        assert_eq!(change.members, vec![1, 2, 5]);
    }

    #[test]
    fn transfer_to_existing_member_keeps_set() {
        let change = transfer_ownership(&[1, 2], 2);
        assert_eq!(change.owner, 2);
        assert_eq!(change.members, vec![1, 2]);
    }

    #[test]
    fn unresolved_member_fails_whole_list() {
        let err = check_resolved_members(Some(1), &[2, 3], &active(&[2])).unwrap_err();
        assert_eq!(
            err,
            BoardError::MemberNotValid {
                board: Some(1),
                members: vec![3],
            }
        );
    }

    #[test]
    fn inactive_member_is_not_valid() {
        let resolved = vec![account(3, AccountStatus::Inactive)];
        assert_matches!(
            check_resolved_members(None, &[3], &resolved),
            Err(BoardError::MemberNotValid { .. })
        );
    }

    #[test]
    fn owner_check_distinguishes_missing_and_inactive() {
        assert_matches!(
            check_owner_active(Some(1), 7, None),
            Err(BoardError::MemberNotValid { .. })
        );
        let inactive = account(7, AccountStatus::Inactive);
        assert_matches!(
            check_owner_active(Some(1), 7, Some(&inactive)),
            Err(BoardError::OwnerNotActive { owner: 7, .. })
        );
        let live = account(7, AccountStatus::Active);
        assert!(check_owner_active(Some(1), 7, Some(&live)).is_ok());
    }

    #[test]
    fn members_field_requires_owner_only_on_update() {
        let resolved = active(&[2, 3]);
        // Creating: no owner requirement yet.
        assert!(validate_members_field(None, &[2, 3], &[2, 3], &resolved, Some(1)).is_ok());
        // Updating: owner 1 missing from the final set.
        assert_matches!(
            validate_members_field(Some(9), &[2, 3], &[3], &resolved, Some(1)),
            Err(BoardError::OwnerCantBeRemoved { board: 9, owner: 1, .. })
        );
        assert!(validate_members_field(Some(9), &[2, 3], &[2], &resolved, Some(3)).is_ok());
    }

    #[test]
    fn members_field_resolves_only_introduced_ids() {
        // Member 4 was already on the board and is not re-resolved.
        let resolved = active(&[2]);
        assert!(validate_members_field(Some(9), &[1, 4, 2], &[2], &resolved, Some(1)).is_ok());
        assert_matches!(
            validate_members_field(Some(9), &[1, 4, 5], &[5], &resolved, Some(1)),
            Err(BoardError::MemberNotValid { board: Some(9), ref members }) if members == &vec![5]
        );
    }
}
