//! Well-known role name constants.
//!
//! Account roles come from the access token; board roles are derived from
//! the board being acted on (see [`crate::board::permissions`]).

pub const ROLE_USER: &str = "user";

/// Any signed-in account.
pub const ROLE_AUTHENTICATED: &str = "$authenticated";
/// An account listed in the board's `members`.
pub const ROLE_BOARD_MEMBER: &str = "$board-member";
/// The board's `owner`.
pub const ROLE_BOARD_OWNER: &str = "$board-owner";
