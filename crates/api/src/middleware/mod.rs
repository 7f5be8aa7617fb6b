//! Authentication extractors.
//!
//! - [`auth::AuthUser`] -- requires a valid JWT Bearer token.
//! - [`auth::MaybeAuthUser`] -- accepts anonymous requests; rejects only
//!   malformed or invalid tokens.
//!
//! Board-level permissions (member, owner) are enforced by the board
//! service, not here.

pub mod auth;
