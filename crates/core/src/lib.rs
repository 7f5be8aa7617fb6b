//! Boardwalk domain core.
//!
//! Holds the board model and the rules that keep a board's `owner`,
//! `members`, `labels`, and archival state consistent, together with the
//! collaborator traits ([`store::BoardStore`], [`account::AccountDirectory`])
//! and the [`service::BoardService`] entry point that orchestrates them.
//!
//! This crate has no internal dependencies so the database, event, and API
//! crates can all share the same types and rules.

pub mod account;
pub mod board;
pub mod error;
pub mod memory;
pub mod roles;
pub mod service;
pub mod store;
pub mod types;
