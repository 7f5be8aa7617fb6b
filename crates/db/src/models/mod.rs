//! Row structs for the `accounts` and `boards` tables.
//!
//! Each submodule contains a `FromRow` struct matching the table columns and
//! a conversion into the corresponding `boardwalk_core` domain type.

pub mod account;
pub mod board;
