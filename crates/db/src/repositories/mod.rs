//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&PgPool` as the first argument.

pub mod account_repo;
pub mod board_repo;

pub use account_repo::AccountRepo;
pub use board_repo::BoardRepo;
