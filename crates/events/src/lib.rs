//! Boardwalk in-process event bus.
//!
//! - [`EventBus`] -- publish/subscribe hub backed by `tokio::sync::broadcast`.
//! - [`BoardEvent`] -- the envelope published after every successful board
//!   mutation.

pub mod bus;

pub use bus::{BoardEvent, BoardEventKind, EventBus};
