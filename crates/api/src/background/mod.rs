//! Long-running background tasks spawned by `main`.

pub mod event_log;
