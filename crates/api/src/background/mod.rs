//! Background tasks spawned by the API process.
//!
//! Each submodule provides a long-running async function intended to be
//! spawned via `tokio::spawn`. The task queue and scheduler live in
//! `robofleet_worker` and are started from `main` when embedded.

pub mod event_fanout;
