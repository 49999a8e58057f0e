//! Request handlers, one module per resource.

pub mod auth;
pub mod missions;
pub mod robots;
pub mod tasks;
