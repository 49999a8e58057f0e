//! RoboFleet demo orchestrator.
//!
//! Drives a running fleet API through a scripted walkthrough (register,
//! elevate, log in, create robots and missions, run a mission lifecycle,
//! trigger a health check) and prints each step for a live audience. The
//! `listen` subcommand tails one of the WebSocket streams.

pub mod client;
pub mod config;
pub mod console;
pub mod elevation;
pub mod error;
pub mod listen;
pub mod scenario;

pub use config::{Cli, Command, DemoConfig};
pub use error::DemoError;
