//! Domain types and rules shared by every RoboFleet crate.
//!
//! Nothing in here touches the database or the network. Enumerations are
//! stored as lowercase text and round-trip through [`std::str::FromStr`],
//! `TryFrom<String>` (used by `sqlx` row decoding) and serde.

#[macro_use]
mod macros;

pub mod error;
pub mod fleet_health;
pub mod mission;
pub mod robot;
pub mod roles;
pub mod task;
pub mod types;
pub mod user;
