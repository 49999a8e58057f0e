//! Entity models and DTOs, one module per table.

pub mod mission;
pub mod robot;
pub mod task_run;
pub mod user;
