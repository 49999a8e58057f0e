//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod mission_repo;
pub mod robot_repo;
pub mod task_run_repo;
pub mod user_repo;

pub use mission_repo::MissionRepo;
pub use robot_repo::RobotRepo;
pub use task_run_repo::TaskRunRepo;
pub use user_repo::UserRepo;
