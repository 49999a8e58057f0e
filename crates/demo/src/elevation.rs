//! Promote the demo user to `operator` by writing the database directly.
//!
//! Registration always creates viewers, and no API endpoint lets a viewer
//! promote itself. Two paths are tried in order: `psql` inside the compose
//! database service, then a direct connection to `DATABASE_URL`.

use std::fmt;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use robofleet_core::roles::UserRole;
use sqlx::{Connection, PgConnection};
use tokio::process::Command;
use uuid::Uuid;

use crate::config::DemoConfig;

const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElevationPath {
    /// `docker compose exec -T <service> psql ...`
    Compose,
    /// sqlx connection to `DATABASE_URL`.
    DatabaseUrl,
}

impl fmt::Display for ElevationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElevationPath::Compose => f.write_str("docker compose"),
            ElevationPath::DatabaseUrl => f.write_str("DATABASE_URL"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ElevationError {
    #[error("could not run command: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("timed out")]
    TimedOut,

    #[error("command exited with {status}: {stderr}")]
    CommandFailed { status: String, stderr: String },

    #[error("DATABASE_URL is not set")]
    NoDatabaseUrl,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("no user row was updated")]
    NoRowUpdated,
}

/// Both paths failed.
#[derive(Debug, thiserror::Error)]
#[error("docker compose: {compose}; DATABASE_URL: {direct}")]
pub struct ElevationFailure {
    pub compose: ElevationError,
    pub direct: ElevationError,
}

/// Set the user's role to `operator`, returning the path that worked.
pub async fn elevate_to_operator(
    config: &DemoConfig,
    workdir: &Path,
    user_id: Uuid,
) -> Result<ElevationPath, ElevationFailure> {
    let compose = match via_compose(config, workdir, user_id).await {
        Ok(()) => return Ok(ElevationPath::Compose),
        Err(e) => {
            tracing::debug!(error = %e, "Compose elevation failed");
            e
        }
    };

    match via_database_url(config.database_url.as_deref(), user_id).await {
        Ok(()) => Ok(ElevationPath::DatabaseUrl),
        Err(direct) => {
            tracing::debug!(error = %direct, "Direct elevation failed");
            Err(ElevationFailure { compose, direct })
        }
    }
}

/// `user_id` is a parsed UUID, so it is safe to inline.
pub fn update_statement(user_id: Uuid) -> String {
    format!(
        "UPDATE users SET role = '{}' WHERE id = '{user_id}'",
        UserRole::Operator.as_str()
    )
}

async fn via_compose(
    config: &DemoConfig,
    workdir: &Path,
    user_id: Uuid,
) -> Result<(), ElevationError> {
    let sql = update_statement(user_id);
    let mut command = Command::new(&config.docker_bin);
    command
        .args(["compose", "exec", "-T", &config.compose_service])
        .args(["psql", "-U", &config.db_user, "-d", &config.db_name])
        .args(["-v", "ON_ERROR_STOP=1", "-c", &sql])
        .current_dir(workdir)
        .stdin(Stdio::null())
        .kill_on_drop(true);

    let output = tokio::time::timeout(COMMAND_TIMEOUT, command.output())
        .await
        .map_err(|_| ElevationError::TimedOut)??;

    if !output.status.success() {
        return Err(ElevationError::CommandFailed {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    // psql reports the command tag, e.g. "UPDATE 1".
    if !String::from_utf8_lossy(&output.stdout).contains("UPDATE 1") {
        return Err(ElevationError::NoRowUpdated);
    }
    Ok(())
}

async fn via_database_url(url: Option<&str>, user_id: Uuid) -> Result<(), ElevationError> {
    let url = url.ok_or(ElevationError::NoDatabaseUrl)?;
    let mut conn = tokio::time::timeout(CONNECT_TIMEOUT, PgConnection::connect(url))
        .await
        .map_err(|_| ElevationError::TimedOut)??;

    let result = sqlx::query("UPDATE users SET role = $1 WHERE id = $2")
        .bind(UserRole::Operator.as_str())
        .bind(user_id)
        .execute(&mut conn)
        .await?;

    if let Err(e) = conn.close().await {
        tracing::debug!(error = %e, "Error closing elevation connection");
    }
    if result.rows_affected() != 1 {
        return Err(ElevationError::NoRowUpdated);
    }
    Ok(())
}
