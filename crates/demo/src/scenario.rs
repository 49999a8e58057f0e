//! The scripted walkthrough.
//!
//! Steps run strictly in order and any failed call ends the run. Two steps
//! are lenient: role elevation only warns, and the robot count falls back to
//! `unknown` when the list body is not a JSON array.

use std::io::Write;
use std::path::Path;

use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::client::{str_field, FleetApiClient};
use crate::config::DemoConfig;
use crate::console::Console;
use crate::elevation::{elevate_to_operator, ElevationPath};
use crate::error::DemoError;

/// Password of every generated demo account.
pub const DEMO_PASSWORD: &str = "RoboFleetDemo123!";

/// How much of the bearer token the summary shows.
pub const TOKEN_PREFIX_LEN: usize = 50;

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct DemoSummary {
    pub email: String,
    pub password: &'static str,
    pub token_prefix: String,
    pub user_id: Uuid,
    /// `None` when both elevation paths failed.
    pub elevated_via: Option<ElevationPath>,
    pub robot_ids: Vec<String>,
    pub mission_ids: Vec<String>,
    pub health_task_id: String,
}

/// Identifiers generated for one run. The timestamp keeps reruns disjoint.
#[derive(Debug, Clone)]
pub struct RunIdentity {
    pub timestamp: i64,
    pub email: String,
}

impl RunIdentity {
    pub fn now() -> Self {
        Self::at(Utc::now().timestamp())
    }

    pub fn at(timestamp: i64) -> Self {
        Self {
            timestamp,
            email: format!("demo-{timestamp}@robofleet.dev"),
        }
    }

    pub fn robots(&self) -> [Value; 3] {
        let ts = self.timestamp;
        [
            json!({
                "name": "Atlas-01",
                "serial_number": format!("AMR-{ts}-001"),
                "robot_type": "amr",
                "status": "idle",
                "location_x": 0.0,
                "location_y": 0.0,
                "heading": 0.0,
                "battery_level": 95.0,
                "firmware_version": "2.4.1",
                "description": "Warehouse floor runner",
            }),
            json!({
                "name": "Hermes-02",
                "serial_number": format!("AGV-{ts}-002"),
                "robot_type": "agv",
                "status": "charging",
                "location_x": 12.5,
                "location_y": 3.0,
                "battery_level": 41.0,
                "firmware_version": "1.9.0",
                "description": "Pallet mover on line B",
            }),
            json!({
                "name": "Skyhawk-03",
                "serial_number": format!("DRN-{ts}-003"),
                "robot_type": "drone",
                "status": "offline",
                "location_x": 40.0,
                "location_y": 18.0,
                "location_z": 0.0,
                "battery_level": 78.0,
                "firmware_version": "3.0.2",
                "description": "Inventory scanning drone",
            }),
        ]
    }

    pub fn missions(&self) -> [Value; 2] {
        [
            json!({
                "name": "Warehouse inspection run",
                "description": "Sweep aisles 1-6 and report blocked lanes",
                "priority": "high",
                "target_x": 25.0,
                "target_y": 10.0,
            }),
            json!({
                "name": "Inventory scan, zone B",
                "description": "Cycle count of the zone B high racks",
                "priority": "normal",
                "target_x": 40.0,
                "target_y": 18.0,
                "target_z": 6.0,
            }),
        ]
    }
}

/// `"N"` for a JSON array body, `"unknown"` otherwise.
pub fn count_label(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(items)) => items.len().to_string(),
        _ => "unknown".to_string(),
    }
}

fn token_prefix(token: &str) -> String {
    token.chars().take(TOKEN_PREFIX_LEN).collect()
}

/// Run the whole walkthrough from `workdir`.
///
/// Precondition failures print their remediation before returning.
pub async fn run<W: Write>(
    config: &DemoConfig,
    workdir: &Path,
    identity: RunIdentity,
    console: &mut Console<W>,
) -> Result<DemoSummary, DemoError> {
    console.banner("RoboFleet Demo")?;
    console.info(&format!("API: {}", config.api_url))?;

    // 1. Preflight
    console.section(1, "Preflight")?;
    if !workdir.join(&config.marker).is_file() {
        let err = DemoError::MarkerMissing {
            marker: config.marker.clone(),
            dir: workdir.to_path_buf(),
        };
        return Err(report_precondition(console, err)?);
    }
    console.success(&format!("Found {} in {}", config.marker, workdir.display()))?;

    // 2. Liveness
    console.section(2, "API liveness")?;
    let mut client = FleetApiClient::new(config.api_url.clone());
    if let Err(err) = client.probe_docs().await {
        return Err(report_precondition(console, err)?);
    }
    console.success(&format!("{}/docs is up", client.base_url()))?;
    console.pause()?;

    // 3. Register
    console.section(3, "Register demo user")?;
    console.step(&format!("POST /api/v1/auth/register ({})", identity.email))?;
    let user = client
        .register(&identity.email, DEMO_PASSWORD, "Demo Operator")
        .await?;
    let user_id_raw = str_field(&user, "id", "POST /api/v1/auth/register")?;
    let user_id = Uuid::parse_str(&user_id_raw).map_err(|_| DemoError::MissingField {
        field: "id",
        context: "POST /api/v1/auth/register".into(),
    })?;
    console.success(&format!("Registered user {user_id}"))?;

    // 4. Elevate
    console.section(4, "Grant operator role")?;
    console.step("UPDATE users SET role = 'operator'")?;
    let elevated_via = match elevate_to_operator(config, workdir, user_id).await {
        Ok(path) => {
            console.success(&format!("Role updated via {path}"))?;
            Some(path)
        }
        Err(failure) => {
            tracing::warn!(error = %failure, "Role elevation failed");
            console.warn("Could not update the role via docker compose or DATABASE_URL.")?;
            console.warn("Continuing as viewer; write calls below may be refused.")?;
            None
        }
    };

    // 5. Login
    console.section(5, "Log in")?;
    let token = client.login(&identity.email, DEMO_PASSWORD).await?;
    client.set_token(token.clone());
    console.success(&format!("Token: {}...", token_prefix(&token)))?;
    console.pause()?;

    // 6. Robots
    console.section(6, "Register robots")?;
    let mut robot_ids = Vec::new();
    for robot in identity.robots() {
        let created = client.create_robot(&robot).await?;
        let id = str_field(&created, "id", "POST /api/v1/robots")?;
        console.success(&format!(
            "{} ({}, {}) -> {id}",
            robot["name"].as_str().unwrap_or("robot"),
            robot["robot_type"].as_str().unwrap_or("?"),
            robot["status"].as_str().unwrap_or("?"),
        ))?;
        robot_ids.push(id);
    }

    // 7. Count
    console.section(7, "List robots")?;
    let body = client.list_robots_raw().await?;
    console.success(&format!("Robots in fleet: {}", count_label(&body)))?;
    console.pause()?;

    // 8. Missions
    console.section(8, "Create missions")?;
    let mut mission_ids = Vec::new();
    for mission in identity.missions() {
        let created = client.create_mission(&mission).await?;
        let id = str_field(&created, "id", "POST /api/v1/missions")?;
        console.success(&format!(
            "{} [{}] -> {id}",
            mission["name"].as_str().unwrap_or("mission"),
            mission["priority"].as_str().unwrap_or("?"),
        ))?;
        mission_ids.push(id);
    }
    console.pause()?;

    // 9. Lifecycle
    console.section(9, "Mission lifecycle")?;
    let (robot, mission) = (&robot_ids[0], &mission_ids[0]);
    client.assign_mission(mission, robot).await?;
    console.success(&format!("Assigned robot {robot} to mission {mission}"))?;
    client.update_robot_status(robot, "active").await?;
    console.success("Robot status -> active")?;
    client.start_mission(mission).await?;
    console.success("Mission started")?;
    console.step(&format!(
        "Mission running for {}s...",
        config.progress_delay.as_secs()
    ))?;
    tokio::time::sleep(config.progress_delay).await;
    client.complete_mission(mission).await?;
    console.success("Mission completed")?;
    client.update_robot_status(robot, "idle").await?;
    console.success("Robot status -> idle")?;
    console.pause()?;

    // 10. Background task
    console.section(10, "Fleet health check")?;
    let ack = client.trigger_fleet_health_check().await?;
    let health_task_id = str_field(&ack, "task_id", "POST /api/v1/tasks/fleet-health-check")?;
    let status = ack["status"].as_str().unwrap_or("unknown");
    console.success(&format!("Queued task {health_task_id} (status: {status})"))?;

    // 11. WebSocket endpoints
    console.section(11, "Real-time updates")?;
    let ws = config.ws_url();
    console.info("Robot stream:")?;
    console.info(&format!("  {ws}/ws/robots/{robot}?token=<token>"))?;
    console.info("Fleet stream:")?;
    console.info(&format!("  {ws}/ws/fleet?token=<token>"))?;
    console.info(&format!(
        "Try: robofleet-demo listen --robot {robot} --token <token>"
    ))?;
    console.pause()?;

    // 12. Final state
    console.section(12, "Final state")?;
    console.step("Robots")?;
    let robots = client.list_robots().await?;
    console.json(&robots)?;
    console.step("Missions")?;
    let missions = client.list_missions().await?;
    console.json(&missions)?;

    // 13. Summary
    let summary = DemoSummary {
        email: identity.email,
        password: DEMO_PASSWORD,
        token_prefix: token_prefix(&token),
        user_id,
        elevated_via,
        robot_ids,
        mission_ids,
        health_task_id,
    };
    console.section(13, "Summary")?;
    console.info(&format!("Email:    {}", summary.email))?;
    console.info(&format!("Password: {}", summary.password))?;
    console.info(&format!("Token:    {}...", summary.token_prefix))?;
    console.info(&format!("API docs: {}/docs", config.api_url))?;
    console.banner("Demo complete")?;

    Ok(summary)
}

/// Print a failed precondition with its remediation and hand the error back.
fn report_precondition<W: Write>(
    console: &mut Console<W>,
    err: DemoError,
) -> Result<DemoError, DemoError> {
    console.error(&err.to_string())?;
    if let Some(hint) = err.remediation() {
        console.info(hint)?;
    }
    Ok(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_label_falls_back_to_unknown() {
        assert_eq!(count_label("[1, 2, 3]"), "3");
        assert_eq!(count_label("[]"), "0");
        assert_eq!(count_label("{\"items\": []}"), "unknown");
        assert_eq!(count_label("<html>"), "unknown");
    }

    #[test]
    fn identifiers_embed_the_timestamp() {
        let identity = RunIdentity::at(1_700_000_000);
        assert_eq!(identity.email, "demo-1700000000@robofleet.dev");

        let robots = identity.robots();
        let serials: Vec<_> = robots
            .iter()
            .map(|r| r["serial_number"].as_str().unwrap())
            .collect();
        assert!(serials.iter().all(|s| s.contains("1700000000")));

        let types: std::collections::HashSet<_> =
            robots.iter().map(|r| r["robot_type"].clone()).collect();
        assert_eq!(types.len(), 3);
    }

    #[test]
    fn token_prefix_is_fifty_chars() {
        let token = "x".repeat(120);
        assert_eq!(token_prefix(&token).len(), TOKEN_PREFIX_LEN);
        assert_eq!(token_prefix("short"), "short");
    }
}
