//! Database-backed tests for the task bodies, the runner and the scheduler.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use robofleet_core::fleet_health::AlertKind;
use robofleet_core::mission::{plan_transition, LifecycleAction, MissionStatus};
use robofleet_core::robot::RobotStatus;
use robofleet_core::task::{TaskName, TaskStatus};
use robofleet_db::models::mission::CreateMission;
use robofleet_db::models::robot::CreateRobot;
use robofleet_db::repositories::{MissionRepo, RobotRepo, TaskRunRepo};
use robofleet_events::{EventBus, FleetEventKind};
use robofleet_worker::{runner, scheduler, tasks, WorkerConfig};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

fn robot(serial: &str, status: RobotStatus, battery: Option<f64>) -> CreateRobot {
    CreateRobot {
        name: format!("bot-{serial}"),
        serial_number: serial.to_string(),
        robot_type: None,
        status: Some(status),
        location_x: None,
        location_y: None,
        location_z: None,
        heading: None,
        firmware_version: None,
        battery_level: battery,
        description: None,
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn fleet_health_reports_alerts_and_publishes(pool: PgPool) {
    RobotRepo::create(&pool, &robot("H-1", RobotStatus::Idle, Some(90.0)))
        .await
        .unwrap();
    RobotRepo::create(&pool, &robot("H-2", RobotStatus::Active, Some(10.0)))
        .await
        .unwrap();
    RobotRepo::create(&pool, &robot("H-3", RobotStatus::Error, None))
        .await
        .unwrap();

    let bus = EventBus::default();
    let mut rx = bus.subscribe();

    let report = tasks::fleet_health::run(&pool, &bus).await.unwrap();
    assert_eq!(report.total, 3);
    assert_eq!(report.by_status["idle"], 1);
    let kinds: Vec<_> = report.alerts.iter().map(|a| a.kind).collect();
    assert!(kinds.contains(&AlertKind::LowBattery));
    assert!(kinds.contains(&AlertKind::Fault));

    let event = rx.try_recv().expect("fleet_health event published");
    assert_eq!(event.event_type, FleetEventKind::FleetHealth);
    assert_eq!(event.payload["report"]["total"], 3);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn due_missions_are_started(pool: PgPool) {
    let bot = RobotRepo::create(&pool, &robot("S-1", RobotStatus::Idle, Some(80.0)))
        .await
        .unwrap();
    let now = Utc::now();
    let mission = MissionRepo::create(
        &pool,
        &CreateMission {
            name: "Night patrol".into(),
            description: None,
            priority: None,
            target_x: None,
            target_y: None,
            target_z: None,
            scheduled_at: Some(now - Duration::minutes(1)),
        },
    )
    .await
    .unwrap();
    let assign = plan_transition(mission.status, LifecycleAction::Assign, true, None, now).unwrap();
    MissionRepo::apply_transition(&pool, mission.id, mission.status, &assign, Some(bot.id))
        .await
        .unwrap()
        .unwrap();

    let bus = EventBus::default();
    let mut rx = bus.subscribe();

    let outcome = tasks::scheduled_missions::run(&pool, &bus, now).await.unwrap();
    assert_eq!(outcome.started, 1);
    assert_eq!(outcome.mission_ids, vec![mission.id]);

    let started = MissionRepo::find_by_id(&pool, mission.id).await.unwrap().unwrap();
    assert_eq!(started.status, MissionStatus::InProgress);
    assert!(started.started_at.is_some());
    let robot_after = RobotRepo::find_by_id(&pool, bot.id).await.unwrap().unwrap();
    assert_eq!(robot_after.status, RobotStatus::Idle);

    let event = rx.try_recv().expect("mission_update event published");
    assert_eq!(event.event_type, FleetEventKind::MissionUpdate);
    assert_eq!(event.mission_id, Some(mission.id));
    assert_eq!(event.robot_id, Some(bot.id));

    // A second pass finds nothing left to start.
    let again = tasks::scheduled_missions::run(&pool, &bus, now).await.unwrap();
    assert_eq!(again.started, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn runner_records_result_on_the_row(pool: PgPool) {
    let queued = TaskRunRepo::enqueue(&pool, TaskName::FleetHealthCheck, None)
        .await
        .unwrap();
    let claimed = TaskRunRepo::claim_next(&pool).await.unwrap().unwrap();
    assert_eq!(claimed.id, queued.id);

    let bus = EventBus::default();
    runner::process(&pool, &bus, claimed).await;

    let done = TaskRunRepo::find_by_id(&pool, queued.id).await.unwrap().unwrap();
    assert_eq!(done.status, TaskStatus::Succeeded);
    let result = done.result.expect("result stored");
    assert_eq!(result["total"], 0);
    assert!(result["alerts"].as_array().unwrap().is_empty());
}

async fn orphan_running_run(pool: &PgPool, name: TaskName) -> robofleet_core::types::DbId {
    let run = TaskRunRepo::enqueue(pool, name, None).await.unwrap();
    sqlx::query(
        "UPDATE task_runs SET status = 'running', started_at = NOW() - INTERVAL '1 hour' \
         WHERE id = $1",
    )
    .bind(run.id)
    .execute(pool)
    .await
    .unwrap();
    run.id
}

async fn count_runs(pool: &PgPool, name: TaskName, status: TaskStatus) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM task_runs WHERE task_name = $1 AND status = $2")
        .bind(name.as_str())
        .bind(status.as_str())
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn run_stuck_past_time_limit_is_failed_and_no_longer_pending(pool: PgPool) {
    let orphan = orphan_running_run(&pool, TaskName::FleetHealthCheck).await;
    let live = TaskRunRepo::enqueue(&pool, TaskName::ProcessScheduledMissions, None)
        .await
        .unwrap();
    TaskRunRepo::claim_next(&pool).await.unwrap();

    assert!(!TaskRunRepo::has_pending(&pool, TaskName::FleetHealthCheck).await.unwrap());
    assert!(TaskRunRepo::has_pending(&pool, TaskName::ProcessScheduledMissions)
        .await
        .unwrap());

    assert_eq!(TaskRunRepo::fail_abandoned(&pool).await.unwrap(), 1);

    let failed = TaskRunRepo::find_by_id(&pool, orphan).await.unwrap().unwrap();
    assert_eq!(failed.status, TaskStatus::Failed);
    assert!(failed.finished_at.is_some());
    assert!(failed.error_message.unwrap().contains("time limit"));

    let untouched = TaskRunRepo::find_by_id(&pool, live.id).await.unwrap().unwrap();
    assert_eq!(untouched.status, TaskStatus::Running);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn scheduler_enqueues_again_after_an_abandoned_run(pool: PgPool) {
    orphan_running_run(&pool, TaskName::FleetHealthCheck).await;

    let config = WorkerConfig {
        poll_interval: StdDuration::from_secs(60),
        fleet_health_interval: StdDuration::from_millis(50),
        scheduled_missions_interval: StdDuration::from_secs(60),
    };
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(scheduler::run(pool.clone(), config, cancel.clone()));
    tokio::time::sleep(StdDuration::from_millis(300)).await;
    cancel.cancel();
    handle.await.unwrap();

    // One fresh run; it then blocks further duplicates.
    assert_eq!(count_runs(&pool, TaskName::FleetHealthCheck, TaskStatus::Queued).await, 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn runner_fails_abandoned_runs_on_startup(pool: PgPool) {
    let orphan = orphan_running_run(&pool, TaskName::FleetHealthCheck).await;

    let cancel = CancellationToken::new();
    let handle = tokio::spawn(runner::run(
        pool.clone(),
        Arc::new(EventBus::default()),
        StdDuration::from_secs(60),
        cancel.clone(),
    ));
    tokio::time::sleep(StdDuration::from_millis(200)).await;
    cancel.cancel();
    handle.await.unwrap();

    let run = TaskRunRepo::find_by_id(&pool, orphan).await.unwrap().unwrap();
    assert_eq!(run.status, TaskStatus::Failed);
}
