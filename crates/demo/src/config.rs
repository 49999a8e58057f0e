use std::time::Duration;

use clap::{ArgGroup, Args, Parser, Subcommand};
use uuid::Uuid;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Parser, Debug)]
#[command(
    name = "robofleet-demo",
    version,
    about = "Walk a running RoboFleet API through a scripted demo"
)]
pub struct Cli {
    /// Base URL of the fleet API.
    #[arg(long, env = "API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    #[command(flatten)]
    pub demo: DemoArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print messages from a robot or fleet WebSocket stream.
    Listen(ListenArgs),
}

/// Flags for the scripted walkthrough (the default command).
#[derive(Args, Debug, Clone)]
pub struct DemoArgs {
    /// Fallback connection string for the role elevation step.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// File that must exist in the working directory.
    #[arg(long, env = "DEMO_MARKER_FILE", default_value = "docker-compose.yml")]
    pub marker: String,

    /// Compose service running PostgreSQL.
    #[arg(long, env = "DEMO_DB_SERVICE", default_value = "db")]
    pub compose_service: String,

    #[arg(long, env = "DEMO_DB_USER", default_value = "postgres")]
    pub db_user: String,

    #[arg(long, env = "DEMO_DB_NAME", default_value = "robofleet")]
    pub db_name: String,

    /// Docker CLI used for `docker compose exec`.
    #[arg(long, env = "DEMO_DOCKER_BIN", default_value = "docker")]
    pub docker_bin: String,

    /// Simulated mission runtime between start and complete.
    #[arg(long, env = "DEMO_PROGRESS_DELAY_SECS", default_value_t = 3)]
    pub progress_delay_secs: u64,

    /// Skip the "Press Enter to continue" pauses.
    #[arg(long, env = "DEMO_NON_INTERACTIVE")]
    pub non_interactive: bool,
}

#[derive(Args, Debug, Clone)]
#[command(group(ArgGroup::new("target").required(true).args(["robot", "fleet"])))]
pub struct ListenArgs {
    /// Robot whose stream to follow.
    #[arg(long)]
    pub robot: Option<Uuid>,

    /// Follow the fleet-wide stream instead.
    #[arg(long)]
    pub fleet: bool,

    /// Bearer token from `POST /api/v1/auth/login`.
    #[arg(long, env = "DEMO_TOKEN")]
    pub token: String,

    /// Stop after this many messages.
    #[arg(long)]
    pub max_messages: Option<usize>,
}

/// Resolved settings for one walkthrough run.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    /// Base URL without a trailing slash.
    pub api_url: String,
    pub database_url: Option<String>,
    pub marker: String,
    pub compose_service: String,
    pub db_user: String,
    pub db_name: String,
    pub docker_bin: String,
    pub progress_delay: Duration,
    pub interactive: bool,
}

impl DemoConfig {
    pub fn new(api_url: &str, args: &DemoArgs) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            database_url: args.database_url.clone().filter(|url| !url.is_empty()),
            marker: args.marker.clone(),
            compose_service: args.compose_service.clone(),
            db_user: args.db_user.clone(),
            db_name: args.db_name.clone(),
            docker_bin: args.docker_bin.clone(),
            progress_delay: Duration::from_secs(args.progress_delay_secs),
            interactive: !args.non_interactive,
        }
    }

    /// WebSocket base matching `api_url` (`http` -> `ws`, `https` -> `wss`).
    pub fn ws_url(&self) -> String {
        ws_base(&self.api_url)
    }
}

pub fn ws_base(api_url: &str) -> String {
    let api_url = api_url.trim_end_matches('/');
    if let Some(rest) = api_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = api_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        api_url.to_string()
    }
}
