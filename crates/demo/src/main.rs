use std::io::{self, BufReader};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use robofleet_demo::console::Console;
use robofleet_demo::scenario::{self, RunIdentity};
use robofleet_demo::{listen, Cli, Command, DemoConfig};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // Presentation goes to stdout; diagnostics to stderr.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "robofleet_demo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("robofleet-demo: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Command::Listen(args)) => {
            let count = listen::listen(&cli.api_url, &args, &mut io::stdout()).await?;
            tracing::info!(count, "Listener finished");
        }
        None => {
            let config = DemoConfig::new(&cli.api_url, &cli.demo);
            let workdir = std::env::current_dir().context("Cannot read working directory")?;
            let mut console = if config.interactive {
                Console::interactive(io::stdout(), Box::new(BufReader::new(io::stdin())))
            } else {
                Console::non_interactive(io::stdout())
            };
            scenario::run(&config, &workdir, RunIdentity::now(), &mut console).await?;
        }
    }
    Ok(())
}
