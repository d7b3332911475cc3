use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use homework_bot::config::{AppConfig, Secrets};
use homework_bot::practicum::{check_response, StatusSource};

#[derive(Parser)]
#[command(
    name = "homework-bot",
    about = "Telegram notifier for homework review status changes",
    version,
    long_about = None
)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check tokens, then poll the status API forever
    Run,

    /// Verify that all required tokens are set
    CheckTokens,

    /// Fetch once and print the latest verdict without sending it
    Status {
        /// Unix timestamp to query from (default: now)
        #[arg(long)]
        from_date: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = tracing::subscriber::with_default(homework_bot::logging::bootstrap(), || {
        AppConfig::resolve(cli.config.as_deref())
    })?;
    homework_bot::logging::init(&config.logging)?;

    match cli.command {
        Commands::Run => {
            let secrets = Secrets::from_env()?;
            homework_bot::run(config, secrets).await?;
        }
        Commands::CheckTokens => {
            Secrets::from_env()?;
            println!("All tokens are set.");
        }
        Commands::Status { from_date } => {
            let secrets = Secrets::from_env()?;
            let (source, _) = homework_bot::build_clients(&config, &secrets)?;
            let from_date = from_date.unwrap_or_else(|| chrono::Utc::now().timestamp());
            tracing::info!(from_date, "Fetching status once");

            let payload = source.fetch(from_date).await?;
            let response = check_response(payload, config.poll.require_current_date)?;
            match response.latest() {
                Some(homework) => println!("{}", homework_bot::status::parse_status(homework)?),
                None => println!("No updates since {}.", from_date),
            }
            if let Some(current_date) = response.current_date {
                println!("current_date: {}", current_date);
            }
        }
    }

    Ok(())
}
