use clap::Parser;
use mchigm_analytics::commands::{Commands, handle_command};
use mchigm_analytics::{Config, Server};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "mchigm-analytics")]
#[command(about = "Statistics and report service for the MCHIGM platform")]
struct Cli {
    #[arg(short, long, help = "Path to configuration file")]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => Config::load_from_file(path),
        None => Config::load(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.logging.level))
        .with_writer(std::io::stderr)
        .init();

    if let Some(command) = cli.command {
        if let Err(e) = handle_command(command).await {
            error!("Command failed: {}", e);
            std::process::exit(1);
        }
        return;
    }

    info!("Starting MCHIGM analytics service");

    let server = Server::new(config);
    if let Err(e) = server.run().await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
