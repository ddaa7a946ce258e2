use clap::Parser;
use market_scanner::cli::{Cli, Commands};
use market_scanner::config::Config;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
            eprintln!("Using bundled config.toml.example");
            toml::from_str(include_str!("../config.toml.example"))?
        }
    };

    // Initialize telemetry
    market_scanner::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command() {
        Commands::Run(args) => {
            tracing::info!(config = %cli.config, "Starting scheduled scans");
            args.execute(&config).await?;
        }
        Commands::Once(args) => {
            tracing::info!(config = %cli.config, "Starting single scan");
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
