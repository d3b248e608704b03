use clap::Parser;
use formwatch::cli::commands::{cmd_scan, cmd_simulate};
use formwatch::cli::config::{Cli, Commands, load_config};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Scan { page, url, json } => {
            cmd_scan(&page, &url, json, cli.verbose, &config)?;
        }
        Commands::Simulate { script } => {
            cmd_simulate(&script, cli.verbose, &config)?;
        }
    }

    Ok(())
}
