use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sojourn::{config, server};

#[derive(Parser)]
#[command(name = "sojourn", version, about = "Personal travel-log HTTP service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server
    Serve,
    /// Print the resolved configuration and exit
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::SojournConfig::load()?;

    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => {
            server::serve(config).await?;
        }
        Command::Config => {
            println!("db_path   = {}", config.resolved_db_path().display());
            println!("bind      = {}:{}", config.server.host, config.server.port);
            println!("log_level = {}", config.server.log_level);
            println!(
                "auth_key  = {}",
                if config.server.auth_key.is_empty() {
                    "(unset)"
                } else {
                    "(set)"
                }
            );
        }
    }

    Ok(())
}
