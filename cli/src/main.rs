use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use churchos::commands::{self, Cli, Commands};
use churchos::tenancy::Tenancy;
use churchos::ux_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.global.load_config() {
        Ok(config) => config,
        Err(err) => {
            ux_error::config_error(&format!("{err:#}")).display();
            std::process::exit(2);
        }
    };

    // RUST_LOG wins over the configured level.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Classify(args) => commands::classify::run(args, &config),
        Commands::Resolve(args) => {
            let tenancy = Tenancy::from_config(config, cli.global.seed.as_deref())?;
            commands::resolve::run(args, &tenancy).await
        }
        Commands::Serve(args) => {
            let tenancy = Tenancy::from_config(config, cli.global.seed.as_deref())?;
            commands::serve::run(args, tenancy).await
        }
    }
}
