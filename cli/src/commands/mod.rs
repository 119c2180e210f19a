pub mod classify;
pub mod resolve;
pub mod serve;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use config::{TenancyConfig, Validate};

#[derive(Parser)]
#[command(
    name = "churchos",
    author,
    version,
    about = "Church OS tenancy - find the organization a hostname belongs to",
    long_about = "Classifies hostnames, resolves them to organizations and serves tenant-aware \
                  HTTP.\n\nConfiguration comes from --config, CHURCHOS_* variables and \
                  defaults, in that order of precedence below the flags.",
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Classify a hostname without touching the store")]
    Classify(classify::ClassifyArgs),

    #[command(about = "Resolve a hostname or URL to an organization")]
    Resolve(resolve::ResolveArgs),

    #[command(about = "Serve tenant-aware HTTP")]
    Serve(serve::ServeArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    #[arg(long, global = true, env = "CHURCHOS_CONFIG", help = "Configuration file (TOML or YAML)")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Tenant store base URL")]
    pub store_url: Option<String>,

    #[arg(long, global = true, help = "Enable the development first-label fallback")]
    pub development: bool,

    #[arg(
        long,
        global = true,
        help = "JSON file of organization records for the in-memory store",
    )]
    pub seed: Option<PathBuf>,
}

impl GlobalArgs {
    /// File and environment configuration with flags applied on top.
    pub fn load_config(&self) -> Result<TenancyConfig> {
        let mut config = config::load(self.config.as_deref())?;

        if let Some(url) = &self.store_url {
            config.store.url = Some(url.clone());
        }
        if self.development {
            config.domains.development = true;
        }

        config.validate()?;
        Ok(config)
    }
}
