use anyhow::Result;
use clap::Args;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::info;

use crate::output;
use crate::server::{AppState, create_router};
use crate::tenancy::Tenancy;

#[derive(Args)]
pub struct ServeArgs {
    #[arg(long, help = "Bind address (overrides configuration)")]
    pub bind: Option<String>,

    #[arg(long, short, help = "Port (overrides configuration)")]
    pub port: Option<u16>,
}

pub async fn run(args: ServeArgs, tenancy: Tenancy) -> Result<()> {
    let mut server = tenancy.config.server.clone();
    if let Some(bind) = args.bind {
        server.bind_address = bind;
    }
    if let Some(port) = args.port {
        server.port = port;
    }

    let metrics = if tenancy.config.observability.metrics_enabled {
        Some(PrometheusBuilder::new().install_recorder()?)
    } else {
        None
    };

    let addr = server.socket_addr();
    output::info(&format!(
        "Serving tenants of {} on http://{}",
        tenancy.config.domains.base_domain, addr,
    ));

    let app = create_router(AppState::new(tenancy, metrics));

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
