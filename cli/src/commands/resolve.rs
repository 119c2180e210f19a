use std::time::Duration;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use context::NavigationTarget;
use tenant_core::TenantSnapshot;

use crate::output;
use crate::tenancy::Tenancy;
use crate::ux_error;

#[derive(Args)]
pub struct ResolveArgs {
    #[arg(help = "Hostname or URL, e.g. https://acme.church-os.com/events?org=<id>")]
    pub target: String,

    #[arg(long, help = "Output as JSON")]
    pub json: bool,

    #[arg(long, default_value_t = 30, help = "Give up after this many seconds")]
    pub timeout: u64,
}

pub async fn run(args: ResolveArgs, tenancy: &Tenancy) -> Result<()> {
    let target = NavigationTarget::parse(&args.target);
    let provider = tenancy.provider(target.clone());

    let deadline = Duration::from_secs(args.timeout);
    let Ok(snapshot) = tokio::time::timeout(deadline, provider.ready()).await else {
        ux_error::resolution_timeout(args.timeout, &args.target).display();
        std::process::exit(1);
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_snapshot(&target, &snapshot);
    }

    if let Some(kind) = snapshot.error_kind {
        let message = snapshot.error_message.as_deref().unwrap_or_default();
        ux_error::resolution_failed(kind, message, tenancy.gate().main_url(), &args.target)
            .display();
        std::process::exit(1);
    }

    Ok(())
}

fn print_snapshot(target: &NavigationTarget, snapshot: &TenantSnapshot) {
    output::header("Tenant Resolution");
    output::field("target", &target.to_string());

    if let Some(kind) = snapshot.error_kind {
        output::field("status", &kind.to_string().red().to_string());
        return;
    }

    output::field("status", &"READY".green().to_string());
    match (&snapshot.display_name, snapshot.tenant_id) {
        (Some(name), Some(id)) => {
            output::field(
                "tenant",
                &format!("{} {}", name, format!("({id})").dimmed()),
            );
        }
        _ => output::field("tenant", &"(platform)".dimmed().to_string()),
    }
    if let Some(mode) = snapshot.access_mode {
        output::field("access mode", &mode.to_string());
    }
    output::field("generation", &snapshot.generation.to_string());
    println!();
    output::success("Tenant context resolved");
}
