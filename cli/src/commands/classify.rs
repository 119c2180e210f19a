use anyhow::Result;
use clap::Args;
use colored::Colorize;
use config::TenancyConfig;
use context::{HostnameClassifier, NavigationTarget, ResolutionTarget};

use crate::output;

#[derive(Args)]
pub struct ClassifyArgs {
    #[arg(help = "Hostname or URL; scheme, port and path are accepted")]
    pub target: String,

    #[arg(long, help = "Output as JSON")]
    pub json: bool,
}

pub fn run(args: ClassifyArgs, config: &TenancyConfig) -> Result<()> {
    let classifier = HostnameClassifier::new(&config.domains);
    let target = NavigationTarget::parse(&args.target);
    let verdict = classifier.classify(&target.hostname);
    let tenant_override = target.tenant_override();
    let plan = ResolutionTarget::plan(&classifier, &target);

    if args.json {
        let output = serde_json::json!({
            "hostname": target.hostname,
            "verdict": verdict,
            "override": tenant_override.map(|o| serde_json::json!({
                "id": o.id,
                "source": o.source.to_string()
            })),
            "lookup": plan.verdict,
            "accessMode": plan.access_mode
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    output::header("Hostname Classification");
    output::field("hostname", &target.hostname);
    output::field("verdict", &verdict.to_string().cyan().to_string());
    match tenant_override {
        Some(o) => {
            let source = format!("({})", o.source).dimmed();
            output::field("override", &format!("{} {}", o.id, source));
        }
        None => output::field("override", &"(none)".dimmed().to_string()),
    }
    output::field("lookup", &plan.verdict.to_string());
    output::field("access mode", &plan.access_mode.to_string());

    Ok(())
}
