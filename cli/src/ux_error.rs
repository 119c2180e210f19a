use colored::Colorize;
use errors::ResolutionErrorKind;

#[derive(Debug)]
pub struct UxError {
    pub what: String,
    pub why: Option<String>,
    pub how_to_fix: Vec<String>,
    pub suggested_command: Option<String>,
}

impl UxError {
    pub fn new(what: impl Into<String>) -> Self {
        Self {
            what: what.into(),
            why: None,
            how_to_fix: Vec::new(),
            suggested_command: None,
        }
    }

    pub fn why(mut self, reason: impl Into<String>) -> Self {
        self.why = Some(reason.into());
        self
    }

    pub fn fix(mut self, suggestion: impl Into<String>) -> Self {
        self.how_to_fix.push(suggestion.into());
        self
    }

    pub fn suggest(mut self, cmd: impl Into<String>) -> Self {
        self.suggested_command = Some(cmd.into());
        self
    }

    pub fn display(&self) {
        eprintln!();
        eprintln!("{} {}", "error:".red().bold(), self.what.white().bold());

        if let Some(why) = &self.why {
            eprintln!("       {}", why.dimmed());
        }

        if !self.how_to_fix.is_empty() {
            eprintln!();
            eprintln!("{}", "How to fix:".yellow().bold());
            for (i, fix) in self.how_to_fix.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, fix);
            }
        }

        if let Some(cmd) = &self.suggested_command {
            eprintln!();
            eprintln!("{}", "Try this:".green().bold());
            eprintln!("  $ {}", cmd.cyan());
        }
        eprintln!();
    }
}

impl std::fmt::Display for UxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.what)
    }
}

impl std::error::Error for UxError {}

pub fn config_error(message: &str) -> UxError {
    UxError::new(format!("Configuration error: {}", message))
        .why("The configuration file or a CHURCHOS_* variable is invalid")
        .fix("Check the file passed with --config (TOML or YAML)")
        .fix("Unset CHURCHOS_* variables you did not mean to set")
        .suggest("churchos classify church-os.com")
}

/// Diagnostic for a failed resolution; every kind gets a way forward.
pub fn resolution_failed(
    kind: ResolutionErrorKind,
    message: &str,
    main_url: &str,
    target: &str,
) -> UxError {
    let error = UxError::new(message.to_string()).why(format!("Resolution ended in {}", kind));

    match kind {
        ResolutionErrorKind::InvalidHost => error
            .fix("Use a hostname under one of the configured domains")
            .fix("Pass --development to enable the first-label fallback")
            .suggest(format!("churchos classify {}", target)),
        ResolutionErrorKind::TenantNotFound => error
            .fix("Check the organization's subdomain or custom domain registration")
            .fix(format!("Or start from the main site: {}", main_url)),
        ResolutionErrorKind::TenantDisabled => error
            .fix("Enable the organization's website in its settings")
            .fix(format!("Or start from the main site: {}", main_url)),
        ResolutionErrorKind::LookupFailed => error
            .fix("Check that the tenant store is reachable")
            .suggest(format!("churchos resolve {}", target)),
    }
}

pub fn resolution_timeout(seconds: u64, target: &str) -> UxError {
    UxError::new(format!("Tenant resolution did not finish within {}s", seconds))
        .why("The tenant store is slow or unreachable")
        .fix("Check the store URL and network connectivity")
        .suggest(format!("churchos resolve {} --timeout {}", target, seconds * 2))
}
