use metrics::{counter, histogram};
use std::time::Instant;

pub struct Telemetry;

impl Telemetry {
    /// `outcome` is `ready` or the error kind (`TENANT_NOT_FOUND`, ...).
    pub fn record_resolution(outcome: &str) {
        counter!("tenant_resolution_total", "outcome" => outcome.to_string()).increment(1);
    }

    pub fn record_lookup_attempt(field: &str) {
        counter!("tenant_lookup_attempts_total", "field" => field.to_string()).increment(1);
    }

    pub fn record_stale_discard() {
        counter!("tenant_resolution_stale_total").increment(1);
    }

    pub fn record_latency(duration_ms: f64) {
        histogram!("tenant_resolution_duration_ms").record(duration_ms);
    }
}

pub struct ResolutionTimer {
    start: Instant,
}

impl ResolutionTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn finish(self) {
        let duration = self.start.elapsed().as_millis() as f64;
        Telemetry::record_latency(duration);
    }
}

impl Default for ResolutionTimer {
    fn default() -> Self {
        Self::new()
    }
}
