//! Tenant-aware HTTP surface.
//!
//! Every tenant route runs behind [`tenant_context_middleware`], which
//! resolves the request's navigation target and stores the resulting
//! [`TenantSnapshot`] in the request extensions. Handlers only read it.
//! Any path other than `/health`, `/metrics` and `/_tenant` is a tenant
//! page, so `/preview/<id>` and every rendered link reach the gate.

use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{Request, State},
    http::{StatusCode, Uri, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use context::{GateDecision, LinkRewriter, NavigationTarget, Remedy, RouteGate, normalize_hostname};
use errors::ResolutionErrorKind;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use tenant_core::TenantSnapshot;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::tenancy::Tenancy;

const FORWARDED_HOST: &str = "x-forwarded-host";

/// Site navigation rendered on tenant pages.
const NAV_LINKS: [&str; 4] = ["/", "/events", "/sermons", "/give"];

#[derive(Clone)]
pub struct AppState {
    tenancy: Arc<Tenancy>,
    gate: RouteGate,
    metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(tenancy: Tenancy, metrics: Option<PrometheusHandle>) -> Self {
        Self {
            gate: tenancy.gate(),
            tenancy: Arc::new(tenancy),
            metrics,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let tenant_routes = Router::new()
        .route("/", get(page_handler))
        .route("/_tenant", get(tenant_handler))
        .route("/{*path}", get(page_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), tenant_context_middleware));

    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .merge(tenant_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Resolve the tenant for this request and attach the snapshot.
pub async fn tenant_context_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let target = navigation_target(&request);
    debug!("Resolving tenant for {}", target);

    let snapshot = state.tenancy.provider(target).ready().await;
    request.extensions_mut().insert(snapshot);

    next.run(request).await
}

/// `X-Forwarded-Host` (set by the edge proxy) wins over `Host`.
fn navigation_target(request: &Request) -> NavigationTarget {
    let headers = request.headers();
    let host = headers
        .get(FORWARDED_HOST)
        .or_else(|| headers.get(header::HOST))
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(',').next().unwrap_or_default().to_string())
        .or_else(|| request.uri().host().map(str::to_string))
        .unwrap_or_default();

    let mut target =
        NavigationTarget::new(normalize_hostname(&host)).with_path(request.uri().path());
    if let Some(query) = request.uri().query() {
        target = target.with_query(query);
    }
    target
}

async fn tenant_handler(Extension(snapshot): Extension<TenantSnapshot>) -> Json<TenantSnapshot> {
    Json(snapshot)
}

/// Any tenant page, including `/preview/<id>`, renders the gate decision.
async fn page_handler(
    State(state): State<AppState>,
    Extension(snapshot): Extension<TenantSnapshot>,
    uri: Uri,
) -> Response {
    let links: Vec<String> = NAV_LINKS
        .iter()
        .map(|href| LinkRewriter::rewrite(&snapshot, href))
        .collect();

    match state.gate.decide(&snapshot) {
        GateDecision::ServeTenant(scope) => (
            StatusCode::OK,
            Json(json!({
                "status": "tenant",
                "path": uri.path(),
                "tenantId": scope.tenant_id,
                "displayName": snapshot.display_name,
                "accessMode": scope.access_mode,
                "links": links
            })),
        )
            .into_response(),
        GateDecision::ServePlatform => (
            StatusCode::OK,
            Json(json!({
                "status": "platform",
                "path": uri.path(),
                "accessMode": snapshot.access_mode
            })),
        )
            .into_response(),
        GateDecision::Wait => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::RETRY_AFTER, "1")],
            Json(json!({ "status": "pending" })),
        )
            .into_response(),
        GateDecision::Unavailable {
            kind,
            message,
            remedy,
        } => {
            let status = match kind {
                ResolutionErrorKind::LookupFailed => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::NOT_FOUND,
            };
            let remedy = match remedy {
                Remedy::Retry => json!({ "action": "retry" }),
                Remedy::GoToMainDomain { url } => json!({ "action": "main_domain", "url": url }),
            };
            (
                status,
                Json(json!({
                    "status": "unavailable",
                    "error": kind,
                    "message": message,
                    "remedy": remedy
                })),
            )
                .into_response()
        }
    }
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn metrics_handler(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics disabled").into_response(),
    }
}
