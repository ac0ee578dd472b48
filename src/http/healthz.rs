//! `/healthz` endpoint.
//!
//! # Responsibilities
//! - Mount named checks on a caller-supplied `axum::Router`
//! - `GET /healthz` runs every check; 200 "ok" or 500 with a per-check report
//! - `GET /healthz?verbose` reports every check even when all pass
//! - `GET /healthz/{name}` runs a single check
//!
//! # Design Decisions
//! - Handlers share only the immutable check list, so concurrent probes
//!   need no locking
//! - Failure bodies always carry the cause text for the operator
//! - Checks run in mount order; `ping` is always first

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::fmt::Write;
use std::sync::Arc;

use crate::health::{HealthzCheck, PingCheck};

/// `?verbose` turns the report on; its value is ignored.
#[derive(Debug, Default, Deserialize)]
struct HealthzQuery {
    verbose: Option<String>,
}

#[derive(Clone)]
struct HealthzState {
    checks: Arc<Vec<Arc<dyn HealthzCheck>>>,
}

/// Routes serving `checks` (plus the built-in `ping`).
pub fn healthz_router(checks: Vec<Arc<dyn HealthzCheck>>) -> Router {
    let mut all: Vec<Arc<dyn HealthzCheck>> = Vec::with_capacity(checks.len() + 1);
    all.push(Arc::new(PingCheck));
    all.extend(checks);

    let state = HealthzState {
        checks: Arc::new(all),
    };

    Router::new()
        .route("/healthz", get(healthz_all))
        .route("/healthz/{name}", get(healthz_one))
        .with_state(state)
}

/// Mount the healthz routes on an existing router.
pub fn install_handler(router: Router, checks: Vec<Arc<dyn HealthzCheck>>) -> Router {
    router.merge(healthz_router(checks))
}

async fn healthz_all(State(state): State<HealthzState>, Query(query): Query<HealthzQuery>) -> Response {
    let verbose = query.verbose.is_some();

    let mut report = String::new();
    let mut failed = false;
    for check in state.checks.iter() {
        match check.check().await {
            Ok(()) => {
                let _ = writeln!(report, "[+]{} ok", check.name());
            }
            Err(e) => {
                failed = true;
                let _ = writeln!(report, "[-]{} failed: {}", check.name(), e);
            }
        }
    }

    if failed {
        tracing::info!(report = %report.trim_end(), "healthz check failed");
        report.push_str("healthz check failed");
        return text(StatusCode::INTERNAL_SERVER_ERROR, report);
    }
    if verbose {
        report.push_str("healthz check passed");
        return text(StatusCode::OK, report);
    }
    text(StatusCode::OK, "ok".to_string())
}

async fn healthz_one(State(state): State<HealthzState>, Path(name): Path<String>) -> Response {
    let Some(check) = state.checks.iter().find(|c| c.name() == name) else {
        return text(StatusCode::NOT_FOUND, format!("no health check named {name:?}"));
    };

    match check.check().await {
        Ok(()) => text(StatusCode::OK, "ok".to_string()),
        Err(e) => text(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("internal server error: {e}"),
        ),
    }
}

fn text(status: StatusCode, body: String) -> Response {
    let mut response = (status, body).into_response();
    response.headers_mut().insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    response
}
