use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::QueryRejection, Query, Request, State},
    http::HeaderMap,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use log::{error, info, warn};
use serde::Serialize;

use crate::auth;
use crate::config::Config;
use crate::error::UpdateError;
use crate::provider::DnsProvider;
use crate::request::{UpdateQuery, UpdateRequest};
use crate::updater::{RecordUpdater, UpdateOutcome};

pub struct AppState {
    pub config: Arc<Config>,
    pub updater: RecordUpdater,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse {
    success: bool,
    message: String,
}

impl ApiResponse {
    pub fn failure(message: String) -> Self {
        Self {
            success: false,
            message,
        }
    }
}

pub fn create_router(config: Arc<Config>, provider: Arc<dyn DnsProvider>) -> Router {
    let state = Arc::new(AppState {
        config,
        updater: RecordUpdater::new(provider),
    });

    Router::new()
        .route("/nic/update", get(nic_update))
        .route("/health", get(health_check))
        .layer(middleware::from_fn_with_state(state.clone(), access_log))
        .with_state(state)
}

async fn access_log(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    let start = Instant::now();

    // Extract request info
    let method = request.method().clone();
    let uri = request.uri();
    let path = match uri.query() {
        Some(q) => format!("{}?{}", uri.path(), q),
        None => uri.path().to_string(),
    };
    let user_agent = request
        .headers()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let ip = request
        .headers()
        .get(state.config.server.origin_ip_header.as_str())
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    // Process request
    let response = next.run(request).await;

    // Extract response info
    let status = response.status().as_u16();
    let length = response
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    let duration = start.elapsed();

    // Access log format: method path "user-agent" ip status length duration
    info!(
        target: "access",
        "{} {} \"{}\" {} {} {} {:.3}ms",
        method, path, user_agent, ip, status, length, duration.as_secs_f64() * 1000.0
    );

    response
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok"
    }))
}

async fn nic_update(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Response {
    if let Err(e) = auth::authorize(&headers, &state.config) {
        warn!("Incorrect login: {}", e);
        return e.into_response();
    }

    let origin_header = state.config.server.origin_ip_header.as_str();
    let req = query
        .map_err(|e| UpdateError::MalformedRequest(e.body_text()))
        .and_then(|Query(pairs)| {
            UpdateRequest::parse(UpdateQuery::from_pairs(pairs), &headers, origin_header)
        });
    let req = match req {
        Ok(req) => req,
        Err(e) => {
            match &e {
                UpdateError::MissingAddress(_) => error!("Error processing request: {}", e),
                _ => warn!("Error processing request: {}", e),
            }
            return e.into_response();
        }
    };

    if req.origin_missing {
        error!(
            "{} header not set, check the reverse proxy configuration",
            origin_header
        );
    }

    let outcome = state.updater.update(&req.hostname, req.ip).await;
    let message = outcome.message(&req.hostname, req.ip);
    match &outcome {
        UpdateOutcome::Updated | UpdateOutcome::Unchanged => info!("{}", message),
        UpdateOutcome::BadRequest(_) | UpdateOutcome::NotFound(_) => warn!("{}", message),
        UpdateOutcome::InternalError(_) => error!("DNS update failed: {}", message),
    }

    let status = outcome.status();
    match outcome {
        UpdateOutcome::Unchanged => status.into_response(),
        UpdateOutcome::Updated => (
            status,
            Json(ApiResponse {
                success: true,
                message,
            }),
        )
            .into_response(),
        _ => (status, Json(ApiResponse::failure(message))).into_response(),
    }
}
