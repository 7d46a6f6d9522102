// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the contact relay.
//!
//! A submission walks a fixed pipeline and stops at the first failure:
//! rate limit, JSON parse, honeypot, validation, delivery configuration,
//! then a single send attempt. Honeypot hits get the same response as a
//! delivered message so bots learn nothing.

use crate::config::Config;
use crate::error::{ContactError, DELIVERY_MESSAGE};
use crate::honeypot;
use crate::limiter::{RateLimitResult, RateLimiter};
use crate::mailer::{compose, Mailer};
use crate::metrics::{Metrics, Outcome};
use crate::validator;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

/// Header carrying the original client address when behind a proxy.
pub const FORWARDED_FOR: &str = "x-forwarded-for";

/// Client key used when no forwarded address is available.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Shared application state.
pub struct AppState {
    pub limiter: RateLimiter,
    pub mailer: Arc<dyn Mailer>,
    pub config: Config,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(config: Config, mailer: Arc<dyn Mailer>) -> Result<Self, prometheus::Error> {
        Ok(Self {
            limiter: RateLimiter::new(config.rate_limit.clone()),
            mailer,
            metrics: Metrics::new()?,
            config,
        })
    }
}

/// Body of every successful submission, spam included.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// How an accepted submission was disposed of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Accepted {
    Sent,
    Spam,
}

/// Rate limiting key: first entry of `X-Forwarded-For`, trimmed.
pub fn client_key(headers: &HeaderMap) -> String {
    headers
        .get(FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/api/contact", post(contact))
        .route("/health", get(health))
        .route("/healthz", get(health));

    if state.config.metrics.enabled {
        app = app.route(&state.config.metrics.path, get(metrics));
    }

    if let Some(cors) = cors_layer(&state.config.cors_origins) {
        app = app.layer(cors);
    }

    app.layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring unparsable CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return None;
    }
    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::POST])
            .allow_headers([header::CONTENT_TYPE]),
    )
}

fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    error!("Contact handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(crate::error::ErrorResponse {
            error: DELIVERY_MESSAGE.to_string(),
        }),
    )
        .into_response()
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "contact-relay",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Prometheus text exposition.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    state
        .metrics
        .set_tracked_clients(state.limiter.tracked_clients().await);

    match state.metrics.render() {
        Ok(body) => ([(header::CONTENT_TYPE, state.metrics.content_type())], body).into_response(),
        Err(err) => {
            error!(?err, "Failed to encode prometheus metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "metric encode error").into_response()
        }
    }
}

/// `POST /api/contact`
///
/// The body is taken as raw bytes so the rate limit is checked before any
/// parsing work is done.
pub async fn contact(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let client = client_key(&headers);

    match submit(&state, &client, &body).await {
        Ok(accepted) => {
            state.metrics.record(match accepted {
                Accepted::Sent => Outcome::Sent,
                Accepted::Spam => Outcome::Spam,
            });
            Json(SuccessResponse { success: true }).into_response()
        }
        Err(err) => {
            log_rejection(&client, &err);
            state.metrics.record(err.outcome());
            err.into_response()
        }
    }
}

async fn submit(state: &AppState, client: &str, body: &[u8]) -> Result<Accepted, ContactError> {
    if let RateLimitResult::Limited { retry_after } = state.limiter.check(client).await {
        return Err(ContactError::RateLimited { retry_after });
    }

    let payload: Value = serde_json::from_slice(body)?;

    if honeypot::is_spam(&payload) {
        info!(%client, "Honeypot triggered, discarding submission");
        return Ok(Accepted::Spam);
    }

    let message = validator::validate(&payload)?;
    let settings = state.config.mail.delivery_settings()?;
    let mail = compose(&message, &settings)?;

    state.mailer.send(&settings, mail).await?;
    info!(
        %client,
        has_company = message.company.is_some(),
        "Contact message delivered"
    );
    Ok(Accepted::Sent)
}

fn log_rejection(client: &str, err: &ContactError) {
    match err {
        ContactError::RateLimited { retry_after } => {
            info!(%client, retry_after_secs = retry_after.as_secs(), "Submission rate limited");
        }
        ContactError::InvalidBody(_) | ContactError::Validation(_) => {
            debug!(%client, error = %err, "Submission rejected");
        }
        ContactError::Configuration(_) | ContactError::Delivery(_) => {
            error!(%client, error = %err, "Contact form error");
        }
    }
}
