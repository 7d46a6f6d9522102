// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Relay Service
//!
//! Receives contact form submissions from the website, screens them and
//! forwards accepted messages to the contact inbox by SMTP.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables:
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:3000)
//! - `SMTP_HOST`, `SMTP_PORT`, `SMTP_USER`, `SMTP_PASS`: SMTPS server and login
//! - `SMTP_FROM`: Envelope sender address
//! - `CONTACT_TO`: Inbox receiving the submissions
//! - `SMTP_ACCEPT_INVALID_CERTS`: Accept self-signed certificates (default: false)
//! - `RATE_LIMIT_MAX`: Submissions per window per client (default: 5)
//! - `RATE_LIMIT_WINDOW_SECS`: Window length (default: 900)
//! - `RATE_LIMIT_MAX_CLIENTS`: Tracked client cap (default: 10000)
//! - `CORS_ALLOWED_ORIGINS`: Comma-separated origins allowed to post
//! - `METRICS_ENABLED`: Serve `/metrics` (default: true)
//!
//! Missing SMTP settings do not stop the service from starting; each
//! submission that reaches delivery reports a configuration error instead.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use contact_relay::{config::Config, handlers::router, AppState, SmtpMailer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config = Config::from_env();
    info!(
        bind_addr = %config.bind_addr,
        max_submissions = config.rate_limit.max_submissions,
        window_secs = config.rate_limit.window_secs,
        max_tracked_clients = config.rate_limit.max_tracked_clients,
        cors_origins = ?config.cors_origins,
        "Starting contact relay"
    );
    if let Err(err) = config.mail.delivery_settings() {
        warn!(error = %err, "SMTP delivery is not fully configured; submissions will fail");
    }

    // Create application state
    let state = Arc::new(AppState::new(config.clone(), Arc::new(SmtpMailer::new()))?);

    // Spawn cleanup task
    let cleanup_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(cleanup_state.limiter.config().sweep_interval());
        loop {
            interval.tick().await;
            cleanup_state.limiter.cleanup().await;
            cleanup_state
                .metrics
                .set_tracked_clients(cleanup_state.limiter.tracked_clients().await);
        }
    });

    // Build router
    let app = router(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
