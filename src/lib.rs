// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Relay
//!
//! This crate provides the server side of the secforit.ro contact form:
//! a single `POST /api/contact` endpoint that screens submissions and
//! relays the accepted ones to the contact inbox over SMTP.
//!
//! - Per-client fixed-window rate limiting (5 per 15 minutes default)
//! - Honeypot spam trap with silent success
//! - Field validation and angle-bracket sanitizing
//! - Plain-text + HTML email with reply-to set to the submitter

pub mod config;
pub mod error;
pub mod handlers;
pub mod honeypot;
pub mod limiter;
pub mod mailer;
pub mod metrics;
pub mod validator;

pub use config::Config;
pub use error::ContactError;
pub use handlers::{router, AppState};
pub use limiter::{RateLimitResult, RateLimiter};
pub use mailer::{Mailer, RecordingMailer, SmtpMailer};
pub use validator::{ContactMessage, ValidationError};
