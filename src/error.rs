// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for the contact endpoint.
//!
//! Every way a submission can fail ends up here, and every variant maps to
//! one fixed client-facing message. Internal detail stays in the logs.

use crate::config::ConfigError;
use crate::mailer::DeliveryError;
use crate::metrics::Outcome;
use crate::validator::ValidationError;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

pub const RATE_LIMITED_MESSAGE: &str = "Too many requests. Please try again later.";
pub const CONFIGURATION_MESSAGE: &str = "Server configuration error. Please try again later.";
pub const DELIVERY_MESSAGE: &str = "Failed to send message. Please try again later.";

/// Application error types
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("Rate limit exceeded, retry in {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("Malformed JSON body: {0}")]
    InvalidBody(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Delivery configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ContactError {
    pub fn status(&self) -> StatusCode {
        match self {
            ContactError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ContactError::InvalidBody(_) | ContactError::Validation(_) => StatusCode::BAD_REQUEST,
            ContactError::Configuration(_) | ContactError::Delivery(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The message shown to the submitter.
    pub fn public_message(&self) -> String {
        match self {
            ContactError::RateLimited { .. } => RATE_LIMITED_MESSAGE.to_string(),
            ContactError::InvalidBody(_) => ValidationError::InvalidBody.to_string(),
            ContactError::Validation(err) => err.to_string(),
            ContactError::Configuration(_) => CONFIGURATION_MESSAGE.to_string(),
            ContactError::Delivery(_) => DELIVERY_MESSAGE.to_string(),
        }
    }

    pub fn outcome(&self) -> Outcome {
        match self {
            ContactError::RateLimited { .. } => Outcome::RateLimited,
            ContactError::InvalidBody(_) => Outcome::InvalidBody,
            ContactError::Validation(ValidationError::InvalidBody) => Outcome::InvalidBody,
            ContactError::Validation(_) => Outcome::Invalid,
            ContactError::Configuration(_) => Outcome::ConfigError,
            ContactError::Delivery(_) => Outcome::DeliveryFailed,
        }
    }
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorResponse {
            error: self.public_message(),
        });

        if let ContactError::RateLimited { retry_after } = self {
            // Round up so clients never retry a moment too early.
            let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            return (status, [(header::RETRY_AFTER, secs.to_string())], body).into_response();
        }
        (status, body).into_response()
    }
}
