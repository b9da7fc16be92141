// ABOUTME: Unified error type for the lifecycle service with error codes and HTTP mapping
// ABOUTME: Renders every failure as the `{success:false, error}` JSON envelope callers expect
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cradle Health

//! # Error Handling
//!
//! Every fallible operation in the crate returns [`AppResult`]. An [`AppError`]
//! carries a stable [`ErrorCode`] that decides the HTTP status, and a message
//! that is safe to show to the caller.
//!
//! Backend failures are raised as [`ErrorCode::ExternalService`] and are
//! normally absorbed by the traversal primitives; only pre-flight failures and
//! critical erasure failures ever reach a response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result alias used throughout the crate
pub type AppResult<T> = Result<T, AppError>;

/// Stable error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// One or more required settings are absent
    ConfigMissing,
    /// A setting is present but cannot be parsed
    ConfigInvalid,
    /// Caller identity could not be resolved
    AuthRequired,
    /// Request body or parameters are malformed
    InvalidInput,
    /// A backend call failed (network, non-2xx, undecodable body)
    ExternalService,
    /// Unexpected internal failure
    Internal,
    /// Failure that leaves user data in a state requiring manual intervention
    CriticalFailure,
}

impl ErrorCode {
    /// HTTP status this code maps to
    #[must_use]
    pub const fn http_status(self) -> StatusCode {
        match self {
            Self::AuthRequired => StatusCode::UNAUTHORIZED,
            Self::InvalidInput => StatusCode::BAD_REQUEST,
            Self::ExternalService => StatusCode::BAD_GATEWAY,
            Self::ConfigMissing | Self::ConfigInvalid | Self::Internal | Self::CriticalFailure => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ConfigMissing => "config_missing",
            Self::ConfigInvalid => "config_invalid",
            Self::AuthRequired => "auth_required",
            Self::InvalidInput => "invalid_input",
            Self::ExternalService => "external_service",
            Self::Internal => "internal",
            Self::CriticalFailure => "critical_failure",
        };
        f.write_str(name)
    }
}

/// Application error with a code and a caller-facing message
#[derive(Debug, Clone, Error)]
#[error("{code}: {message}")]
pub struct AppError {
    /// Classification of the failure
    pub code: ErrorCode,
    /// Human-readable message, returned verbatim in the response body
    pub message: String,
}

impl AppError {
    /// Create an error from a code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Required configuration values are missing
    #[must_use]
    pub fn config_missing(names: &[String]) -> Self {
        Self::new(
            ErrorCode::ConfigMissing,
            format!(
                "Server configuration error: missing variables: {}",
                names.join(", ")
            ),
        )
    }

    /// A configuration value is malformed
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalid, message)
    }

    /// Caller identity is absent
    #[must_use]
    pub fn auth_required() -> Self {
        Self::new(ErrorCode::AuthRequired, "Authentication required.")
    }

    /// Malformed input from the caller
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// A backend service call failed
    pub fn external_service(service: &str, message: impl fmt::Display) -> Self {
        Self::new(ErrorCode::ExternalService, format!("{service}: {message}"))
    }

    /// Unexpected internal failure
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    /// Failure requiring manual intervention
    pub fn critical(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::CriticalFailure, message)
    }

    /// HTTP status for this error
    #[must_use]
    pub const fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }
}

/// JSON envelope for failed responses
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Always `false`
    pub success: bool,
    /// Caller-facing message
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: self.message,
        };
        (self.code.http_status(), Json(body)).into_response()
    }
}
