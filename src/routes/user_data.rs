// ABOUTME: HTTP entry point for data-subject requests (export and account erasure)
// ABOUTME: Validates configuration, caller identity, and body before running a workflow
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cradle Health

//! User data routes
//!
//! A single POST endpoint accepts `{"action": "export" | "delete"}`. Checks run
//! in a fixed order and each failure has its own status:
//!
//! | Check | Status |
//! |---|---|
//! | required configuration present | 500 |
//! | caller identity header present | 401 |
//! | body within size limit | 400 |
//! | body is JSON | 400 |
//! | action is known | 400 |
//!
//! Workflow failures are logged in full and answered with a generic message.

use crate::constants::http;
use crate::errors::{AppError, AppResult};
use crate::lifecycle::DataLifecycleService;
use crate::models::{LifecycleAction, OwnerId};
use crate::resources::ServerResources;
use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

const EXPORT_FAILED: &str = "Failed to export data. Please try again later.";
const DELETE_FAILED: &str = "Failed to completely delete account. Please contact support.";
const DELETE_SUCCEEDED: &str = "Account and all data permanently deleted.";

/// Successful erasure response
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    /// Always `true`
    pub success: bool,
    /// Confirmation shown to the user
    pub message: String,
}

/// User data routes
pub struct UserDataRoutes;

impl UserDataRoutes {
    /// Create all user data routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/", post(Self::handle_request))
            .route("/api/user-data", post(Self::handle_request))
            .with_state(resources)
    }

    /// Resolve the caller from the identity header set by the function runtime
    fn authenticate(headers: &HeaderMap) -> AppResult<OwnerId> {
        let value = headers
            .get(http::USER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(AppError::auth_required)?;
        OwnerId::parse(value)
    }

    /// Buffer the request body, rejecting anything over the size limit
    async fn read_body(body: Body) -> AppResult<Bytes> {
        to_bytes(body, http::MAX_BODY_BYTES).await.map_err(|e| {
            warn!(error = %e, limit = http::MAX_BODY_BYTES, "Rejected user data request body");
            AppError::invalid_input(format!(
                "Request body exceeds {} bytes.",
                http::MAX_BODY_BYTES
            ))
        })
    }

    /// Parse `{"action": ...}` from the raw body
    fn parse_action(body: &[u8]) -> AppResult<LifecycleAction> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|_| AppError::invalid_input("Invalid request body."))?;

        match value.get("action") {
            Some(Value::String(action)) => action.parse(),
            Some(other) => Err(AppError::invalid_input(format!(
                "Invalid action '{other}'. Expected 'export' or 'delete'."
            ))),
            None => Err(AppError::invalid_input(
                "Missing action. Expected 'export' or 'delete'.",
            )),
        }
    }

    /// Handle a data-subject request
    async fn handle_request(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Body,
    ) -> Result<Response, AppError> {
        let service = resources.lifecycle.lifecycle().inspect_err(|e| {
            error!(error = %e, "Lifecycle service configuration rejected");
        })?;
        let owner = Self::authenticate(&headers).inspect_err(|_| {
            warn!("Rejected user data request without caller identity");
        })?;
        let body = Self::read_body(body).await?;
        let action = Self::parse_action(&body)?;

        info!(owner_id = %owner, action = %action, "Processing user data request");
        match action {
            LifecycleAction::Export => Self::handle_export(&service, &owner).await,
            LifecycleAction::Delete => Self::handle_delete(&service, &owner).await,
        }
    }

    async fn handle_export(service: &DataLifecycleService, owner: &OwnerId) -> AppResult<Response> {
        let bundle = service.export(owner).await;
        let body = bundle.to_pretty_json().map_err(|e| {
            error!(owner_id = %owner, error = %e, "Data export failed");
            AppError::internal(EXPORT_FAILED)
        })?;

        let disposition = format!(
            "attachment; filename=\"{}_{}.json\"",
            http::EXPORT_FILENAME_PREFIX,
            owner.filename_safe()
        );
        Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/json".to_owned()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            body,
        )
            .into_response())
    }

    async fn handle_delete(service: &DataLifecycleService, owner: &OwnerId) -> AppResult<Response> {
        match service.erase(owner).await {
            Ok(report) => {
                info!(
                    owner_id = %owner,
                    deleted = report.total_deleted(),
                    complete = report.is_complete(),
                    "Account erasure finished"
                );
                Ok((
                    StatusCode::OK,
                    Json(DeleteResponse {
                        success: true,
                        message: DELETE_SUCCEEDED.to_owned(),
                    }),
                )
                    .into_response())
            }
            Err(e) => {
                error!(owner_id = %owner, error = %e, "CRITICAL: account erasure failed");
                Err(AppError::critical(DELETE_FAILED))
            }
        }
    }
}
