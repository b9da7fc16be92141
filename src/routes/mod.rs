// ABOUTME: Route module organization and router assembly for the lifecycle server
// ABOUTME: Adds request ids and tracing spans around every route
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cradle Health

//! Route module
//!
//! Each domain module exposes a `XRoutes::routes(resources)` constructor;
//! [`build_router`] merges them and applies the shared middleware stack.

/// Health check route
pub mod health;

/// Export and erasure endpoint
pub mod user_data;

pub use health::HealthRoutes;
pub use user_data::UserDataRoutes;

use crate::constants::http;
use crate::resources::ServerResources;
use axum::http::HeaderName;
use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

/// Assemble every route with the shared middleware stack
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let request_id = HeaderName::from_static(http::REQUEST_ID_HEADER);

    Router::new()
        .merge(UserDataRoutes::routes(resources.clone()))
        .merge(HealthRoutes::routes(resources))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(request_id)),
        )
}
