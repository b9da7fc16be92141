// ABOUTME: Shared server resources and per-request lifecycle service construction
// ABOUTME: The environment provider validates configuration on every invocation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cradle Health

use crate::config::LifecycleConfig;
use crate::errors::{AppError, AppResult};
use crate::lifecycle::DataLifecycleService;
use reqwest::Client;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use std::time::Instant;

/// Builds the lifecycle service for one request
pub trait LifecycleProvider: Send + Sync {
    /// Validate configuration and build a fresh service
    ///
    /// # Errors
    ///
    /// Returns a configuration error when required settings are missing or malformed
    fn lifecycle(&self) -> AppResult<DataLifecycleService>;
}

type Lookup = dyn Fn(&str) -> Option<String> + Send + Sync;

/// Reads configuration from the environment on each call
///
/// The HTTP connection pool is shared; everything else is rebuilt.
pub struct EnvLifecycleProvider {
    lookup: Arc<Lookup>,
    http_client: Client,
}

impl EnvLifecycleProvider {
    /// Provider over the process environment
    ///
    /// # Errors
    ///
    /// Returns an internal error if the HTTP client cannot be built
    pub fn from_process_env() -> AppResult<Self> {
        Self::with_lookup(|name| env::var(name).ok())
    }

    /// Provider over a fixed set of variables
    ///
    /// # Errors
    ///
    /// Returns an internal error if the HTTP client cannot be built
    pub fn from_vars(vars: HashMap<String, String>) -> AppResult<Self> {
        Self::with_lookup(move |name| vars.get(name).cloned())
    }

    /// Provider over an arbitrary lookup
    ///
    /// # Errors
    ///
    /// Returns an internal error if the HTTP client cannot be built
    pub fn with_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        let http_client = Client::builder()
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            lookup: Arc::new(lookup),
            http_client,
        })
    }
}

impl LifecycleProvider for EnvLifecycleProvider {
    fn lifecycle(&self) -> AppResult<DataLifecycleService> {
        let config = LifecycleConfig::from_lookup(|name| (self.lookup)(name))?;
        DataLifecycleService::from_config(config, Some(self.http_client.clone()))
    }
}

/// Always hands out the same service; used for the in-memory backend
pub struct FixedLifecycleProvider {
    service: DataLifecycleService,
}

impl FixedLifecycleProvider {
    /// Wrap a prepared service
    #[must_use]
    pub const fn new(service: DataLifecycleService) -> Self {
        Self { service }
    }
}

impl LifecycleProvider for FixedLifecycleProvider {
    fn lifecycle(&self) -> AppResult<DataLifecycleService> {
        Ok(self.service.clone())
    }
}

/// State shared by every route
pub struct ServerResources {
    /// Per-request service factory
    pub lifecycle: Arc<dyn LifecycleProvider>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl ServerResources {
    /// Create resources around a provider
    #[must_use]
    pub fn new(lifecycle: Arc<dyn LifecycleProvider>) -> Self {
        Self {
            lifecycle,
            started_at: Instant::now(),
        }
    }
}
