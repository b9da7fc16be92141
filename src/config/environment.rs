// ABOUTME: Environment-based configuration for the lifecycle service
// ABOUTME: Collects every missing variable before failing so operators fix them in one pass
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cradle Health

//! Environment-only configuration.
//!
//! The function runtime injects settings as process environment variables. They
//! are read on every invocation so a redeploy with new variables never needs a
//! restart. [`LifecycleConfig::from_lookup`] takes any lookup function, which
//! keeps tests away from the real process environment.

use crate::constants::{defaults, env_config, BUCKET_PARTITIONS, COLLECTION_PARTITIONS};
use crate::errors::{AppError, AppResult};
use crate::models::{BucketPartition, CollectionPartition};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Connection settings for the hosted backend
#[derive(Clone)]
pub struct BackendConfig {
    /// REST endpoint including the version path, without trailing slash
    pub endpoint: String,
    /// Project id sent with every call
    pub project_id: String,
    /// Server API key
    pub api_key: String,
    /// Database holding the user collections
    pub database_id: String,
    /// Per-call timeout
    pub timeout: Duration,
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("endpoint", &self.endpoint)
            .field("project_id", &self.project_id)
            .field("api_key", &"[REDACTED]")
            .field("database_id", &self.database_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Page sizes for the three traversals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSizes {
    /// Documents per page while collecting
    pub export: u32,
    /// Documents per page while deleting
    pub delete: u32,
    /// Files per page while scanning buckets
    pub files: u32,
}

impl Default for PageSizes {
    fn default() -> Self {
        Self {
            export: defaults::EXPORT_PAGE_SIZE,
            delete: defaults::DELETE_PAGE_SIZE,
            files: defaults::FILE_PAGE_SIZE,
        }
    }
}

/// How file permissions are matched against the owner
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GrantMatch {
    /// Owner id appears anywhere in a permission entry
    #[default]
    Substring,
    /// A `user:<id>` role token equals the owner id
    Exact,
}

impl FromStr for GrantMatch {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "substring" => Ok(Self::Substring),
            "exact" => Ok(Self::Exact),
            other => Err(AppError::config(format!(
                "{} must be 'substring' or 'exact', got '{other}'",
                env_config::OWNER_GRANT_MATCH
            ))),
        }
    }
}

/// Behavior switches for the workflows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifecycleOptions {
    /// Page sizes
    pub page_sizes: PageSizes,
    /// Keep the account when any partition halted
    pub strict_erasure: bool,
    /// File ownership matching mode
    pub grant_match: GrantMatch,
}

/// Complete per-invocation configuration
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// Backend connection
    pub backend: BackendConfig,
    /// Collections holding user documents, in catalog order
    pub collections: Vec<CollectionPartition>,
    /// Buckets holding user files, in catalog order
    pub buckets: Vec<BucketPartition>,
    /// Workflow options
    pub options: LifecycleOptions,
}

impl LifecycleConfig {
    /// Load from the process environment
    ///
    /// # Errors
    ///
    /// Returns a `ConfigMissing` error naming every absent variable, or a
    /// `ConfigInvalid` error for a malformed optional setting
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load using an arbitrary variable lookup
    ///
    /// Blank values count as missing.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_env`]
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut require = |name: &str| -> String {
            match lookup(name).map(|v| v.trim().to_owned()) {
                Some(value) if !value.is_empty() => value,
                _ => {
                    missing.push(name.to_owned());
                    String::new()
                }
            }
        };

        let endpoint = require(env_config::ENDPOINT);
        let project_id = require(env_config::PROJECT_ID);
        let api_key = require(env_config::API_KEY);
        let database_id = require(env_config::DATABASE_ID);

        let collections: Vec<CollectionPartition> = COLLECTION_PARTITIONS
            .iter()
            .map(|(key, var)| CollectionPartition {
                key: (*key).to_owned(),
                collection_id: require(var),
            })
            .collect();

        let buckets: Vec<BucketPartition> = BUCKET_PARTITIONS
            .iter()
            .map(|(key, var)| BucketPartition {
                key: (*key).to_owned(),
                bucket_id: require(var),
            })
            .collect();

        if !missing.is_empty() {
            return Err(AppError::config_missing(&missing));
        }

        let endpoint = normalize_endpoint(&endpoint)?;
        let timeout_secs = parse_optional(
            &lookup,
            env_config::HTTP_TIMEOUT_SECS,
            defaults::HTTP_TIMEOUT_SECS,
        )?;
        if timeout_secs == 0 {
            return Err(AppError::config(format!(
                "{} must be greater than zero",
                env_config::HTTP_TIMEOUT_SECS
            )));
        }

        let options = LifecycleOptions {
            page_sizes: PageSizes {
                export: parse_page_size(
                    &lookup,
                    env_config::EXPORT_PAGE_SIZE,
                    defaults::EXPORT_PAGE_SIZE,
                )?,
                delete: parse_page_size(
                    &lookup,
                    env_config::DELETE_PAGE_SIZE,
                    defaults::DELETE_PAGE_SIZE,
                )?,
                files: parse_page_size(
                    &lookup,
                    env_config::FILE_PAGE_SIZE,
                    defaults::FILE_PAGE_SIZE,
                )?,
            },
            strict_erasure: parse_flag(&lookup, env_config::STRICT_ERASURE)?,
            grant_match: match lookup(env_config::OWNER_GRANT_MATCH) {
                Some(raw) if !raw.trim().is_empty() => raw.parse()?,
                _ => GrantMatch::default(),
            },
        };

        Ok(Self {
            backend: BackendConfig {
                endpoint,
                project_id,
                api_key,
                database_id,
                timeout: Duration::from_secs(timeout_secs),
            },
            collections,
            buckets,
            options,
        })
    }
}

fn normalize_endpoint(raw: &str) -> AppResult<String> {
    let parsed = Url::parse(raw).map_err(|e| {
        AppError::config(format!("{} is not a valid URL: {e}", env_config::ENDPOINT))
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::config(format!(
            "{} must use http or https",
            env_config::ENDPOINT
        )));
    }
    Ok(raw.trim_end_matches('/').to_owned())
}

fn parse_optional<F, T>(lookup: &F, name: &str, default: T) -> AppResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| AppError::config(format!("{name} is invalid: {e}"))),
        _ => Ok(default),
    }
}

fn parse_page_size<F>(lookup: &F, name: &str, default: u32) -> AppResult<u32>
where
    F: Fn(&str) -> Option<String>,
{
    let size: u32 = parse_optional(lookup, name, default)?;
    if size == 0 || size > defaults::MAX_PAGE_SIZE {
        return Err(AppError::config(format!(
            "{name} must be between 1 and {}",
            defaults::MAX_PAGE_SIZE
        )));
    }
    Ok(size)
}

fn parse_flag<F>(lookup: &F, name: &str) -> AppResult<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name).as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => Ok(false),
        Some(v) => Err(AppError::config(format!(
            "{name} must be true or false, got '{v}'"
        ))),
    }
}
