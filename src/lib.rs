// ABOUTME: Main library entry point for the Cradle user-data lifecycle service
// ABOUTME: Provides GDPR-style export and erasure over a hosted document/storage backend
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cradle Health

#![deny(unsafe_code)]

//! # Cradle Lifecycle
//!
//! Serves data-subject requests for the Cradle pregnancy-support app:
//!
//! - **export** ("right of access"): every document the user owns, grouped by
//!   collection, as one JSON download;
//! - **delete** ("right to erasure"): every owned document and file, then the
//!   account itself.
//!
//! ## Architecture
//!
//! - **Backend**: port traits for documents, files, and accounts, with a REST
//!   adapter and an in-memory adapter
//! - **Lifecycle**: cursor-paginated traversal primitives and the two workflows
//! - **Routes**: the HTTP boundary validating configuration, identity, and body
//! - **Security**: audit events for every request
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use cradle_lifecycle::config::LifecycleConfig;
//! use cradle_lifecycle::errors::AppResult;
//! use cradle_lifecycle::lifecycle::DataLifecycleService;
//! use cradle_lifecycle::models::OwnerId;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = LifecycleConfig::from_env()?;
//!     let service = DataLifecycleService::from_config(config, None)?;
//!
//!     let owner = OwnerId::parse("user_123")?;
//!     let bundle = service.export(&owner).await;
//!     println!("{}", bundle.to_pretty_json()?);
//!
//!     Ok(())
//! }
//! ```

/// Backend ports and adapters
pub mod backend;

/// Environment-driven configuration
pub mod config;

/// Application constants and partition catalog
pub mod constants;

/// Unified error handling with HTTP mapping
pub mod errors;

/// Export and erasure workflows
pub mod lifecycle;

/// Tracing subscriber setup
pub mod logging;

/// Core data types
pub mod models;

/// Shared server state and per-request service construction
pub mod resources;

/// `HTTP` routes
pub mod routes;

/// Compliance audit logging
pub mod security;
