// ABOUTME: Configuration module root
// ABOUTME: Re-exports the environment-driven lifecycle configuration types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cradle Health

/// Environment variable parsing and validation
pub mod environment;

pub use environment::{BackendConfig, GrantMatch, LifecycleConfig, LifecycleOptions, PageSizes};
