// ABOUTME: Security module root
// ABOUTME: Hosts compliance audit logging for data-subject requests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cradle Health

/// Audit events for export and erasure
pub mod audit;
