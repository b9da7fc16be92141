// ABOUTME: Test helper modules shared by HTTP-level integration tests
// ABOUTME: Axum request driver and a recording stub of the backend REST API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cradle Health

pub mod axum_test;
pub mod backend_stub;
