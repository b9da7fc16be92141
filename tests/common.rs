// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides logging init, in-memory backend fixtures, and service builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cradle Health
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::uninlined_format_args
)]
//! Shared test utilities for `cradle_lifecycle`

use cradle_lifecycle::{
    backend::{BackendCall, InMemoryBackend},
    config::LifecycleOptions,
    constants::{env_config, BUCKET_PARTITIONS, COLLECTION_PARTITIONS, OWNER_FIELD},
    lifecycle::{BackendPorts, DataLifecycleService},
    models::{BucketPartition, CollectionPartition, OwnerId, StoredFile},
    resources::{FixedLifecycleProvider, ServerResources},
    routes::build_router,
};
use serde_json::json;
use std::collections::HashMap;
use std::env;
use std::sync::{Arc, Once};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

pub fn owner(id: &str) -> OwnerId {
    OwnerId::parse(id).expect("valid owner id")
}

/// Collections whose backend id equals their key
pub fn collections(keys: &[&str]) -> Vec<CollectionPartition> {
    keys.iter()
        .map(|key| CollectionPartition {
            key: (*key).to_owned(),
            collection_id: (*key).to_owned(),
        })
        .collect()
}

/// Buckets whose backend id equals their key
pub fn buckets(keys: &[&str]) -> Vec<BucketPartition> {
    keys.iter()
        .map(|key| BucketPartition {
            key: (*key).to_owned(),
            bucket_id: (*key).to_owned(),
        })
        .collect()
}

pub fn service_with(
    backend: &InMemoryBackend,
    collection_keys: &[&str],
    bucket_keys: &[&str],
    options: LifecycleOptions,
) -> DataLifecycleService {
    DataLifecycleService::new(
        BackendPorts::shared(backend.clone()),
        collections(collection_keys),
        buckets(bucket_keys),
        options,
    )
}

/// Service over the full production catalog, ids equal to keys
pub fn catalog_service(backend: &InMemoryBackend) -> DataLifecycleService {
    let collection_keys: Vec<&str> = COLLECTION_PARTITIONS.iter().map(|(k, _)| *k).collect();
    let bucket_keys: Vec<&str> = BUCKET_PARTITIONS.iter().map(|(k, _)| *k).collect();
    service_with(
        backend,
        &collection_keys,
        &bucket_keys,
        LifecycleOptions::default(),
    )
}

pub fn router_for(service: DataLifecycleService) -> axum::Router {
    let provider = Arc::new(FixedLifecycleProvider::new(service));
    build_router(Arc::new(ServerResources::new(provider)))
}

/// Insert `count` documents for `owner_id` with ids `{prefix}-{n}`
pub async fn seed_documents(
    backend: &InMemoryBackend,
    collection_id: &str,
    owner_id: &str,
    prefix: &str,
    count: usize,
) -> Vec<String> {
    let mut ids = Vec::with_capacity(count);
    for n in 0..count {
        let id = backend
            .insert_document(
                collection_id,
                json!({ "$id": format!("{prefix}-{n}"), OWNER_FIELD: owner_id, "seq": n }),
            )
            .await
            .expect("insert document");
        ids.push(id);
    }
    ids
}

pub fn file_owned_by(id: &str, owner_id: &str) -> StoredFile {
    StoredFile {
        id: id.to_owned(),
        name: format!("{id}.bin"),
        permissions: vec![
            format!("read(\"user:{owner_id}\")"),
            format!("delete(\"user:{owner_id}\")"),
        ],
    }
}

pub fn deleted_document_ids(calls: &[BackendCall]) -> Vec<String> {
    calls
        .iter()
        .filter_map(|call| match call {
            BackendCall::DeleteDocument {
                document_id,
                ok: true,
                ..
            } => Some(document_id.clone()),
            _ => None,
        })
        .collect()
}

pub fn deleted_file_ids(calls: &[BackendCall]) -> Vec<String> {
    calls
        .iter()
        .filter_map(|call| match call {
            BackendCall::DeleteFile {
                file_id, ok: true, ..
            } => Some(file_id.clone()),
            _ => None,
        })
        .collect()
}

pub fn file_list_cursors(calls: &[BackendCall], bucket: &str) -> Vec<Option<String>> {
    calls
        .iter()
        .filter_map(|call| match call {
            BackendCall::ListFiles {
                bucket_id, cursor, ..
            } if bucket_id == bucket => Some(cursor.clone()),
            _ => None,
        })
        .collect()
}

pub fn count_calls(calls: &[BackendCall], pred: impl Fn(&BackendCall) -> bool) -> usize {
    calls.iter().filter(|c| pred(c)).count()
}

/// Every required variable with a plausible value
pub fn complete_env_vars() -> HashMap<String, String> {
    let mut vars = HashMap::new();
    vars.insert(
        env_config::ENDPOINT.to_owned(),
        "https://backend.example.test/v1/".to_owned(),
    );
    vars.insert(env_config::PROJECT_ID.to_owned(), "cradle".to_owned());
    vars.insert(env_config::API_KEY.to_owned(), "secret-key".to_owned());
    vars.insert(env_config::DATABASE_ID.to_owned(), "main".to_owned());
    for (key, var) in COLLECTION_PARTITIONS.iter().chain(BUCKET_PARTITIONS) {
        vars.insert((*var).to_owned(), format!("{key}_id"));
    }
    vars
}
