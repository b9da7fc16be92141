// ABOUTME: Tests for environment configuration loading and validation
// ABOUTME: Covers missing-variable reporting, tuning overrides, and ownership policy selection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cradle Health

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]
#![allow(clippy::uninlined_format_args)]

mod common;

use common::{complete_env_vars, file_owned_by, owner};
use cradle_lifecycle::{
    backend::{policy_for, ExactGrantPolicy, OwnershipPolicy, SubstringGrantPolicy},
    config::{GrantMatch, LifecycleConfig, PageSizes},
    constants::{env_config, BUCKET_PARTITIONS, COLLECTION_PARTITIONS},
    errors::{AppError, ErrorCode},
    models::StoredFile,
};
use serial_test::serial;
use std::collections::HashMap;
use std::env;
use std::time::Duration;

fn load(vars: &HashMap<String, String>) -> Result<LifecycleConfig, AppError> {
    LifecycleConfig::from_lookup(|name| vars.get(name).cloned())
}

fn with_var(name: &str, value: &str) -> HashMap<String, String> {
    let mut vars = complete_env_vars();
    vars.insert(name.to_owned(), value.to_owned());
    vars
}

// ============================================================================
// Required variables
// ============================================================================

#[test]
fn test_complete_environment_loads_full_catalog() {
    let config = load(&complete_env_vars()).expect("complete config");

    assert_eq!(config.backend.endpoint, "https://backend.example.test/v1");
    assert_eq!(config.backend.project_id, "cradle");
    assert_eq!(config.backend.database_id, "main");
    assert_eq!(config.backend.timeout, Duration::from_secs(30));

    assert_eq!(config.collections.len(), COLLECTION_PARTITIONS.len());
    assert_eq!(config.collections[0].key, "profile");
    assert_eq!(config.collections[0].collection_id, "profile_id");
    let bucket_keys: Vec<&str> = config.buckets.iter().map(|b| b.key.as_str()).collect();
    assert_eq!(
        bucket_keys,
        vec!["profileImages", "medicalDocuments", "chatAttachments"]
    );

    assert_eq!(config.options.page_sizes, PageSizes::default());
    assert!(!config.options.strict_erasure);
    assert_eq!(config.options.grant_match, GrantMatch::Substring);
}

#[test]
fn test_empty_environment_lists_every_variable_in_order() {
    let err = load(&HashMap::new()).expect_err("nothing configured");

    assert_eq!(err.code, ErrorCode::ConfigMissing);
    let listed = err
        .message
        .strip_prefix("Server configuration error: missing variables: ")
        .expect("message prefix");
    let names: Vec<&str> = listed.split(", ").collect();
    assert_eq!(names.len(), 4 + COLLECTION_PARTITIONS.len() + BUCKET_PARTITIONS.len());
    assert_eq!(names[0], env_config::ENDPOINT);
    assert_eq!(names[4], "PROFILES_COLLECTION_ID");
    assert_eq!(names.last().copied(), Some("CHAT_ATTACHMENTS_BUCKET_ID"));
}

#[test]
fn test_blank_variable_counts_as_missing() {
    let mut vars = complete_env_vars();
    vars.insert("WEIGHT_COLLECTION_ID".to_owned(), "   ".to_owned());
    vars.remove(env_config::API_KEY);

    let err = load(&vars).expect_err("blank and absent values");

    assert_eq!(
        err.message,
        "Server configuration error: missing variables: APPWRITE_API_KEY, WEIGHT_COLLECTION_ID"
    );
    assert_eq!(err.http_status().as_u16(), 500);
}

#[test]
fn test_endpoint_must_be_http_url() {
    for bad in ["not a url", "ftp://backend.example.test/v1"] {
        let err = load(&with_var(env_config::ENDPOINT, bad)).expect_err("bad endpoint");
        assert_eq!(err.code, ErrorCode::ConfigInvalid, "endpoint {bad}");
    }
}

// ============================================================================
// Tuning
// ============================================================================

#[test]
fn test_page_size_overrides() {
    let mut vars = complete_env_vars();
    vars.insert(env_config::EXPORT_PAGE_SIZE.to_owned(), "500".to_owned());
    vars.insert(env_config::DELETE_PAGE_SIZE.to_owned(), " 10 ".to_owned());
    vars.insert(env_config::FILE_PAGE_SIZE.to_owned(), "50".to_owned());

    let config = load(&vars).expect("valid overrides");

    assert_eq!(
        config.options.page_sizes,
        PageSizes {
            export: 500,
            delete: 10,
            files: 50
        }
    );
}

#[test]
fn test_invalid_page_sizes_are_rejected() {
    for bad in ["0", "abc", "-5", "5001"] {
        let err = load(&with_var(env_config::DELETE_PAGE_SIZE, bad)).expect_err("bad page size");
        assert_eq!(err.code, ErrorCode::ConfigInvalid, "page size {bad}");
        assert!(err.message.contains(env_config::DELETE_PAGE_SIZE));
    }
}

#[test]
fn test_timeout_override_and_zero_rejected() {
    let config = load(&with_var(env_config::HTTP_TIMEOUT_SECS, "5")).expect("timeout override");
    assert_eq!(config.backend.timeout, Duration::from_secs(5));

    let err = load(&with_var(env_config::HTTP_TIMEOUT_SECS, "0")).expect_err("zero timeout");
    assert_eq!(err.code, ErrorCode::ConfigInvalid);
}

#[test]
fn test_strict_erasure_flag_values() {
    for (raw, expected) in [("true", true), ("1", true), ("FALSE", false), ("0", false)] {
        let config = load(&with_var(env_config::STRICT_ERASURE, raw)).expect("valid flag");
        assert_eq!(config.options.strict_erasure, expected, "flag {raw}");
    }

    let err = load(&with_var(env_config::STRICT_ERASURE, "maybe")).expect_err("bad flag");
    assert_eq!(err.code, ErrorCode::ConfigInvalid);
}

#[test]
fn test_grant_match_mode() {
    let config = load(&with_var(env_config::OWNER_GRANT_MATCH, "Exact")).expect("exact mode");
    assert_eq!(config.options.grant_match, GrantMatch::Exact);

    let err = load(&with_var(env_config::OWNER_GRANT_MATCH, "fuzzy")).expect_err("bad mode");
    assert_eq!(err.code, ErrorCode::ConfigInvalid);
    assert!(err.message.contains("fuzzy"));
}

#[test]
fn test_backend_config_debug_redacts_api_key() {
    let config = load(&complete_env_vars()).expect("complete config");

    let rendered = format!("{:?}", config.backend);

    assert!(!rendered.contains("secret-key"));
    assert!(rendered.contains("REDACTED"));
}

#[test]
#[serial]
fn test_from_env_reads_process_environment() {
    let vars = complete_env_vars();
    for (name, value) in &vars {
        env::set_var(name, value);
    }
    env::set_var(env_config::STRICT_ERASURE, "true");

    let loaded = LifecycleConfig::from_env();

    for name in vars.keys() {
        env::remove_var(name);
    }
    env::remove_var(env_config::STRICT_ERASURE);

    let config = loaded.expect("environment config");
    assert!(config.options.strict_erasure);
    assert_eq!(config.buckets[2].bucket_id, "chatAttachments_id");
}

// ============================================================================
// Ownership policies
// ============================================================================

#[test]
fn test_substring_policy_matches_any_grant_containing_owner() {
    let file = file_owned_by("f", "u10");

    assert!(SubstringGrantPolicy.has_owner_grant(&file, &owner("u10")));
    assert!(
        SubstringGrantPolicy.has_owner_grant(&file, &owner("u1")),
        "substring matching also claims u10's file for u1"
    );
    assert!(!SubstringGrantPolicy.has_owner_grant(&file, &owner("u2")));
}

#[test]
fn test_exact_policy_matches_role_tokens() {
    let file = StoredFile {
        id: "f".to_owned(),
        name: "scan.pdf".to_owned(),
        permissions: vec![
            "read(\"any\")".to_owned(),
            "update(\"user:u1/verified\")".to_owned(),
        ],
    };

    assert!(ExactGrantPolicy.has_owner_grant(&file, &owner("u1")));
    assert!(!ExactGrantPolicy.has_owner_grant(&file_owned_by("g", "u10"), &owner("u1")));
    assert!(!ExactGrantPolicy.has_owner_grant(&file, &owner("verified")));
}

#[test]
fn test_policy_for_selects_configured_mode() {
    let file = file_owned_by("f", "u10");

    assert!(policy_for(GrantMatch::Substring).has_owner_grant(&file, &owner("u1")));
    assert!(!policy_for(GrantMatch::Exact).has_owner_grant(&file, &owner("u1")));
}
