// ABOUTME: Strategies deciding whether a stored file belongs to a given owner
// ABOUTME: Keeps permission-string heuristics out of the pagination logic
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cradle Health

use crate::config::GrantMatch;
use crate::models::{OwnerId, StoredFile};
use std::sync::Arc;

/// Decides file ownership from its access-control grants
pub trait OwnershipPolicy: Send + Sync {
    /// True when any grant on `file` refers to `owner`
    fn has_owner_grant(&self, file: &StoredFile, owner: &OwnerId) -> bool;
}

/// Matches when the owner id occurs anywhere inside a permission entry
///
/// Note that an owner `u1` also matches grants for `u10`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringGrantPolicy;

impl OwnershipPolicy for SubstringGrantPolicy {
    fn has_owner_grant(&self, file: &StoredFile, owner: &OwnerId) -> bool {
        file.permissions
            .iter()
            .any(|grant| grant.contains(owner.as_str()))
    }
}

/// Matches `user:<id>` role tokens exactly, with an optional `/<status>` suffix
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactGrantPolicy;

impl ExactGrantPolicy {
    /// Extract the role inside `action("role")`, or the entry itself when unwrapped
    fn role_of(grant: &str) -> &str {
        grant
            .split_once("(\"")
            .and_then(|(_, rest)| rest.strip_suffix("\")"))
            .unwrap_or(grant)
    }
}

impl OwnershipPolicy for ExactGrantPolicy {
    fn has_owner_grant(&self, file: &StoredFile, owner: &OwnerId) -> bool {
        file.permissions.iter().any(|grant| {
            Self::role_of(grant)
                .strip_prefix("user:")
                .map(|rest| rest.split('/').next().unwrap_or(rest))
                .is_some_and(|id| id == owner.as_str())
        })
    }
}

/// Policy for a configured matching mode
#[must_use]
pub fn policy_for(mode: GrantMatch) -> Arc<dyn OwnershipPolicy> {
    match mode {
        GrantMatch::Substring => Arc::new(SubstringGrantPolicy),
        GrantMatch::Exact => Arc::new(ExactGrantPolicy),
    }
}
