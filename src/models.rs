// ABOUTME: Core data types for the lifecycle service: owners, documents, files, partitions
// ABOUTME: Also defines the requested action and per-partition erasure outcomes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cradle Health

use crate::constants::OWNER_FIELD;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Authenticated principal whose data is exported or erased
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Build an owner id, rejecting blank values
    ///
    /// # Errors
    ///
    /// Returns an auth error if the value is empty or whitespace
    pub fn parse(value: &str) -> AppResult<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::auth_required());
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the raw id
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Id reduced to characters safe inside a download filename
    #[must_use]
    pub fn filename_safe(&self) -> String {
        self.0
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A database record, kept as the backend returned it
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Unique record id (`$id`)
    pub id: String,
    /// Full record body, including system attributes
    pub body: Map<String, Value>,
}

impl Document {
    /// Build a document from a raw JSON object; `None` when the object has no `$id`
    #[must_use]
    pub fn from_json(body: Map<String, Value>) -> Option<Self> {
        let id = body.get("$id")?.as_str()?.to_owned();
        Some(Self { id, body })
    }

    /// Owner recorded on the document, if any
    #[must_use]
    pub fn owner(&self) -> Option<&str> {
        self.body.get(OWNER_FIELD).and_then(Value::as_str)
    }
}

impl Serialize for Document {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.body.serialize(serializer)
    }
}

/// A file in a storage bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    /// Unique file id
    #[serde(rename = "$id")]
    pub id: String,
    /// Original file name
    #[serde(default)]
    pub name: String,
    /// Access-control grants, e.g. `read("user:abc")`
    #[serde(rename = "$permissions", default)]
    pub permissions: Vec<String>,
}

/// One collection holding user documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionPartition {
    /// Human-readable key used in the export bundle
    pub key: String,
    /// Backend collection id
    pub collection_id: String,
}

/// One bucket holding user files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketPartition {
    /// Human-readable key used in logs and reports
    pub key: String,
    /// Backend bucket id
    pub bucket_id: String,
}

/// Operation requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    /// Right of access: download everything
    Export,
    /// Right to erasure: delete everything, then the account
    Delete,
}

impl LifecycleAction {
    /// Wire name of the action
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Export => "export",
            Self::Delete => "delete",
        }
    }
}

impl FromStr for LifecycleAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "export" => Ok(Self::Export),
            "delete" => Ok(Self::Delete),
            other => Err(AppError::invalid_input(format!(
                "Invalid action '{other}'. Expected 'export' or 'delete'."
            ))),
        }
    }
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of partition an outcome refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionKind {
    /// Document collection
    Collection,
    /// Storage bucket
    Bucket,
}

/// How a partition traversal ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PartitionStatus {
    /// Reached an empty page
    Completed,
    /// Partition id was blank; nothing attempted
    Skipped,
    /// A fetch or delete failed; later pages were not attempted
    Halted {
        /// Failure description for logs and audit
        reason: String,
    },
}

/// Result of erasing one partition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionOutcome {
    /// Partition key
    pub key: String,
    /// Collection or bucket
    pub kind: PartitionKind,
    /// Pages fetched, including the final empty one
    pub pages: usize,
    /// Items deleted successfully
    pub deleted: usize,
    /// Final state
    #[serde(flatten)]
    pub status: PartitionStatus,
}

impl PartitionOutcome {
    /// Whether traversal stopped because of a failure
    #[must_use]
    pub const fn is_halted(&self) -> bool {
        matches!(self.status, PartitionStatus::Halted { .. })
    }
}

/// Outcomes of every partition touched by one erasure
#[derive(Debug, Clone, Default, Serialize)]
pub struct ErasureReport {
    /// One entry per collection and bucket
    pub partitions: Vec<PartitionOutcome>,
}

impl ErasureReport {
    /// Total items deleted across partitions
    #[must_use]
    pub fn total_deleted(&self) -> usize {
        self.partitions.iter().map(|p| p.deleted).sum()
    }

    /// Partitions that did not finish
    pub fn halted(&self) -> impl Iterator<Item = &PartitionOutcome> {
        self.partitions.iter().filter(|p| p.is_halted())
    }

    /// True when every partition completed or was skipped
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.halted().next().is_none()
    }
}
