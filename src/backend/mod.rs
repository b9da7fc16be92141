// ABOUTME: Backend port traits for documents, files, and accounts used by the lifecycle workflows
// ABOUTME: Concrete adapters live in submodules: Appwrite REST and an in-memory store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cradle Health

//! Backend abstraction layer
//!
//! The lifecycle workflows only see these traits. Each call is a single
//! network round-trip in the REST adapter, so every method is a suspension
//! point and may fail independently.

use crate::errors::AppResult;
use crate::models::{Document, OwnerId, StoredFile};
use async_trait::async_trait;

/// Hosted backend REST adapter
pub mod appwrite;

/// In-process backend with call recording and fault injection
pub mod memory;

/// File ownership matching strategies
pub mod ownership;

pub use appwrite::AppwriteClient;
pub use memory::{BackendCall, InMemoryBackend};
pub use ownership::{policy_for, ExactGrantPolicy, OwnershipPolicy, SubstringGrantPolicy};

/// Document database operations
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// List one page of `owner`'s documents in insertion order, starting after `cursor`
    async fn list_documents(
        &self,
        collection_id: &str,
        owner: &OwnerId,
        cursor: Option<&str>,
        limit: u32,
    ) -> AppResult<Vec<Document>>;

    /// Delete a single document
    async fn delete_document(&self, collection_id: &str, document_id: &str) -> AppResult<()>;
}

/// Object storage operations
#[async_trait]
pub trait FileStore: Send + Sync {
    /// List one page of every file in a bucket, starting after `cursor`
    ///
    /// Storage cannot filter by owner, so the page is unfiltered.
    async fn list_files(
        &self,
        bucket_id: &str,
        cursor: Option<&str>,
        limit: u32,
    ) -> AppResult<Vec<StoredFile>>;

    /// Delete a single file
    async fn delete_file(&self, bucket_id: &str, file_id: &str) -> AppResult<()>;
}

/// Account management operations
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Permanently delete the account record
    async fn delete_account(&self, owner: &OwnerId) -> AppResult<()>;
}
