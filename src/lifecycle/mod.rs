// ABOUTME: User-data lifecycle service running the export and erasure workflows
// ABOUTME: Fans the traversal primitives out across every configured collection and bucket
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cradle Health

//! # Data Lifecycle
//!
//! Two workflows serve data-subject requests:
//!
//! - **export** collects every collection concurrently and returns an
//!   [`ExportBundle`]. A collection that fails to load is simply absent.
//! - **erase** deletes across every collection and bucket concurrently, waits
//!   for all of them, and only then deletes the account. A failed account
//!   deletion is critical and is never retried.
//!
//! A service instance is built per request from explicit configuration; there
//! is no process-wide client.

/// Export bundle type
pub mod export;

/// Cursor-paginated partition traversals
pub mod pagination;

pub use export::ExportBundle;
pub use pagination::{collect_owned_documents, delete_owned_documents, delete_owned_files};

use crate::backend::{
    policy_for, AccountService, AppwriteClient, DocumentStore, FileStore, OwnershipPolicy,
};
use crate::config::{LifecycleConfig, LifecycleOptions};
use crate::errors::{AppError, AppResult};
use crate::models::{BucketPartition, CollectionPartition, ErasureReport, OwnerId};
use crate::security::audit::{LifecycleAuditEvent, LifecycleAuditor};
use futures_util::future::join_all;
use reqwest::Client;
use std::sync::Arc;
use tracing::{error, info};

/// Backend ports used by the workflows
#[derive(Clone)]
pub struct BackendPorts {
    /// Document database
    pub documents: Arc<dyn DocumentStore>,
    /// Object storage
    pub files: Arc<dyn FileStore>,
    /// Account management
    pub accounts: Arc<dyn AccountService>,
}

impl BackendPorts {
    /// Use one backend for all three ports
    pub fn shared<B>(backend: B) -> Self
    where
        B: DocumentStore + FileStore + AccountService + 'static,
    {
        let backend = Arc::new(backend);
        Self {
            documents: backend.clone(),
            files: backend.clone(),
            accounts: backend,
        }
    }
}

/// Export and erasure over a fixed partition catalog
#[derive(Clone)]
pub struct DataLifecycleService {
    ports: BackendPorts,
    ownership: Arc<dyn OwnershipPolicy>,
    collections: Vec<CollectionPartition>,
    buckets: Vec<BucketPartition>,
    options: LifecycleOptions,
    auditor: LifecycleAuditor,
}

impl DataLifecycleService {
    /// Create a service over explicit ports and partitions
    #[must_use]
    pub fn new(
        ports: BackendPorts,
        collections: Vec<CollectionPartition>,
        buckets: Vec<BucketPartition>,
        options: LifecycleOptions,
    ) -> Self {
        Self {
            ports,
            ownership: policy_for(options.grant_match),
            collections,
            buckets,
            options,
            auditor: LifecycleAuditor::default(),
        }
    }

    /// Create a service talking to the hosted backend
    ///
    /// `http_client` lets callers share a connection pool across requests.
    ///
    /// # Errors
    ///
    /// Returns an internal error if no HTTP client is given and one cannot be built
    pub fn from_config(config: LifecycleConfig, http_client: Option<Client>) -> AppResult<Self> {
        let client = match http_client {
            Some(http_client) => AppwriteClient::with_http_client(config.backend, http_client),
            None => AppwriteClient::new(config.backend)?,
        };
        Ok(Self::new(
            BackendPorts::shared(client),
            config.collections,
            config.buckets,
            config.options,
        ))
    }

    /// Replace the ownership policy chosen from the options
    #[must_use]
    pub fn with_ownership_policy(mut self, policy: Arc<dyn OwnershipPolicy>) -> Self {
        self.ownership = policy;
        self
    }

    /// Configured collections
    #[must_use]
    pub fn collections(&self) -> &[CollectionPartition] {
        &self.collections
    }

    /// Configured buckets
    #[must_use]
    pub fn buckets(&self) -> &[BucketPartition] {
        &self.buckets
    }

    /// Collect the owner's documents from every collection
    ///
    /// Collections are read concurrently, so latency follows the slowest one.
    pub async fn export(&self, owner: &OwnerId) -> ExportBundle {
        let page_size = self.options.page_sizes.export;
        let documents = self.ports.documents.as_ref();

        let collected = join_all(self.collections.iter().map(|partition| async move {
            let found =
                collect_owned_documents(documents, &partition.collection_id, owner, page_size)
                    .await;
            (partition.key.clone(), found)
        }))
        .await;

        let bundle = ExportBundle::from_entries(collected);
        self.auditor
            .record(&LifecycleAuditEvent::export_completed(owner, &bundle));
        bundle
    }

    /// Erase every document and file of the owner, then the account
    ///
    /// # Errors
    ///
    /// Returns a critical error when the account deletion fails, or, in strict
    /// mode, when any partition halted (the account is then kept)
    pub async fn erase(&self, owner: &OwnerId) -> AppResult<ErasureReport> {
        let sizes = self.options.page_sizes;
        let documents = self.ports.documents.as_ref();
        let files = self.ports.files.as_ref();
        let policy = self.ownership.as_ref();

        info!(
            owner_id = %owner,
            collections = self.collections.len(),
            buckets = self.buckets.len(),
            "Starting account erasure"
        );

        let collection_jobs = join_all(
            self.collections
                .iter()
                .map(|partition| delete_owned_documents(documents, partition, owner, sizes.delete)),
        );
        let bucket_jobs = join_all(
            self.buckets
                .iter()
                .map(|partition| delete_owned_files(files, policy, partition, owner, sizes.files)),
        );
        let (collection_outcomes, bucket_outcomes) = tokio::join!(collection_jobs, bucket_jobs);

        let report = ErasureReport {
            partitions: collection_outcomes
                .into_iter()
                .chain(bucket_outcomes)
                .collect(),
        };

        if self.options.strict_erasure && !report.is_complete() {
            let reason = "data erasure incomplete, account kept for manual follow-up";
            self.auditor
                .record(&LifecycleAuditEvent::erasure_failed(owner, &report, reason));
            return Err(AppError::critical(format!(
                "Erasure of {owner} incomplete; account not deleted"
            )));
        }

        if let Err(e) = self.ports.accounts.delete_account(owner).await {
            error!(owner_id = %owner, error = %e, "Account deletion failed after data erasure");
            self.auditor.record(&LifecycleAuditEvent::erasure_failed(
                owner,
                &report,
                &format!("account deletion failed: {}", e.message),
            ));
            return Err(AppError::critical(format!(
                "Account deletion failed for {owner}: {}",
                e.message
            )));
        }

        self.auditor
            .record(&LifecycleAuditEvent::erasure_completed(owner, &report));
        Ok(report)
    }
}
