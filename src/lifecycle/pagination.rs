// ABOUTME: Cursor-paginated traversals over one collection or bucket for a single owner
// ABOUTME: Collector for export, document deleter and file deleter for erasure
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cradle Health

//! Partition traversal primitives
//!
//! Each traversal owns its cursor and walks pages strictly in sequence. The
//! deleters fan out one page of deletions at a time and wait for all of them to
//! settle before fetching the next page, so concurrent deletes per partition
//! never exceed the page size.
//!
//! Failure policies differ:
//! - the collector swallows any failure and reports zero documents;
//! - the deleters stop at the first failed page and report it as halted.

use crate::backend::{DocumentStore, FileStore, OwnershipPolicy};
use crate::errors::{AppError, AppResult};
use crate::models::{
    BucketPartition, CollectionPartition, Document, OwnerId, PartitionKind, PartitionOutcome,
    PartitionStatus,
};
use futures_util::future::join_all;
use tracing::{debug, error, info, warn};

/// Collect every document `owner` has in a collection
///
/// Returns an empty list when the collection id is blank or when any page
/// fails to load; a partial result is never returned.
pub async fn collect_owned_documents(
    store: &dyn DocumentStore,
    collection_id: &str,
    owner: &OwnerId,
    page_size: u32,
) -> Vec<Document> {
    if collection_id.trim().is_empty() {
        warn!(owner_id = %owner, "Skipping export of collection with blank id");
        return Vec::new();
    }

    match collect_pages(store, collection_id, owner, page_size).await {
        Ok(documents) => {
            debug!(
                collection_id,
                owner_id = %owner,
                count = documents.len(),
                "Collected documents"
            );
            documents
        }
        Err(e) => {
            error!(
                collection_id,
                owner_id = %owner,
                error = %e,
                "Failed to collect documents, exporting collection as empty"
            );
            Vec::new()
        }
    }
}

async fn collect_pages(
    store: &dyn DocumentStore,
    collection_id: &str,
    owner: &OwnerId,
    page_size: u32,
) -> AppResult<Vec<Document>> {
    let mut documents = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = store
            .list_documents(collection_id, owner, cursor.as_deref(), page_size)
            .await?;
        let Some(last) = page.last() else {
            return Ok(documents);
        };
        cursor = Some(last.id.clone());
        documents.extend(page);
    }
}

/// Delete every document `owner` has in a collection
///
/// All deletes of a page run concurrently; the cursor then moves to the last
/// fetched document whatever the individual results were. A failed fetch, or
/// any failed delete once the page has settled, halts the traversal.
pub async fn delete_owned_documents(
    store: &dyn DocumentStore,
    partition: &CollectionPartition,
    owner: &OwnerId,
    page_size: u32,
) -> PartitionOutcome {
    let collection_id = partition.collection_id.as_str();
    let mut outcome = new_outcome(&partition.key, PartitionKind::Collection);
    if collection_id.trim().is_empty() {
        warn!(partition = %partition.key, "Skipping erasure of collection with blank id");
        outcome.status = PartitionStatus::Skipped;
        return outcome;
    }

    let mut cursor: Option<String> = None;
    loop {
        let page = match store
            .list_documents(collection_id, owner, cursor.as_deref(), page_size)
            .await
        {
            Ok(page) => page,
            Err(e) => {
                error!(
                    collection_id,
                    owner_id = %owner,
                    error = %e,
                    "Failed to list documents for deletion"
                );
                outcome.status = halted("list documents", &e);
                return outcome;
            }
        };
        outcome.pages += 1;

        let Some(last) = page.last() else { break };
        cursor = Some(last.id.clone());

        let results =
            join_all(page.iter().map(|doc| store.delete_document(collection_id, &doc.id))).await;
        let (deleted, failures) = settle(results);
        outcome.deleted += deleted;

        if let Some(first) = failures.first() {
            error!(
                collection_id,
                owner_id = %owner,
                failed = failures.len(),
                page_len = page.len(),
                error = %first,
                "Document deletes failed, halting collection"
            );
            outcome.status = halted_page(failures.len(), page.len(), first);
            return outcome;
        }
    }

    info!(
        collection_id,
        owner_id = %owner,
        deleted = outcome.deleted,
        pages = outcome.pages,
        "Collection erased"
    );
    outcome
}

/// Delete every file in a bucket that carries a grant for `owner`
///
/// Listing is unfiltered, so ownership is decided per file by `policy`. The
/// cursor always moves to the last file of the raw page, never to the last
/// matched file, otherwise an unowned tail would loop forever or skip files.
pub async fn delete_owned_files(
    store: &dyn FileStore,
    policy: &dyn OwnershipPolicy,
    partition: &BucketPartition,
    owner: &OwnerId,
    page_size: u32,
) -> PartitionOutcome {
    let bucket_id = partition.bucket_id.as_str();
    let mut outcome = new_outcome(&partition.key, PartitionKind::Bucket);
    if bucket_id.trim().is_empty() {
        warn!(partition = %partition.key, "Skipping erasure of bucket with blank id");
        outcome.status = PartitionStatus::Skipped;
        return outcome;
    }

    let mut cursor: Option<String> = None;
    loop {
        let page = match store.list_files(bucket_id, cursor.as_deref(), page_size).await {
            Ok(page) => page,
            Err(e) => {
                error!(
                    bucket_id,
                    owner_id = %owner,
                    error = %e,
                    "Failed to list files for deletion"
                );
                outcome.status = halted("list files", &e);
                return outcome;
            }
        };
        outcome.pages += 1;

        let Some(last) = page.last() else { break };
        cursor = Some(last.id.clone());

        let owned: Vec<_> = page
            .iter()
            .filter(|file| policy.has_owner_grant(file, owner))
            .collect();
        if owned.is_empty() {
            continue;
        }

        let results =
            join_all(owned.iter().map(|file| store.delete_file(bucket_id, &file.id))).await;
        let (deleted, failures) = settle(results);
        outcome.deleted += deleted;

        if let Some(first) = failures.first() {
            error!(
                bucket_id,
                owner_id = %owner,
                failed = failures.len(),
                matched = owned.len(),
                error = %first,
                "File deletes failed, halting bucket"
            );
            outcome.status = halted_page(failures.len(), owned.len(), first);
            return outcome;
        }
    }

    info!(
        bucket_id,
        owner_id = %owner,
        deleted = outcome.deleted,
        pages = outcome.pages,
        "Bucket erased"
    );
    outcome
}

fn new_outcome(key: &str, kind: PartitionKind) -> PartitionOutcome {
    PartitionOutcome {
        key: key.to_owned(),
        kind,
        pages: 0,
        deleted: 0,
        status: PartitionStatus::Completed,
    }
}

/// Split settled delete results into a success count and the failures
fn settle(results: Vec<AppResult<()>>) -> (usize, Vec<AppError>) {
    let total = results.len();
    let failures: Vec<AppError> = results.into_iter().filter_map(Result::err).collect();
    (total - failures.len(), failures)
}

fn halted(operation: &str, error: &AppError) -> PartitionStatus {
    PartitionStatus::Halted {
        reason: format!("{operation} failed: {}", error.message),
    }
}

fn halted_page(failed: usize, attempted: usize, first: &AppError) -> PartitionStatus {
    PartitionStatus::Halted {
        reason: format!("{failed} of {attempted} deletes failed: {}", first.message),
    }
}
