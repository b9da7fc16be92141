// ABOUTME: In-process implementation of the document, file, and account ports
// ABOUTME: Records every call in order and supports injected failures and latency
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cradle Health

//! In-memory backend
//!
//! Records are kept in insertion order per partition. Cursors resolve to the
//! insertion position of the referenced record, including records that have
//! since been deleted, so a deleter can resume after an item it just removed.
//! [`InMemoryBackend::reject_stale_cursors`] switches to rejecting such cursors
//! instead. Unknown partitions behave as empty ones.

use super::{AccountService, DocumentStore, FileStore};
use crate::errors::{AppError, AppResult};
use crate::models::{Document, OwnerId, StoredFile};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;

const SERVICE: &str = "In-memory backend";

/// One completed backend call, in completion order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    /// Document page listing; `returned` is `None` when the call failed
    ListDocuments {
        /// Collection listed
        collection_id: String,
        /// Cursor sent with the request
        cursor: Option<String>,
        /// Documents returned
        returned: Option<usize>,
    },
    /// Document deletion
    DeleteDocument {
        /// Collection the document lived in
        collection_id: String,
        /// Deleted document
        document_id: String,
        /// Whether the deletion succeeded
        ok: bool,
    },
    /// File page listing; `returned` is `None` when the call failed
    ListFiles {
        /// Bucket listed
        bucket_id: String,
        /// Cursor sent with the request
        cursor: Option<String>,
        /// Files returned
        returned: Option<usize>,
    },
    /// File deletion
    DeleteFile {
        /// Bucket the file lived in
        bucket_id: String,
        /// Deleted file
        file_id: String,
        /// Whether the deletion succeeded
        ok: bool,
    },
    /// Account deletion
    DeleteAccount {
        /// Account removed
        owner_id: String,
        /// Whether the deletion succeeded
        ok: bool,
    },
}

impl BackendCall {
    /// True for document and file deletions
    #[must_use]
    pub const fn is_data_deletion(&self) -> bool {
        matches!(self, Self::DeleteDocument { .. } | Self::DeleteFile { .. })
    }
}

/// Ordered records of one partition
#[derive(Debug)]
struct Partition<T> {
    next_seq: u64,
    live: BTreeMap<u64, T>,
    positions: HashMap<String, u64>,
}

impl<T> Default for Partition<T> {
    fn default() -> Self {
        Self {
            next_seq: 0,
            live: BTreeMap::new(),
            positions: HashMap::new(),
        }
    }
}

impl<T: Clone> Partition<T> {
    fn insert(&mut self, id: String, item: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.positions.insert(id, seq);
        self.live.insert(seq, item);
    }

    fn remove(&mut self, id: &str) -> bool {
        self.positions
            .get(id)
            .is_some_and(|seq| self.live.remove(seq).is_some())
    }

    fn after<'a>(
        &'a self,
        cursor: Option<&str>,
        allow_stale: bool,
    ) -> AppResult<impl Iterator<Item = &'a T> + 'a> {
        let start = match cursor {
            None => 0,
            Some(id) => {
                let seq = self
                    .positions
                    .get(id)
                    .filter(|seq| allow_stale || self.live.contains_key(*seq))
                    .ok_or_else(|| {
                        AppError::external_service(SERVICE, format!("cursor '{id}' not found"))
                    })?;
                seq + 1
            }
        };
        Ok(self.live.range(start..).map(|(_, item)| item))
    }
}

#[derive(Debug, Default)]
struct State {
    collections: HashMap<String, Partition<Document>>,
    buckets: HashMap<String, Partition<StoredFile>>,
    failing_lists: HashSet<String>,
    failing_deletes: HashSet<String>,
    fail_account_deletion: bool,
    reject_stale_cursors: bool,
    latency: HashMap<String, Duration>,
    calls: Vec<BackendCall>,
}

/// Shared in-memory backend; clones observe the same state
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    state: Arc<Mutex<State>>,
}

impl InMemoryBackend {
    /// Create an empty backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document; the body must be an object with a string `$id`
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error if the body is not such an object
    pub async fn insert_document(&self, collection_id: &str, body: Value) -> AppResult<String> {
        let Value::Object(map) = body else {
            return Err(AppError::invalid_input("document body must be a JSON object"));
        };
        let document = Document::from_json(map)
            .ok_or_else(|| AppError::invalid_input("document body must carry a string $id"))?;
        let id = document.id.clone();
        self.state
            .lock()
            .await
            .collections
            .entry(collection_id.to_owned())
            .or_default()
            .insert(id.clone(), document);
        Ok(id)
    }

    /// Add a file
    pub async fn insert_file(&self, bucket_id: &str, file: StoredFile) {
        self.state
            .lock()
            .await
            .buckets
            .entry(bucket_id.to_owned())
            .or_default()
            .insert(file.id.clone(), file);
    }

    /// Make every listing of this collection or bucket fail
    pub async fn fail_listing(&self, partition_id: &str) {
        self.state
            .lock()
            .await
            .failing_lists
            .insert(partition_id.to_owned());
    }

    /// Make deletion of this document or file id fail
    pub async fn fail_deleting(&self, item_id: &str) {
        self.state
            .lock()
            .await
            .failing_deletes
            .insert(item_id.to_owned());
    }

    /// Make account deletion fail
    pub async fn fail_account_deletion(&self) {
        self.state.lock().await.fail_account_deletion = true;
    }

    /// Reject cursors naming a record that no longer exists
    pub async fn reject_stale_cursors(&self) {
        self.state.lock().await.reject_stale_cursors = true;
    }

    /// Delay every call touching this partition
    pub async fn set_latency(&self, partition_id: &str, delay: Duration) {
        self.state
            .lock()
            .await
            .latency
            .insert(partition_id.to_owned(), delay);
    }

    /// Live documents in a collection
    pub async fn document_count(&self, collection_id: &str) -> usize {
        self.state
            .lock()
            .await
            .collections
            .get(collection_id)
            .map_or(0, |p| p.live.len())
    }

    /// Live files in a bucket
    pub async fn file_count(&self, bucket_id: &str) -> usize {
        self.state
            .lock()
            .await
            .buckets
            .get(bucket_id)
            .map_or(0, |p| p.live.len())
    }

    /// Snapshot of every call so far, in completion order
    pub async fn calls(&self) -> Vec<BackendCall> {
        self.state.lock().await.calls.clone()
    }

    async fn delay_for(&self, partition_id: &str) {
        let delay = self.state.lock().await.latency.get(partition_id).copied();
        if let Some(delay) = delay {
            sleep(delay).await;
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryBackend {
    async fn list_documents(
        &self,
        collection_id: &str,
        owner: &OwnerId,
        cursor: Option<&str>,
        limit: u32,
    ) -> AppResult<Vec<Document>> {
        self.delay_for(collection_id).await;
        let mut state = self.state.lock().await;

        let result = if state.failing_lists.contains(collection_id) {
            Err(AppError::external_service(
                SERVICE,
                format!("collection '{collection_id}' is unavailable"),
            ))
        } else {
            let allow_stale = !state.reject_stale_cursors;
            match state.collections.get(collection_id) {
                None => Ok(Vec::new()),
                Some(partition) => partition.after(cursor, allow_stale).map(|docs| {
                    docs.filter(|d| d.owner() == Some(owner.as_str()))
                        .take(limit as usize)
                        .cloned()
                        .collect::<Vec<_>>()
                }),
            }
        };

        state.calls.push(BackendCall::ListDocuments {
            collection_id: collection_id.to_owned(),
            cursor: cursor.map(str::to_owned),
            returned: result.as_ref().ok().map(Vec::len),
        });
        result
    }

    async fn delete_document(&self, collection_id: &str, document_id: &str) -> AppResult<()> {
        self.delay_for(collection_id).await;
        let mut state = self.state.lock().await;

        let ok = !state.failing_deletes.contains(document_id)
            && state
                .collections
                .get_mut(collection_id)
                .is_some_and(|p| p.remove(document_id));

        state.calls.push(BackendCall::DeleteDocument {
            collection_id: collection_id.to_owned(),
            document_id: document_id.to_owned(),
            ok,
        });
        drop(state);

        if ok {
            Ok(())
        } else {
            Err(AppError::external_service(
                SERVICE,
                format!("failed to delete document '{document_id}'"),
            ))
        }
    }
}

#[async_trait]
impl FileStore for InMemoryBackend {
    async fn list_files(
        &self,
        bucket_id: &str,
        cursor: Option<&str>,
        limit: u32,
    ) -> AppResult<Vec<StoredFile>> {
        self.delay_for(bucket_id).await;
        let mut state = self.state.lock().await;

        let result = if state.failing_lists.contains(bucket_id) {
            Err(AppError::external_service(
                SERVICE,
                format!("bucket '{bucket_id}' is unavailable"),
            ))
        } else {
            let allow_stale = !state.reject_stale_cursors;
            match state.buckets.get(bucket_id) {
                None => Ok(Vec::new()),
                Some(partition) => partition
                    .after(cursor, allow_stale)
                    .map(|files| files.take(limit as usize).cloned().collect::<Vec<_>>()),
            }
        };

        state.calls.push(BackendCall::ListFiles {
            bucket_id: bucket_id.to_owned(),
            cursor: cursor.map(str::to_owned),
            returned: result.as_ref().ok().map(Vec::len),
        });
        result
    }

    async fn delete_file(&self, bucket_id: &str, file_id: &str) -> AppResult<()> {
        self.delay_for(bucket_id).await;
        let mut state = self.state.lock().await;

        let ok = !state.failing_deletes.contains(file_id)
            && state
                .buckets
                .get_mut(bucket_id)
                .is_some_and(|p| p.remove(file_id));

        state.calls.push(BackendCall::DeleteFile {
            bucket_id: bucket_id.to_owned(),
            file_id: file_id.to_owned(),
            ok,
        });
        drop(state);

        if ok {
            Ok(())
        } else {
            Err(AppError::external_service(
                SERVICE,
                format!("failed to delete file '{file_id}'"),
            ))
        }
    }
}

#[async_trait]
impl AccountService for InMemoryBackend {
    async fn delete_account(&self, owner: &OwnerId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let ok = !state.fail_account_deletion;
        state.calls.push(BackendCall::DeleteAccount {
            owner_id: owner.as_str().to_owned(),
            ok,
        });
        drop(state);

        if ok {
            Ok(())
        } else {
            Err(AppError::external_service(
                SERVICE,
                format!("failed to delete account '{owner}'"),
            ))
        }
    }
}
