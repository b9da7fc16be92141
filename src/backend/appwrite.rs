// ABOUTME: REST client for the hosted backend's databases, storage, and users APIs
// ABOUTME: Implements the document, file, and account ports over reqwest with project/key auth
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cradle Health

//! Appwrite REST adapter
//!
//! Queries are sent as repeated `queries[]` parameters, each a JSON-encoded
//! query object (`equal`, `limit`, `cursorAfter`). Every call carries the
//! project and API key headers.
//!
//! # Example
//! ```rust,no_run
//! use cradle_lifecycle::backend::{AppwriteClient, DocumentStore};
//! use cradle_lifecycle::config::LifecycleConfig;
//! use cradle_lifecycle::models::OwnerId;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = LifecycleConfig::from_env()?;
//! let client = AppwriteClient::new(config.backend)?;
//! let owner = OwnerId::parse("user_123")?;
//! let first_page = client.list_documents("profiles", &owner, None, 100).await?;
//! # Ok(())
//! # }
//! ```

use super::{AccountService, DocumentStore, FileStore};
use crate::config::BackendConfig;
use crate::constants::{http, OWNER_FIELD};
use crate::errors::{AppError, AppResult};
use crate::models::{Document, OwnerId, StoredFile};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;
use urlencoding::encode;

const SERVICE: &str = "Appwrite API";

/// Document list response
#[derive(Debug, Deserialize)]
struct DocumentListResponse {
    documents: Vec<Map<String, Value>>,
}

/// File list response
#[derive(Debug, Deserialize)]
struct FileListResponse {
    files: Vec<StoredFile>,
}

/// Error body returned on non-2xx responses
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// REST client for one backend project
#[derive(Clone)]
pub struct AppwriteClient {
    config: BackendConfig,
    http_client: Client,
}

impl AppwriteClient {
    /// Build a client with its own connection pool
    ///
    /// # Errors
    ///
    /// Returns an internal error if the HTTP client cannot be constructed
    pub fn new(config: BackendConfig) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self::with_http_client(config, http_client))
    }

    /// Build a client sharing an existing connection pool
    ///
    /// The per-call timeout from `config` is applied to every request.
    #[must_use]
    pub const fn with_http_client(config: BackendConfig, http_client: Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.config.endpoint);
        self.http_client
            .request(method, url)
            .timeout(self.config.timeout)
            .header(http::PROJECT_HEADER, &self.config.project_id)
            .header(http::API_KEY_HEADER, &self.config.api_key)
    }

    fn page_queries(cursor: Option<&str>, limit: u32) -> Vec<(&'static str, String)> {
        let mut queries = vec![(
            "queries[]",
            json!({ "method": "limit", "values": [limit] }).to_string(),
        )];
        if let Some(cursor) = cursor {
            queries.push((
                "queries[]",
                json!({ "method": "cursorAfter", "values": [cursor] }).to_string(),
            ));
        }
        queries
    }

    async fn send(request: RequestBuilder, operation: &str) -> AppResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| AppError::external_service(SERVICE, format!("{operation}: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let detail = response
            .json::<ErrorResponse>()
            .await
            .ok()
            .and_then(|body| match (body.kind, body.message) {
                (Some(kind), Some(message)) => Some(format!("{kind}: {message}")),
                (None, message) | (message, None) => message,
            })
            .unwrap_or_default();

        Err(AppError::external_service(
            SERVICE,
            format!("{operation} failed with HTTP {status} {detail}")
                .trim_end()
                .to_owned(),
        ))
    }
}

#[async_trait]
impl DocumentStore for AppwriteClient {
    async fn list_documents(
        &self,
        collection_id: &str,
        owner: &OwnerId,
        cursor: Option<&str>,
        limit: u32,
    ) -> AppResult<Vec<Document>> {
        let path = format!(
            "/databases/{}/collections/{}/documents",
            encode(&self.config.database_id),
            encode(collection_id)
        );
        let mut queries = vec![(
            "queries[]",
            json!({ "method": "equal", "attribute": OWNER_FIELD, "values": [owner.as_str()] })
                .to_string(),
        )];
        queries.extend(Self::page_queries(cursor, limit));

        debug!(collection_id, cursor, limit, "Listing documents");
        let response = Self::send(
            self.request(Method::GET, &path).query(&queries),
            "list documents",
        )
        .await?;

        let body: DocumentListResponse = response.json().await.map_err(|e| {
            AppError::external_service(SERVICE, format!("JSON parse error: {e}"))
        })?;

        body.documents
            .into_iter()
            .map(|raw| {
                Document::from_json(raw).ok_or_else(|| {
                    AppError::external_service(SERVICE, "document without $id in list response")
                })
            })
            .collect()
    }

    async fn delete_document(&self, collection_id: &str, document_id: &str) -> AppResult<()> {
        let path = format!(
            "/databases/{}/collections/{}/documents/{}",
            encode(&self.config.database_id),
            encode(collection_id),
            encode(document_id)
        );
        Self::send(self.request(Method::DELETE, &path), "delete document").await?;
        Ok(())
    }
}

#[async_trait]
impl FileStore for AppwriteClient {
    async fn list_files(
        &self,
        bucket_id: &str,
        cursor: Option<&str>,
        limit: u32,
    ) -> AppResult<Vec<StoredFile>> {
        let path = format!("/storage/buckets/{}/files", encode(bucket_id));
        let queries = Self::page_queries(cursor, limit);

        debug!(bucket_id, cursor, limit, "Listing files");
        let response = Self::send(
            self.request(Method::GET, &path).query(&queries),
            "list files",
        )
        .await?;

        let body: FileListResponse = response.json().await.map_err(|e| {
            AppError::external_service(SERVICE, format!("JSON parse error: {e}"))
        })?;
        Ok(body.files)
    }

    async fn delete_file(&self, bucket_id: &str, file_id: &str) -> AppResult<()> {
        let path = format!(
            "/storage/buckets/{}/files/{}",
            encode(bucket_id),
            encode(file_id)
        );
        Self::send(self.request(Method::DELETE, &path), "delete file").await?;
        Ok(())
    }
}

#[async_trait]
impl AccountService for AppwriteClient {
    async fn delete_account(&self, owner: &OwnerId) -> AppResult<()> {
        let path = format!("/users/{}", encode(owner.as_str()));
        Self::send(self.request(Method::DELETE, &path), "delete account").await?;
        Ok(())
    }
}
