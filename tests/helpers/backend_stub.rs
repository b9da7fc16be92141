// ABOUTME: Local HTTP stub standing in for the hosted backend REST API
// ABOUTME: Records every request and answers with a canned status and JSON body
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cradle Health
#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

use axum::{
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::Value;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use url::form_urlencoded;

/// One request as the stub received it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    /// Raw path, percent-encoding preserved
    pub path: String,
    /// Decoded query pairs in order
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Every `queries[]` parameter parsed as JSON
    pub fn queries(&self) -> Vec<Value> {
        self.query
            .iter()
            .filter(|(key, _)| key == "queries[]")
            .map(|(_, raw)| serde_json::from_str(raw).expect("JSON query"))
            .collect()
    }
}

#[derive(Clone)]
struct StubState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    status: StatusCode,
    body: Value,
}

/// Running stub server
pub struct BackendStub {
    /// Base URL including the `/v1` prefix
    pub endpoint: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl BackendStub {
    /// Serve `status` and `body` for every request on an ephemeral port
    pub async fn start(status: StatusCode, body: Value) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            requests: requests.clone(),
            status,
            body,
        };
        let router = Router::new().fallback(record).with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
        let addr = listener.local_addr().expect("stub address");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("stub server");
        });

        Self {
            endpoint: format!("http://{addr}/v1"),
            requests,
        }
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }

    /// The only request received
    pub async fn single_request(&self) -> RecordedRequest {
        let requests = self.requests().await;
        assert_eq!(requests.len(), 1, "expected exactly one request");
        requests.into_iter().next().expect("one request")
    }
}

async fn record(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let query = form_urlencoded::parse(uri.query().unwrap_or_default().as_bytes())
        .into_owned()
        .collect();
    state.requests.lock().await.push(RecordedRequest {
        method,
        path: uri.path().to_owned(),
        query,
        headers,
    });

    if state.status == StatusCode::NO_CONTENT {
        state.status.into_response()
    } else {
        (state.status, Json(state.body)).into_response()
    }
}
