// ABOUTME: Server binary hosting the user-data lifecycle function over HTTP
// ABOUTME: Serves against the hosted backend or an in-memory demo backend
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cradle Health

//! # Cradle Lifecycle Server
//!
//! ```bash
//! # Against the hosted backend (configuration read per request)
//! cradle-lifecycle-server --port 3000
//!
//! # Local demo with seeded in-memory data for `demo-user`
//! cradle-lifecycle-server --backend memory --seed-demo
//! ```

use anyhow::Result;
use clap::{Parser, ValueEnum};
use cradle_lifecycle::{
    backend::InMemoryBackend,
    config::LifecycleOptions,
    constants::{defaults, BUCKET_PARTITIONS, COLLECTION_PARTITIONS, OWNER_FIELD},
    lifecycle::{BackendPorts, DataLifecycleService},
    logging::{init_logging, LogFormat},
    models::{BucketPartition, CollectionPartition, StoredFile},
    resources::{EnvLifecycleProvider, FixedLifecycleProvider, LifecycleProvider, ServerResources},
    routes::build_router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

const DEMO_OWNER: &str = "demo-user";

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackendKind {
    /// Hosted backend configured through environment variables
    Appwrite,
    /// Process-local store, data lost on exit
    Memory,
}

#[derive(Debug, Parser)]
#[command(
    name = "cradle-lifecycle-server",
    version,
    about = "User data export and erasure service"
)]
struct Args {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = defaults::HTTP_PORT)]
    port: u16,

    /// Backend to serve against
    #[arg(long, env = "LIFECYCLE_BACKEND", value_enum, default_value = "appwrite")]
    backend: BackendKind,

    /// Seed demo records for `demo-user` (memory backend only)
    #[arg(long)]
    seed_demo: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(LogFormat::from_env()?)?;

    let provider: Arc<dyn LifecycleProvider> = match args.backend {
        BackendKind::Appwrite => Arc::new(EnvLifecycleProvider::from_process_env()?),
        BackendKind::Memory => Arc::new(memory_provider(args.seed_demo).await?),
    };
    if args.seed_demo && matches!(args.backend, BackendKind::Appwrite) {
        warn!("--seed-demo ignored for the appwrite backend");
    }

    let router = build_router(Arc::new(ServerResources::new(provider)));
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, backend = ?args.backend, "Cradle lifecycle server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

/// Memory backend whose partition ids equal their catalog keys
async fn memory_provider(seed_demo: bool) -> Result<FixedLifecycleProvider> {
    let backend = InMemoryBackend::new();
    if seed_demo {
        seed_demo_data(&backend).await?;
    }

    let collections = COLLECTION_PARTITIONS
        .iter()
        .map(|(key, _)| CollectionPartition {
            key: (*key).to_owned(),
            collection_id: (*key).to_owned(),
        })
        .collect();
    let buckets = BUCKET_PARTITIONS
        .iter()
        .map(|(key, _)| BucketPartition {
            key: (*key).to_owned(),
            bucket_id: (*key).to_owned(),
        })
        .collect();

    let service = DataLifecycleService::new(
        BackendPorts::shared(backend),
        collections,
        buckets,
        LifecycleOptions::default(),
    );
    Ok(FixedLifecycleProvider::new(service))
}

async fn seed_demo_data(backend: &InMemoryBackend) -> Result<()> {
    backend
        .insert_document(
            "profile",
            json!({ "$id": "profile-1", OWNER_FIELD: DEMO_OWNER, "dueDate": "2026-03-14" }),
        )
        .await?;
    for (i, systolic) in [118, 121, 124].into_iter().enumerate() {
        backend
            .insert_document(
                "bloodPressure",
                json!({
                    "$id": format!("bp-{i}"),
                    OWNER_FIELD: DEMO_OWNER,
                    "systolic": systolic,
                    "diastolic": 78
                }),
            )
            .await?;
    }
    backend
        .insert_file(
            "profileImages",
            StoredFile {
                id: "avatar-1".to_owned(),
                name: "avatar.png".to_owned(),
                permissions: vec![format!("read(\"user:{DEMO_OWNER}\")")],
            },
        )
        .await;
    info!(owner_id = DEMO_OWNER, "Seeded demo data");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
    }
}
