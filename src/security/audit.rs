// ABOUTME: Compliance audit logging for data export and erasure requests
// ABOUTME: Emits structured events whose log level follows their severity
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cradle Health

//! # Lifecycle Audit Module
//!
//! Every export and erasure produces exactly one audit event. Events are
//! written through `tracing` under the `audit` target so log shippers can route
//! them separately from operational logs. Critical events are repeated under
//! the `security_alert` target.

use crate::constants::SERVICE_NAME;
use crate::lifecycle::ExportBundle;
use crate::models::{ErasureReport, LifecycleAction, OwnerId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Severity levels for audit events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditSeverity {
    /// Request fulfilled
    Info,
    /// Request fulfilled with some data left behind
    Warning,
    /// Request failed and needs manual intervention
    Critical,
}

/// One audited data-subject request
#[derive(Debug, Clone, Serialize)]
pub struct LifecycleAuditEvent {
    /// Unique event identifier
    pub event_id: Uuid,
    /// When the request finished
    pub timestamp: DateTime<Utc>,
    /// Export or delete
    pub action: &'static str,
    /// Subject of the request
    pub owner_id: String,
    /// Severity level
    pub severity: AuditSeverity,
    /// `success`, `incomplete`, or `failed`
    pub result: &'static str,
    /// Event description
    pub description: String,
    /// Per-partition detail
    pub metadata: Value,
}

impl LifecycleAuditEvent {
    fn new(
        action: LifecycleAction,
        owner: &OwnerId,
        severity: AuditSeverity,
        result: &'static str,
        description: String,
        metadata: Value,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            action: action.as_str(),
            owner_id: owner.as_str().to_owned(),
            severity,
            result,
            description,
            metadata,
        }
    }

    /// Export delivered
    #[must_use]
    pub fn export_completed(owner: &OwnerId, bundle: &ExportBundle) -> Self {
        let collections: Vec<&str> = bundle.keys().collect();
        Self::new(
            LifecycleAction::Export,
            owner,
            AuditSeverity::Info,
            "success",
            format!(
                "Exported {} documents from {} collections",
                bundle.document_count(),
                collections.len()
            ),
            json!({ "collections": collections }),
        )
    }

    /// Account deleted; `Warning` when some partitions halted
    #[must_use]
    pub fn erasure_completed(owner: &OwnerId, report: &ErasureReport) -> Self {
        let (severity, result) = if report.is_complete() {
            (AuditSeverity::Info, "success")
        } else {
            (AuditSeverity::Warning, "incomplete")
        };
        Self::new(
            LifecycleAction::Delete,
            owner,
            severity,
            result,
            format!(
                "Account deleted after erasing {} items ({} partitions halted)",
                report.total_deleted(),
                report.halted().count()
            ),
            json!({ "partitions": report.partitions }),
        )
    }

    /// Erasure could not finish; the account state needs manual review
    #[must_use]
    pub fn erasure_failed(owner: &OwnerId, report: &ErasureReport, reason: &str) -> Self {
        Self::new(
            LifecycleAction::Delete,
            owner,
            AuditSeverity::Critical,
            "failed",
            format!("Erasure failed: {reason}"),
            json!({ "partitions": report.partitions }),
        )
    }
}

/// Audit logger for lifecycle requests
#[derive(Debug, Clone, Copy)]
pub struct LifecycleAuditor {
    service: &'static str,
}

impl Default for LifecycleAuditor {
    fn default() -> Self {
        Self::new(SERVICE_NAME)
    }
}

impl LifecycleAuditor {
    /// Create an auditor tagging events with `service`
    #[must_use]
    pub const fn new(service: &'static str) -> Self {
        Self { service }
    }

    /// Log an audit event at the level matching its severity
    pub fn record(&self, event: &LifecycleAuditEvent) {
        match event.severity {
            AuditSeverity::Info => self.log_info_event(event),
            AuditSeverity::Warning => self.log_warning_event(event),
            AuditSeverity::Critical => self.log_critical_event(event),
        }
    }

    fn log_info_event(&self, event: &LifecycleAuditEvent) {
        info!(
            target: "audit",
            service = self.service,
            event_id = %event.event_id,
            action = event.action,
            owner_id = %event.owner_id,
            result = event.result,
            metadata = %event.metadata,
            "Lifecycle audit event: {}",
            event.description
        );
    }

    fn log_warning_event(&self, event: &LifecycleAuditEvent) {
        warn!(
            target: "audit",
            service = self.service,
            event_id = %event.event_id,
            action = event.action,
            owner_id = %event.owner_id,
            result = event.result,
            metadata = %event.metadata,
            "Lifecycle audit warning: {}",
            event.description
        );
    }

    fn log_critical_event(&self, event: &LifecycleAuditEvent) {
        error!(
            target: "audit",
            service = self.service,
            event_id = %event.event_id,
            action = event.action,
            owner_id = %event.owner_id,
            result = event.result,
            metadata = %event.metadata,
            "CRITICAL lifecycle audit event: {}",
            event.description
        );
        error!(
            target: "security_alert",
            service = self.service,
            event_id = %event.event_id,
            owner_id = %event.owner_id,
            "SECURITY ALERT: {} requires manual intervention",
            event.description
        );
    }
}
