// ABOUTME: Application constants: environment variable names, partition catalog, paging defaults
// ABOUTME: Single source of truth for the collections and buckets a user's data lives in
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cradle Health

/// Environment variable names
pub mod env_config {
    /// Backend REST endpoint, e.g. `https://cloud.appwrite.io/v1`
    pub const ENDPOINT: &str = "APPWRITE_ENDPOINT";
    /// Backend project identifier
    pub const PROJECT_ID: &str = "APPWRITE_PROJECT_ID";
    /// Server API key with documents/files/users scopes
    pub const API_KEY: &str = "APPWRITE_API_KEY";
    /// Database holding every user collection
    pub const DATABASE_ID: &str = "APPWRITE_DATABASE_ID";

    /// Page size used while collecting documents for export
    pub const EXPORT_PAGE_SIZE: &str = "LIFECYCLE_EXPORT_PAGE_SIZE";
    /// Page size used while deleting documents
    pub const DELETE_PAGE_SIZE: &str = "LIFECYCLE_DELETE_PAGE_SIZE";
    /// Page size used while listing bucket files
    pub const FILE_PAGE_SIZE: &str = "LIFECYCLE_FILE_PAGE_SIZE";
    /// Per-call timeout applied by the REST client
    pub const HTTP_TIMEOUT_SECS: &str = "LIFECYCLE_HTTP_TIMEOUT_SECS";
    /// Refuse to delete the account when any partition halted
    pub const STRICT_ERASURE: &str = "LIFECYCLE_STRICT_ERASURE";
    /// `substring` or `exact` owner grant matching for bucket files
    pub const OWNER_GRANT_MATCH: &str = "LIFECYCLE_OWNER_GRANT_MATCH";

    /// Log output format (`json` or `pretty`)
    pub const LOG_FORMAT: &str = "LOG_FORMAT";
}

/// HTTP-level names
pub mod http {
    /// Header carrying the authenticated caller's id, set by the function runtime
    pub const USER_ID_HEADER: &str = "x-appwrite-user-id";
    /// Header carrying the backend project
    pub const PROJECT_HEADER: &str = "X-Appwrite-Project";
    /// Header carrying the server API key
    pub const API_KEY_HEADER: &str = "X-Appwrite-Key";
    /// Request id header propagated through tracing spans
    pub const REQUEST_ID_HEADER: &str = "x-request-id";
    /// Prefix of the export download filename
    pub const EXPORT_FILENAME_PREFIX: &str = "cradle_data_export";
    /// Largest accepted request body; checked after configuration and identity
    pub const MAX_BODY_BYTES: usize = 1024 * 1024;
}

/// Default paging and timing values
pub mod defaults {
    /// Documents per page while exporting
    pub const EXPORT_PAGE_SIZE: u32 = 100;
    /// Documents per page while deleting; bounds concurrent deletes per page
    pub const DELETE_PAGE_SIZE: u32 = 25;
    /// Files per page while scanning buckets
    pub const FILE_PAGE_SIZE: u32 = 25;
    /// Largest page the backend accepts
    pub const MAX_PAGE_SIZE: u32 = 5000;
    /// REST call timeout
    pub const HTTP_TIMEOUT_SECS: u64 = 30;
    /// Default HTTP port for the server binary
    pub const HTTP_PORT: u16 = 3000;
}

/// Document field holding the owning user's id
pub const OWNER_FIELD: &str = "ownerId";

/// Collections holding user data: (export key, environment variable with the collection id)
pub const COLLECTION_PARTITIONS: &[(&str, &str)] = &[
    ("profile", "PROFILES_COLLECTION_ID"),
    ("appointments", "APPOINTMENTS_COLLECTION_ID"),
    ("bloodPressure", "BLOOD_PRESSURE_COLLECTION_ID"),
    ("bloodSugar", "BLOOD_SUGAR_COLLECTION_ID"),
    ("weight", "WEIGHT_COLLECTION_ID"),
    ("symptoms", "SYMPTOMS_COLLECTION_ID"),
    ("medications", "MEDICATIONS_COLLECTION_ID"),
    ("kickCounts", "KICK_COUNTS_COLLECTION_ID"),
    ("chatSessions", "CHAT_SESSIONS_COLLECTION_ID"),
    ("chatMessages", "CHAT_MESSAGES_COLLECTION_ID"),
    ("doctorMessages", "DOCTOR_MESSAGES_COLLECTION_ID"),
    ("blogBookmarks", "BLOG_BOOKMARKS_COLLECTION_ID"),
    (
        "notificationSubscriptions",
        "NOTIFICATION_SUBSCRIPTIONS_COLLECTION_ID",
    ),
];

/// Storage buckets holding user files: (key, environment variable with the bucket id)
pub const BUCKET_PARTITIONS: &[(&str, &str)] = &[
    ("profileImages", "PROFILE_IMAGES_BUCKET_ID"),
    ("medicalDocuments", "MEDICAL_DOCUMENTS_BUCKET_ID"),
    ("chatAttachments", "CHAT_ATTACHMENTS_BUCKET_ID"),
];

/// Service name reported by the health route and audit events
pub const SERVICE_NAME: &str = "cradle-lifecycle";
