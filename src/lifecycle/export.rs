// ABOUTME: Export bundle assembled from every collection holding a user's documents
// ABOUTME: Serializes as one JSON object keyed by collection, in catalog order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cradle Health

use crate::errors::{AppError, AppResult};
use crate::models::Document;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Everything an owner has, grouped by collection key
///
/// Collections without documents are left out entirely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportBundle {
    entries: Vec<(String, Vec<Document>)>,
}

impl ExportBundle {
    /// Build from (key, documents) pairs, dropping empty collections
    #[must_use]
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<Document>)>,
    {
        Self {
            entries: entries
                .into_iter()
                .filter(|(_, documents)| !documents.is_empty())
                .collect(),
        }
    }

    /// Collection keys present, in catalog order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Documents exported for a key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[Document]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, documents)| documents.as_slice())
    }

    /// Number of documents across all collections
    #[must_use]
    pub fn document_count(&self) -> usize {
        self.entries.iter().map(|(_, documents)| documents.len()).sum()
    }

    /// True when the owner has no documents anywhere
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pretty-printed JSON download body
    ///
    /// # Errors
    ///
    /// Returns an internal error if serialization fails
    pub fn to_pretty_json(&self) -> AppResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AppError::internal(format!("Failed to serialize export bundle: {e}")))
    }
}

impl Serialize for ExportBundle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, documents) in &self.entries {
            map.serialize_entry(key, documents)?;
        }
        map.end()
    }
}
