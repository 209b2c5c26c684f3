//! # contract: API seams and wire types shared by every pipeline
//!
//! Two traits describe the slices of Contentful the audit tools talk to:
//! - [`DeliveryApi`]: read-only published content (entries with their include set).
//! - [`ManagementApi`]: entry lookup/update and content type listing.
//!
//! Real clients live in [`crate::delivery`] and in the binary crate; tests use the
//! `mockall` mocks generated here (`MockDeliveryApi`, `MockManagementApi`).
//!
//! ## Wire types
//! [`Entry`], [`Sys`], [`EntryCollection`] and [`ContentType`] mirror the JSON the APIs
//! return. Unknown `sys`/content type keys are kept in `extra` maps so snapshots and
//! updates write back what was read.

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Error type for API traits (simple boxed error, as returned by HTTP clients and mocks).
pub type ApiError = Box<dyn std::error::Error + Send + Sync>;

/// Content type id of the pages scanned by the duplicate title finder.
pub const PAGE_CONTENT_TYPE: &str = "page";
/// Locale selector asking the Delivery API for every locale of every field.
pub const ALL_LOCALES: &str = "*";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sys {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_version: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Sys {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// A single content record: metadata plus fields (plain values or locale maps).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub sys: Sys,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Entry {
    pub fn id(&self) -> &str {
        &self.sys.id
    }
}

/// Linked entries returned next to a Delivery response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Includes {
    #[serde(rename = "Entry", default)]
    pub entries: Vec<Entry>,
}

/// One page of a Delivery `entries` listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryCollection {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub items: Vec<Entry>,
    #[serde(default)]
    pub includes: Includes,
}

/// A content type definition as returned by the Management API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentType {
    pub sys: Sys,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fields: Vec<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContentType {
    pub fn id(&self) -> &str {
        &self.sys.id
    }
}

/// Query parameters for a Delivery `entries` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryQuery {
    pub content_type: String,
    pub include: u8,
    pub limit: u32,
    pub skip: u32,
    pub locale: String,
}

impl EntryQuery {
    /// Query for one batch of `content_type` entries in every locale.
    pub fn batch(content_type: &str, include: u8, limit: u32, skip: u32) -> Self {
        Self {
            content_type: content_type.to_string(),
            include,
            limit,
            skip,
            locale: ALL_LOCALES.to_string(),
        }
    }

    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("content_type", self.content_type.clone()),
            ("include", self.include.to_string()),
            ("limit", self.limit.to_string()),
            ("skip", self.skip.to_string()),
            ("locale", self.locale.clone()),
        ]
    }
}

/// Returns the target id of a link object (`{"sys": {"type": "Link", "id": ...}}`).
pub fn link_target_id(value: &Value) -> Option<&str> {
    value
        .get("sys")
        .and_then(|sys| sys.get("id"))
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

/// Read-only access to published entries.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait DeliveryApi: Send + Sync {
    /// Fetch one batch of entries together with its include set.
    async fn entries(&self, query: &EntryQuery) -> Result<EntryCollection, ApiError>;

    /// Fetch a single published entry (all locales).
    async fn entry(&self, entry_id: &str) -> Result<Entry, ApiError>;
}

/// Read/write access to entries and content types of one environment.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ManagementApi: Send + Sync {
    /// Fetch an entry, published or not. Fields are always locale maps.
    async fn entry(&self, entry_id: &str) -> Result<Entry, ApiError>;

    /// Replace all fields of an entry. `version` must match the entry's current `sys.version`.
    async fn update_entry(
        &self,
        entry_id: &str,
        version: u64,
        fields: &Map<String, Value>,
    ) -> Result<Entry, ApiError>;

    /// List every content type of the environment.
    async fn content_types(&self) -> Result<Vec<ContentType>, ApiError>;
}
