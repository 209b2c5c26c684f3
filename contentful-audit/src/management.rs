#![doc = "Management API client: the real implementation of the core `ManagementApi` trait."]
//
//! # Management API client
//!
//! [`ManagementClient`] talks to `api.contentful.com` (or a configured base URL) for one
//! space/environment with a management token. It is the only place in the workspace that
//! writes to Contentful, and it does so only through [`ManagementApi::update_entry`].
//!
//! See [`contentful_audit_core::contract`] for the trait and the mocks used in tests.

use async_trait::async_trait;
use contentful_audit_core::config::Credentials;
use contentful_audit_core::contract::{ApiError, ContentType, Entry, ManagementApi};
use contentful_audit_core::http::decode_json;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};

const CONTENT_TYPE_HEADER: &str = "application/vnd.contentful.management.v1+json";
const VERSION_HEADER: &str = "X-Contentful-Version";
const CONTENT_TYPE_LIMIT: u32 = 1000;

#[derive(Deserialize)]
struct ContentTypeCollection {
    #[serde(default)]
    items: Vec<ContentType>,
}

pub struct ManagementClient {
    http: Client,
    base_url: String,
    credentials: Credentials,
}

impl ManagementClient {
    pub fn new(base_url: &str, credentials: Credentials) -> Self {
        tracing::info!(space = %credentials.space, base_url, "Initialized ManagementClient");
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    fn environment_url(&self) -> String {
        format!(
            "{}/spaces/{}/environments/{}",
            self.base_url, self.credentials.space.space_id, self.credentials.space.environment_id
        )
    }

    fn entry_url(&self, entry_id: &str) -> String {
        format!("{}/entries/{}", self.environment_url(), entry_id)
    }
}

#[async_trait]
impl ManagementApi for ManagementClient {
    async fn entry(&self, entry_id: &str) -> Result<Entry, ApiError> {
        let url = self.entry_url(entry_id);
        tracing::debug!(url = %url, "Fetching management entry");
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.credentials.access_token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, url = %url, "Failed to reach Management API");
                e
            })?;
        decode_json(response, &url).await
    }

    async fn update_entry(
        &self,
        entry_id: &str,
        version: u64,
        fields: &Map<String, Value>,
    ) -> Result<Entry, ApiError> {
        let url = self.entry_url(entry_id);
        tracing::info!(url = %url, version, "Updating management entry");
        let body = json!({ "fields": fields });
        let response = self
            .http
            .put(&url)
            .bearer_auth(&self.credentials.access_token)
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE_HEADER)
            .header(VERSION_HEADER, version.to_string())
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, url = %url, "Failed to reach Management API");
                e
            })?;
        decode_json(response, &url).await
    }

    async fn content_types(&self) -> Result<Vec<ContentType>, ApiError> {
        let url = format!("{}/content_types", self.environment_url());
        tracing::info!(url = %url, "Listing content types");
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.credentials.access_token)
            .query(&[("limit", CONTENT_TYPE_LIMIT)])
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, url = %url, "Failed to reach Management API");
                e
            })?;
        let collection: ContentTypeCollection = decode_json(response, &url).await?;
        tracing::info!(count = collection.items.len(), "Fetched content types");
        Ok(collection.items)
    }
}
