use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

use crate::config::{AuditConfig, Credentials, MAX_PAGE_SIZE};
use crate::contract::{
    link_target_id, ApiError, DeliveryApi, Entry, EntryCollection, EntryQuery, ALL_LOCALES,
    PAGE_CONTENT_TYPE,
};
use crate::http::decode_json;
use crate::locale::LocaleFallback;
use crate::rich_text::Node;

pub const SLUG_FIELD: &str = "slug";
pub const HEADING_FIELD: &str = "heading";
/// On pages this is the link to the article; on articles it is the rich-text body.
pub const CONTENT_FIELD: &str = "content";

/// Delivery API client for one space/environment.
pub struct DeliveryClient {
    http: Client,
    base_url: String,
    credentials: Credentials,
}

impl DeliveryClient {
    pub fn new(base_url: &str, credentials: Credentials) -> Self {
        info!(space = %credentials.space, base_url, "Initialized DeliveryClient");
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(), // avoid "//"
            credentials,
        }
    }

    fn entries_url(&self) -> String {
        format!(
            "{}/spaces/{}/environments/{}/entries",
            self.base_url, self.credentials.space.space_id, self.credentials.space.environment_id
        )
    }
}

#[async_trait]
impl DeliveryApi for DeliveryClient {
    async fn entries(&self, query: &EntryQuery) -> Result<EntryCollection, ApiError> {
        let url = self.entries_url();
        debug!(url = %url, skip = query.skip, limit = query.limit, "Fetching Delivery entries");
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.credentials.access_token)
            .query(&query.to_params())
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, url = %url, "Failed to reach Delivery API");
                e
            })?;
        decode_json(response, &url).await
    }

    async fn entry(&self, entry_id: &str) -> Result<Entry, ApiError> {
        let url = format!("{}/{}", self.entries_url(), entry_id);
        debug!(url = %url, "Fetching Delivery entry");
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.credentials.access_token)
            .query(&[("locale", ALL_LOCALES)])
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, url = %url, "Failed to reach Delivery API");
                e
            })?;
        decode_json(response, &url).await
    }
}

/// A page entry reduced to what the title check needs.
#[derive(Debug, Clone, PartialEq)]
pub struct PageEntry {
    pub id: String,
    pub slug: Option<String>,
    pub heading: Option<String>,
    /// Id of the linked article, when the page links one.
    pub article_id: Option<String>,
    /// The linked article, when the link could be resolved.
    pub article: Option<ArticleEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArticleEntry {
    pub id: String,
    pub content: Option<Node>,
}

impl ArticleEntry {
    pub fn from_entry(entry: &Entry, locales: &LocaleFallback) -> Self {
        Self {
            id: entry.id().to_string(),
            content: locales
                .field(&entry.fields, CONTENT_FIELD)
                .and_then(Node::from_value),
        }
    }
}

/// Fetch every `page` entry, following pagination, with linked articles resolved.
///
/// Links are looked up in each response's include set first; a link missing from it is
/// fetched on its own. A failed batch request aborts the whole fetch.
///
/// `skip` advances by the number of items actually returned, so a server that caps
/// `limit` below the requested page size still yields every entry.
pub async fn fetch_all_pages<D>(api: &D, config: &AuditConfig) -> Result<Vec<PageEntry>, ApiError>
where
    D: DeliveryApi + ?Sized,
{
    let locales = config.locale_fallback();
    let limit = config.page_size.clamp(1, MAX_PAGE_SIZE);
    let mut pages = Vec::new();
    let mut skip = 0u32;

    loop {
        let query = EntryQuery::batch(PAGE_CONTENT_TYPE, config.include_depth, limit, skip);
        let batch = api.entries(&query).await.map_err(|e| {
            error!(error = %e, skip, "Failed to fetch page batch");
            e
        })?;
        let received = batch.items.len();
        info!(skip, received, total = batch.total, "Fetched page batch");

        let included: HashMap<&str, &Entry> = batch
            .includes
            .entries
            .iter()
            .map(|entry| (entry.id(), entry))
            .collect();

        for item in &batch.items {
            pages.push(page_from_entry(api, item, &included, &locales).await);
        }

        skip = skip.saturating_add(u32::try_from(received).unwrap_or(u32::MAX));
        if received == 0 || u64::from(skip) >= batch.total {
            break;
        }
        if received < limit as usize {
            debug!(requested = limit, received, "Server returned a smaller batch than requested");
        }
    }

    info!(count = pages.len(), "Fetched all pages");
    Ok(pages)
}

async fn page_from_entry<D>(
    api: &D,
    entry: &Entry,
    included: &HashMap<&str, &Entry>,
    locales: &LocaleFallback,
) -> PageEntry
where
    D: DeliveryApi + ?Sized,
{
    let article_id = locales
        .field(&entry.fields, CONTENT_FIELD)
        .and_then(link_target_id)
        .map(str::to_string);

    let article = match article_id.as_deref() {
        Some(id) => resolve_article(api, id, included, locales).await,
        None => None,
    };

    PageEntry {
        id: entry.id().to_string(),
        slug: locales
            .field_str(&entry.fields, SLUG_FIELD)
            .map(str::to_string),
        heading: locales
            .field_str(&entry.fields, HEADING_FIELD)
            .map(str::to_string),
        article_id,
        article,
    }
}

async fn resolve_article<D>(
    api: &D,
    article_id: &str,
    included: &HashMap<&str, &Entry>,
    locales: &LocaleFallback,
) -> Option<ArticleEntry>
where
    D: DeliveryApi + ?Sized,
{
    if let Some(entry) = included.get(article_id) {
        return Some(ArticleEntry::from_entry(entry, locales));
    }
    warn!(article_id, "Linked article missing from include set, fetching it directly");
    match api.entry(article_id).await {
        Ok(entry) => Some(ArticleEntry::from_entry(&entry, locales)),
        Err(e) => {
            warn!(article_id, error = %e, "Failed to fetch linked article");
            None
        }
    }
}
