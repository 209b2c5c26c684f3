//! Removes the duplicated title from articles listed in the duplicate title report.
//!
//! For each reported page the linked article is loaded through the Management API and,
//! in every locale of its rich-text `content`, the first top-level `heading-1` with
//! text is dropped. Nothing is written unless `dry_run` is false.

use serde_json::{Map, Value};
use std::fmt;
use tracing::{error, info, warn};

use crate::contract::{link_target_id, ApiError, ManagementApi};
use crate::delivery::CONTENT_FIELD;
use crate::duplicate_titles::DuplicateTitle;
use crate::locale::{is_locale_map, LocaleFallback};
use crate::rich_text::{remove_first_heading, Node};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// The article was written back.
    Updated,
    /// Dry run: the article would have been written back.
    WouldUpdate,
    /// No locale had a leading heading to remove.
    Unchanged,
    /// The page has no linked article.
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemovalSummary {
    pub total: usize,
    /// Updated, or would be updated in a dry run.
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl RemovalSummary {
    fn record(&mut self, outcome: &RemovalOutcome) {
        self.total += 1;
        match outcome {
            RemovalOutcome::Updated | RemovalOutcome::WouldUpdate => self.updated += 1,
            RemovalOutcome::Unchanged => self.unchanged += 1,
            RemovalOutcome::Skipped => self.skipped += 1,
            RemovalOutcome::Failed(_) => self.errors += 1,
        }
    }
}

#[derive(Debug)]
pub struct MissingVersion(pub String);

impl fmt::Display for MissingVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry {} has no sys.version, cannot update it", self.0)
    }
}

impl std::error::Error for MissingVersion {}

/// Rewrite a `content` field value, locale by locale.
/// Returns `None` when no locale changed.
pub fn strip_content_field(content: &Value) -> Option<Value> {
    if !is_locale_map(content) {
        let document = Node::from_value(content)?;
        let updated = remove_first_heading(&document)?;
        return serde_json::to_value(updated).ok();
    }

    let locales = content.as_object()?;
    let mut modified = false;
    let mut updated = Map::new();
    for (locale, value) in locales {
        let replacement = Node::from_value(value)
            .and_then(|document| remove_first_heading(&document))
            .and_then(|document| serde_json::to_value(document).ok());
        match replacement {
            Some(new_value) => {
                info!(locale = %locale, "Removing first heading");
                modified = true;
                updated.insert(locale.clone(), new_value);
            }
            None => {
                updated.insert(locale.clone(), value.clone());
            }
        }
    }
    modified.then_some(Value::Object(updated))
}

pub async fn article_id_for_page<M>(
    api: &M,
    page_id: &str,
    locales: &LocaleFallback,
) -> Result<Option<String>, ApiError>
where
    M: ManagementApi + ?Sized,
{
    let page = api.entry(page_id).await?;
    Ok(locales
        .field(&page.fields, CONTENT_FIELD)
        .and_then(link_target_id)
        .map(str::to_string))
}

/// Strip the first heading of one article. Returns whether the article changed.
pub async fn update_article<M>(api: &M, article_id: &str, dry_run: bool) -> Result<bool, ApiError>
where
    M: ManagementApi + ?Sized,
{
    let article = api.entry(article_id).await?;
    let Some(content) = article.fields.get(CONTENT_FIELD) else {
        warn!(article_id, "Article has no content field");
        return Ok(false);
    };
    let Some(new_content) = strip_content_field(content) else {
        info!(article_id, "No leading heading to remove");
        return Ok(false);
    };
    if dry_run {
        info!(article_id, "Would update article (dry run)");
        return Ok(true);
    }

    let version = article
        .sys
        .version
        .ok_or_else(|| Box::new(MissingVersion(article_id.to_string())) as ApiError)?;
    let mut fields = article.fields.clone();
    fields.insert(CONTENT_FIELD.to_string(), new_content);
    api.update_entry(article_id, version, &fields).await?;
    info!(article_id, version, "Article updated");
    Ok(true)
}

pub async fn process_page<M>(
    api: &M,
    page: &DuplicateTitle,
    locales: &LocaleFallback,
    dry_run: bool,
) -> RemovalOutcome
where
    M: ManagementApi + ?Sized,
{
    let article_id = match article_id_for_page(api, &page.page_id, locales).await {
        Ok(Some(id)) => id,
        Ok(None) => {
            warn!(page_id = %page.page_id, slug = %page.slug, "No article linked from page");
            return RemovalOutcome::Skipped;
        }
        Err(e) => {
            error!(page_id = %page.page_id, error = %e, "Failed to fetch page");
            return RemovalOutcome::Failed(e.to_string());
        }
    };

    match update_article(api, &article_id, dry_run).await {
        Ok(true) if dry_run => RemovalOutcome::WouldUpdate,
        Ok(true) => RemovalOutcome::Updated,
        Ok(false) => RemovalOutcome::Unchanged,
        Err(e) => {
            error!(article_id = %article_id, error = %e, "Failed to update article");
            RemovalOutcome::Failed(e.to_string())
        }
    }
}

/// Process every reported page in order.
pub async fn process_pages<M>(
    api: &M,
    pages: &[DuplicateTitle],
    locales: &LocaleFallback,
    dry_run: bool,
) -> RemovalSummary
where
    M: ManagementApi + ?Sized,
{
    info!(dry_run, pages = pages.len(), "Removing first lines from articles");
    let mut summary = RemovalSummary::default();
    for (i, page) in pages.iter().enumerate() {
        info!(index = i + 1, total = pages.len(), slug = %page.slug, page_id = %page.page_id, "Processing page");
        let outcome = process_page(api, page, locales, dry_run).await;
        summary.record(&outcome);
    }
    info!(?summary, "First line removal finished");
    summary
}
