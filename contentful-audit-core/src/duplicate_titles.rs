//! Pages whose heading repeats as the first line of their linked article.
//!
//! Pipeline: [`crate::delivery::fetch_all_pages`] → [`check_duplicate_titles`] →
//! [`write_report`]. [`find_duplicate_titles`] runs the first two steps.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::AuditConfig;
use crate::contract::{ApiError, DeliveryApi};
use crate::delivery::{fetch_all_pages, PageEntry};
use crate::report::{read_csv, write_csv, ReportError};
use crate::rich_text::first_text;

pub const REPORT_FILE: &str = "duplicate_titles.csv";
pub const REPORT_HEADERS: [&str; 3] = ["slug", "page_id", "title"];

/// One reported page. Field order matches [`REPORT_HEADERS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateTitle {
    pub slug: String,
    pub page_id: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Default, PartialEq)]
pub struct DuplicateScan {
    pub matches: Vec<DuplicateTitle>,
    /// Pages that had everything needed for a comparison.
    pub processed: usize,
    /// Pages without slug, heading, article link or resolvable article.
    pub skipped: usize,
}

/// Case-insensitive comparison of trimmed texts. An empty first text never matches.
pub fn is_duplicate_title(heading: &str, first_text: &str) -> bool {
    let first_text = first_text.trim();
    !first_text.is_empty() && heading.trim().to_lowercase() == first_text.to_lowercase()
}

pub fn check_duplicate_titles(pages: &[PageEntry]) -> DuplicateScan {
    let mut scan = DuplicateScan::default();

    for page in pages {
        let (Some(slug), Some(heading)) = (page.slug.as_deref(), page.heading.as_deref()) else {
            debug!(page_id = %page.id, "Skipping page without slug or heading");
            scan.skipped += 1;
            continue;
        };
        let Some(article) = page.article.as_ref() else {
            if page.article_id.is_some() {
                warn!(page_id = %page.id, slug, "Skipping page whose article could not be resolved");
            }
            scan.skipped += 1;
            continue;
        };
        let Some(content) = article.content.as_ref() else {
            debug!(page_id = %page.id, article_id = %article.id, "Skipping article without rich-text content");
            scan.skipped += 1;
            continue;
        };

        let text = first_text(content);
        if is_duplicate_title(heading, &text) {
            info!(slug, page_id = %page.id, heading, "Found duplicate title");
            scan.matches.push(DuplicateTitle {
                slug: slug.to_string(),
                page_id: page.id.clone(),
                title: heading.trim().to_string(),
            });
        }
        scan.processed += 1;
    }

    info!(
        processed = scan.processed,
        skipped = scan.skipped,
        matches = scan.matches.len(),
        "Duplicate title check finished"
    );
    scan
}

/// Fetch all pages and check them.
pub async fn find_duplicate_titles<D>(api: &D, config: &AuditConfig) -> Result<DuplicateScan, ApiError>
where
    D: DeliveryApi + ?Sized,
{
    let pages = fetch_all_pages(api, config).await?;
    Ok(check_duplicate_titles(&pages))
}

pub fn write_report(dir: &Path, matches: &[DuplicateTitle]) -> Result<PathBuf, ReportError> {
    write_csv(dir, REPORT_FILE, &REPORT_HEADERS, matches)
}

pub fn read_report(path: &Path) -> Result<Vec<DuplicateTitle>, ReportError> {
    read_csv(path)
}
