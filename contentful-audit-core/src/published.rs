//! Publish status of a list of page entries, looked up through the Management API.
//!
//! The Management API also sees drafts, so an entry is published exactly when its
//! `sys.publishedVersion` is set. Lookups that fail do not stop the run: the page is
//! reported as unpublished with the [`NOT_FOUND_SLUG`] placeholder.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::contract::ManagementApi;
use crate::delivery::SLUG_FIELD;
use crate::id_lists::read_ids;
use crate::locale::LocaleFallback;
use crate::report::{write_csv, ReportError};

pub const NOT_FOUND_SLUG: &str = "NOT_FOUND";
pub const MISSING_SLUG: &str = "N/A";
pub const PUBLISHED_FILE: &str = "published_pages.csv";
pub const UNPUBLISHED_FILE: &str = "unpublished_pages.csv";
pub const REPORT_HEADERS: [&str; 2] = ["page_id", "slug"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageStatus {
    pub page_id: String,
    pub slug: String,
    pub published: bool,
    pub error: Option<String>,
}

/// A row of either status report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRow {
    pub page_id: String,
    pub slug: String,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct StatusSplit {
    pub published: Vec<PageRow>,
    pub unpublished: Vec<PageRow>,
}

pub fn read_page_ids(path: &Path) -> std::io::Result<Vec<String>> {
    read_ids(path)
}

pub async fn check_page_status<M>(api: &M, page_id: &str, locales: &LocaleFallback) -> PageStatus
where
    M: ManagementApi + ?Sized,
{
    match api.entry(page_id).await {
        Ok(entry) => PageStatus {
            page_id: page_id.to_string(),
            slug: locales
                .field_str(&entry.fields, SLUG_FIELD)
                .unwrap_or(MISSING_SLUG)
                .to_string(),
            published: entry.sys.published_version.is_some_and(|v| v > 0),
            error: None,
        },
        Err(e) => {
            warn!(page_id, error = %e, "Failed to look up page, reporting it as unpublished");
            PageStatus {
                page_id: page_id.to_string(),
                slug: NOT_FOUND_SLUG.to_string(),
                published: false,
                error: Some(e.to_string()),
            }
        }
    }
}

/// Check every id in order and split the results.
pub async fn check_all_pages<M>(api: &M, page_ids: &[String], locales: &LocaleFallback) -> StatusSplit
where
    M: ManagementApi + ?Sized,
{
    let mut split = StatusSplit::default();
    let total = page_ids.len();

    for (i, page_id) in page_ids.iter().enumerate() {
        let status = check_page_status(api, page_id, locales).await;
        info!(
            index = i + 1,
            total,
            page_id = %status.page_id,
            published = status.published,
            "Checked page"
        );
        let row = PageRow {
            page_id: status.page_id,
            slug: status.slug,
        };
        if status.published {
            split.published.push(row);
        } else {
            split.unpublished.push(row);
        }
    }

    split
}

/// Write both reports; each is written even when empty.
pub fn write_reports(dir: &Path, split: &StatusSplit) -> Result<(PathBuf, PathBuf), ReportError> {
    let published = write_csv(dir, PUBLISHED_FILE, &REPORT_HEADERS, &split.published)?;
    let unpublished = write_csv(dir, UNPUBLISHED_FILE, &REPORT_HEADERS, &split.unpublished)?;
    Ok((published, unpublished))
}
