use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::locale::LocaleFallback;

pub const DEFAULT_OUTPUT_DIR: &str = "generated";
pub const DEFAULT_PAGE_SIZE: u32 = 100;
/// Largest `limit` the Delivery API accepts for one entries request.
pub const MAX_PAGE_SIZE: u32 = 1000;
pub const DEFAULT_INCLUDE_DEPTH: u8 = 2;
pub const DEFAULT_DELIVERY_BASE_URL: &str = "https://cdn.contentful.com";
pub const DEFAULT_MANAGEMENT_BASE_URL: &str = "https://api.contentful.com";

/// Non-secret settings shared by every audit run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub output_dir: PathBuf,
    /// Locale keys tried in order when a field holds one value per locale.
    pub locales: Vec<String>,
    pub page_size: u32,
    pub include_depth: u8,
    pub delivery_base_url: String,
    pub management_base_url: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            locales: LocaleFallback::default().order().to_vec(),
            page_size: DEFAULT_PAGE_SIZE,
            include_depth: DEFAULT_INCLUDE_DEPTH,
            delivery_base_url: DEFAULT_DELIVERY_BASE_URL.to_string(),
            management_base_url: DEFAULT_MANAGEMENT_BASE_URL.to_string(),
        }
    }
}

impl AuditConfig {
    pub fn locale_fallback(&self) -> LocaleFallback {
        LocaleFallback::new(self.locales.iter().cloned())
    }

    pub fn trace_loaded(&self) {
        info!(
            output_dir = %self.output_dir.display(),
            locales = ?self.locales,
            page_size = self.page_size,
            include_depth = self.include_depth,
            "Loaded AuditConfig"
        );
        debug!(?self, "AuditConfig loaded (full debug)");
    }
}

/// A space/environment pair, used for URLs, file names and report columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceRef {
    pub space_id: String,
    pub environment_id: String,
}

impl SpaceRef {
    pub fn new(space_id: impl Into<String>, environment_id: impl Into<String>) -> Self {
        Self {
            space_id: space_id.into(),
            environment_id: environment_id.into(),
        }
    }
}

impl fmt::Display for SpaceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.space_id, self.environment_id)
    }
}

/// A space plus the token used to reach it. The token never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub space: SpaceRef,
    pub access_token: String,
}

impl Credentials {
    pub fn new(space: SpaceRef, access_token: impl Into<String>) -> Self {
        Self {
            space,
            access_token: access_token.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("space", &self.space)
            .field("access_token_set", &!self.access_token.is_empty())
            .finish()
    }
}
