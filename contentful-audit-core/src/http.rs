//! Response handling shared by the Delivery and Management clients.

use serde::de::DeserializeOwned;
use std::fmt;
use tracing::{debug, error};

use crate::contract::ApiError;

/// A non-2xx answer from a Contentful API.
#[derive(Debug)]
pub struct HttpStatusError {
    pub status: reqwest::StatusCode,
    pub url: String,
    pub body: String,
}

impl fmt::Display for HttpStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Contentful API error: status {} for {}: {}",
            self.status, self.url, self.body
        )
    }
}

impl std::error::Error for HttpStatusError {}

/// Check the status of `response` and decode its JSON body.
pub async fn decode_json<T: DeserializeOwned>(
    response: reqwest::Response,
    url: &str,
) -> Result<T, ApiError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .unwrap_or_else(|_| String::from("<Failed to decode response body>"));
    if !status.is_success() {
        error!(status = %status, url = %url, "Contentful API returned error. Response body: {text}");
        return Err(Box::new(HttpStatusError {
            status,
            url: url.to_string(),
            body: text,
        }));
    }
    debug!(url = %url, bytes = text.len(), "Contentful API response received");
    serde_json::from_str(&text).map_err(|e| {
        error!(error = ?e, url = %url, "Failed to parse Contentful API JSON");
        Box::new(e) as ApiError
    })
}
