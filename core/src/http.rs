//! One-shot HTTPS helpers
//!
//! Each helper performs exactly one request, buffers the whole response and
//! never retries.

use serde_json::Value;

use crate::error::{ApiError, Result};
use crate::platform::{HttpClient, HttpResponse};

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// GET a URL and parse the buffered body as JSON
pub async fn get_json(http: &dyn HttpClient, url: &str) -> Result<Value> {
    let response = http.get(url, &[]).await?;

    if !response.is_success() {
        tracing::warn!(url, status = response.status, "upstream answered with non-success status");
    }
    tracing::debug!(url, body = %String::from_utf8_lossy(&response.body), "original response");

    response
        .json::<Value>()
        .map_err(|e| ApiError::parse(format!("response from {} is not valid JSON: {}", url, e)))
}

/// POST a pre-encoded form body and return the buffered response
///
/// `Content-Length` is the byte length of the encoded body.
pub async fn post_form(http: &dyn HttpClient, url: &str, body: &str) -> Result<HttpResponse> {
    let content_length = body.len().to_string();
    let headers = [
        ("Content-Type", FORM_CONTENT_TYPE),
        ("Content-Length", content_length.as_str()),
    ];

    http.post(url, &headers, body.as_bytes()).await
}

/// Encode fields as `application/x-www-form-urlencoded`, preserving order
pub fn encode_form(fields: &[(&str, &str)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish()
}
