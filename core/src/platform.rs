//! Platform abstraction traits
//!
//! These traits define the boundary between platform-agnostic adapter logic and
//! platform-specific implementations (Cloudflare Workers, GCP Cloud Run, etc.)

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// Upper bound on a buffered upstream response body (1 MiB)
pub const MAX_RESPONSE_BYTES: usize = 1024 * 1024;

/// HTTP client for the single outbound request of an invocation
#[async_trait(?Send)]
pub trait HttpClient {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse>;
    async fn post(&self, url: &str, headers: &[(&str, &str)], body: &[u8]) -> Result<HttpResponse>;
}

/// Fully buffered HTTP response from an outbound request
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Parse body as UTF-8 string
    pub fn text(&self) -> std::result::Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.body.clone())
    }

    /// Parse body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> std::result::Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    pub fn is_success(&self) -> bool {
        is_success_status(self.status)
    }
}

/// Whether an HTTP status is in the 2xx range
pub fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Configuration and secrets exposed by the hosting context
pub trait Environment {
    fn get_var(&self, name: &str) -> Result<String>;
    fn get_secret(&self, name: &str) -> Result<String>;
}
