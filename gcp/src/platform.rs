//! GCP platform implementations
//!
//! Implements core platform traits using native Rust libraries:
//! - HttpClient: reqwest, with a bounded body read
//! - Environment: std::env (Cloud Run injects config and mounted secrets as env vars)

use async_trait::async_trait;

use idp_adapter_core::error::{ApiError, Result};
use idp_adapter_core::platform::{Environment, HttpClient, HttpResponse, MAX_RESPONSE_BYTES};

/// reqwest-based HTTP client
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait(?Send)]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse> {
        let mut builder = self.client.get(url);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::transport(format!("HTTP GET {} failed: {}", url, e)))?;

        read_response(response).await
    }

    async fn post(&self, url: &str, headers: &[(&str, &str)], body: &[u8]) -> Result<HttpResponse> {
        let mut builder = self.client.post(url).body(body.to_vec());
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::transport(format!("HTTP POST {} failed: {}", url, e)))?;

        read_response(response).await
    }
}

/// Buffer the whole body, refusing anything larger than `MAX_RESPONSE_BYTES`
async fn read_response(mut response: reqwest::Response) -> Result<HttpResponse> {
    let status = response.status().as_u16();

    if let Some(declared) = response.content_length() {
        check_size(declared as usize)?;
    }

    let mut body = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| ApiError::transport(format!("failed to read response: {}", e)))?
    {
        check_size(body.len() + chunk.len())?;
        body.extend_from_slice(&chunk);
    }

    Ok(HttpResponse { status, body })
}

fn check_size(len: usize) -> Result<()> {
    if len > MAX_RESPONSE_BYTES {
        return Err(ApiError::transport(format!(
            "response body exceeds {} bytes",
            MAX_RESPONSE_BYTES
        )));
    }
    Ok(())
}

/// GCP environment backed by process env vars
pub struct GcpEnv;

impl Environment for GcpEnv {
    fn get_var(&self, name: &str) -> Result<String> {
        std::env::var(name)
            .map_err(|_| ApiError::config(format!("environment variable '{}' not set", name)))
    }

    fn get_secret(&self, name: &str) -> Result<String> {
        // Secret Manager values are mounted as env vars via the service config.
        std::env::var(name)
            .map_err(|_| ApiError::config(format!("secret '{}' not found in environment", name)))
    }
}
