//! Cloudflare Workers platform implementations
//!
//! Implements the core platform traits for the Fetch API and Env.

use async_trait::async_trait;
use worker::{Env, Fetch, Headers, Method, RequestInit};

use idp_adapter_core::error::{ApiError, Result};
use idp_adapter_core::platform::{Environment, HttpClient, HttpResponse, MAX_RESPONSE_BYTES};

/// Workers Fetch API HTTP client
pub struct WorkersFetchClient;

#[async_trait(?Send)]
impl HttpClient for WorkersFetchClient {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse> {
        fetch_with_method(Method::Get, url, headers, None).await
    }

    async fn post(&self, url: &str, headers: &[(&str, &str)], body: &[u8]) -> Result<HttpResponse> {
        fetch_with_method(Method::Post, url, headers, Some(body)).await
    }
}

async fn fetch_with_method(
    method: Method,
    url: &str,
    headers: &[(&str, &str)],
    body: Option<&[u8]>,
) -> Result<HttpResponse> {
    let mut worker_headers = Headers::new();
    for (name, value) in headers {
        // The runtime derives Content-Length from the body itself.
        if name.eq_ignore_ascii_case("Content-Length") {
            continue;
        }
        worker_headers
            .set(name, value)
            .map_err(|_| ApiError::internal(format!("failed to set header: {}", name)))?;
    }

    let mut init = RequestInit::new();
    init.with_method(method).with_headers(worker_headers);

    if let Some(body_bytes) = body {
        init.with_body(Some(worker::js_sys::Uint8Array::from(body_bytes).into()));
    }

    let request = worker::Request::new_with_init(url, &init)
        .map_err(|_| ApiError::internal(format!("failed to create request for {}", url)))?;

    let mut response = Fetch::Request(request)
        .send()
        .await
        .map_err(|e| ApiError::transport(format!("fetch failed for {}: {}", url, e)))?;

    let status = response.status_code();

    let declared = response
        .headers()
        .get("Content-Length")
        .ok()
        .flatten()
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > MAX_RESPONSE_BYTES) {
        return Err(ApiError::transport(format!(
            "response from {} exceeds {} bytes",
            url, MAX_RESPONSE_BYTES
        )));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| ApiError::transport(format!("failed to read response body: {}", e)))?;

    if body.len() > MAX_RESPONSE_BYTES {
        return Err(ApiError::transport(format!(
            "response from {} exceeds {} bytes",
            url, MAX_RESPONSE_BYTES
        )));
    }

    Ok(HttpResponse { status, body })
}

/// Workers Env adapter for Environment trait
pub struct WorkersEnv<'a> {
    env: &'a Env,
}

impl<'a> WorkersEnv<'a> {
    pub fn new(env: &'a Env) -> Self {
        Self { env }
    }
}

impl Environment for WorkersEnv<'_> {
    fn get_var(&self, name: &str) -> Result<String> {
        self.env
            .var(name)
            .map(|v| v.to_string())
            .map_err(|_| ApiError::config(format!("variable '{}' not found", name)))
    }

    fn get_secret(&self, name: &str) -> Result<String> {
        self.env
            .secret(name)
            .map(|v| v.to_string())
            .map_err(|_| ApiError::config(format!("secret '{}' not found", name)))
    }
}
