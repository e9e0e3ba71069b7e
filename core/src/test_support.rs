//! Mock implementations of platform traits for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

use crate::error::{ApiError, Result};
use crate::platform::{Environment, HttpClient, HttpResponse};

/// A request seen by [`MockHttp`]
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Mock HTTP client with pre-configured responses
///
/// Responses are matched by URL substring. Every call is recorded, including
/// calls that fail.
pub struct MockHttp {
    responses: Vec<(String, HttpResponse)>,
    failure: Option<String>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockHttp {
    pub fn new(responses: Vec<(String, HttpResponse)>) -> Self {
        Self {
            responses,
            failure: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Client whose every request fails at the transport level
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new(Vec::new())
        }
    }

    pub fn ok(body: &str) -> HttpResponse {
        HttpResponse {
            status: 200,
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn respond(
        &self,
        method: &'static str,
        url: &str,
        headers: &[(&str, &str)],
        body: &[u8],
    ) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            url: url.to_string(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: body.to_vec(),
        });

        if let Some(message) = &self.failure {
            return Err(ApiError::transport(format!("{} {} failed: {}", method, url, message)));
        }

        for (pattern, response) in &self.responses {
            if url.contains(pattern) {
                return Ok(HttpResponse {
                    status: response.status,
                    body: response.body.clone(),
                });
            }
        }
        Err(ApiError::transport(format!("no mock response for {} {}", method, url)))
    }
}

#[async_trait(?Send)]
impl HttpClient for MockHttp {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse> {
        self.respond("GET", url, headers, &[])
    }

    async fn post(&self, url: &str, headers: &[(&str, &str)], body: &[u8]) -> Result<HttpResponse> {
        self.respond("POST", url, headers, body)
    }
}

/// Mock environment backed by in-memory HashMaps
pub struct MockEnv {
    vars: HashMap<String, String>,
    secrets: HashMap<String, String>,
}

impl MockEnv {
    pub fn new(vars: &[(&str, &str)], secrets: &[(&str, &str)]) -> Self {
        fn to_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        }

        Self {
            vars: to_map(vars),
            secrets: to_map(secrets),
        }
    }

    pub fn with_vars(vars: &[(&str, &str)]) -> Self {
        Self::new(vars, &[])
    }
}

impl Environment for MockEnv {
    fn get_var(&self, name: &str) -> Result<String> {
        self.vars
            .get(name)
            .cloned()
            .ok_or_else(|| ApiError::config(format!("variable '{}' not found", name)))
    }

    fn get_secret(&self, name: &str) -> Result<String> {
        self.secrets
            .get(name)
            .cloned()
            .ok_or_else(|| ApiError::config(format!("secret '{}' not found", name)))
    }
}

/// Captures formatted `tracing` output for assertions
#[derive(Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    /// Route this thread's events at DEBUG and above into the capture
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(self.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
