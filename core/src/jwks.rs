//! JWKS (JSON Web Key Set) adapter
//!
//! Fetches an upstream key set and rewrites it according to [`JwksConfig`]:
//! per-key field edits first, then an optional slice of the key list.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::JwksConfig;
use crate::error::{ApiError, Result};
use crate::http::get_json;
use crate::platform::{Environment, HttpClient};

const ALG: &str = "alg";
const X5C: &str = "x5c";

/// A JWKS document
///
/// Top-level members other than `keys` are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JwksDocument {
    pub keys: Vec<KeyEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One key of a JWKS document, kept as an ordered JSON object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyEntry(pub Map<String, Value>);

impl KeyEntry {
    pub fn alg(&self) -> Option<&str> {
        self.0.get(ALG).and_then(Value::as_str)
    }

    pub fn set_alg(&mut self, alg: &str) {
        self.0.insert(ALG.to_string(), Value::String(alg.to_string()));
    }

    pub fn has_x5c(&self) -> bool {
        self.0.contains_key(X5C)
    }

    pub fn remove_x5c(&mut self) {
        self.0.shift_remove(X5C);
    }
}

/// Half-open sub-range of the key list
///
/// Bounds follow generic sequence slicing: negative values count from the
/// end, out-of-range values clamp, and a start at or past the end yields
/// nothing. Missing bounds mean `0` and `len`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeySlice {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl KeySlice {
    pub fn is_noop(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Resolve the bounds against a sequence length
    pub fn range(&self, len: usize) -> Range<usize> {
        let start = self.start.map_or(0, |s| clamp_index(s, len));
        let end = self.end.map_or(len, |e| clamp_index(e, len));
        start..end.max(start)
    }

    pub fn apply<T>(&self, mut items: Vec<T>) -> Vec<T> {
        if self.is_noop() {
            return items;
        }
        let range = self.range(items.len());
        items.truncate(range.end);
        items.drain(..range.start);
        items
    }
}

fn clamp_index(index: i64, len: usize) -> usize {
    let len_i = i64::try_from(len).unwrap_or(i64::MAX);
    let resolved = if index < 0 { len_i.saturating_add(index) } else { index };
    resolved.clamp(0, len_i) as usize
}

/// Fetch and parse the upstream JWKS document
pub async fn fetch_jwks(jwks_uri: &str, http: &dyn HttpClient) -> Result<JwksDocument> {
    let value = get_json(http, jwks_uri).await?;

    serde_json::from_value(value)
        .map_err(|e| ApiError::parse(format!("invalid JWKS document: {}", e)))
}

/// Apply `alg` injection and `x5c` stripping to every key
pub fn apply_key_edits(document: &mut JwksDocument, config: &JwksConfig) {
    for key in &mut document.keys {
        if let Some(alg) = &config.append_alg {
            key.set_alg(alg);
        }
        if config.skip_x5c {
            key.remove_x5c();
        }
    }
}

/// Apply the configured edits, then the configured slice
pub fn transform(mut document: JwksDocument, config: &JwksConfig) -> JwksDocument {
    apply_key_edits(&mut document, config);
    document.keys = config.slice.apply(document.keys);
    document
}

/// Handle a JWKS adapter invocation
pub async fn handle(http: &dyn HttpClient, env: &dyn Environment) -> Result<JwksDocument> {
    let config = JwksConfig::from_env(env)?;

    let document = fetch_jwks(&config.jwks_uri, http).await?;
    let fetched = document.keys.len();

    let document = transform(document, &config);

    tracing::debug!(
        document = %serde_json::to_string(&document).unwrap_or_default(),
        "modified JWKS"
    );
    tracing::info!(
        uri = %config.jwks_uri,
        fetched,
        returned = document.keys.len(),
        "served JWKS"
    );

    Ok(document)
}
