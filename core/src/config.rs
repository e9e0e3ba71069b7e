//! Configuration loading
//!
//! Both adapters resolve their options from the hosting context once per
//! invocation. Optional behavior defaults to a no-op.

use crate::error::{ApiError, Result};
use crate::jwks::KeySlice;
use crate::platform::Environment;

pub const JWKS_URI: &str = "AZURE_JWKS_URI";
pub const JWKS_APPEND_ALG: &str = "AZURE_JWKS_APPEND_ALG";
pub const JWKS_SKIP_X5C: &str = "AZURE_JWKS_SKIP_X5C";
pub const JWKS_SLICE_START: &str = "AZURE_JWKS_SLICE_START";
pub const JWKS_SLICE_END: &str = "AZURE_JWKS_SLICE_END";

pub const JWT_URI: &str = "AZURE_JWT_URI";
pub const JWT_CLIENT_ID: &str = "AZURE_JWT_CLIENT_ID";
pub const JWT_CLIENT_SECRET: &str = "AZURE_JWT_CLIENT_SECRET";

/// JWKS adapter configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JwksConfig {
    /// Source URI of the upstream JWKS document
    pub jwks_uri: String,
    /// Value written to every key's `alg` member
    pub append_alg: Option<String>,
    /// Remove every key's `x5c` member
    pub skip_x5c: bool,
    /// Sub-range of keys to keep after field edits
    pub slice: KeySlice,
}

impl JwksConfig {
    /// Load configuration from platform environment
    pub fn from_env(env: &dyn Environment) -> Result<Self> {
        let jwks_uri = required_var(env, JWKS_URI)?;
        validate_endpoint_url(JWKS_URI, &jwks_uri)?;

        let slice = KeySlice {
            start: parse_index(JWKS_SLICE_START, optional_var(env, JWKS_SLICE_START))?,
            end: parse_index(JWKS_SLICE_END, optional_var(env, JWKS_SLICE_END))?,
        };

        Ok(Self {
            jwks_uri,
            append_alg: optional_var(env, JWKS_APPEND_ALG),
            skip_x5c: parse_flag(optional_var(env, JWKS_SKIP_X5C).as_deref()),
            slice,
        })
    }
}

/// Token adapter configuration
#[derive(Clone, PartialEq, Eq)]
pub struct TokenConfig {
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
}

impl TokenConfig {
    /// Load configuration from platform environment
    ///
    /// The client secret is looked up as a secret first and falls back to a
    /// plain variable, since some hosts only expose one kind of binding.
    pub fn from_env(env: &dyn Environment) -> Result<Self> {
        let token_uri = required_var(env, JWT_URI)?;
        validate_endpoint_url(JWT_URI, &token_uri)?;

        let client_secret = env
            .get_secret(JWT_CLIENT_SECRET)
            .or_else(|_| env.get_var(JWT_CLIENT_SECRET))
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::config(format!("{} not configured", JWT_CLIENT_SECRET)))?;

        Ok(Self {
            token_uri,
            client_id: required_var(env, JWT_CLIENT_ID)?,
            client_secret,
        })
    }
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("token_uri", &self.token_uri)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

fn optional_var(env: &dyn Environment, name: &str) -> Option<String> {
    env.get_var(name).ok().filter(|v| !v.is_empty())
}

fn required_var(env: &dyn Environment, name: &str) -> Result<String> {
    optional_var(env, name).ok_or_else(|| ApiError::config(format!("{} not configured", name)))
}

/// Interpret an optional flag value
///
/// Unset, empty, `0`, `false`, `no` and `off` are false. Anything else is true.
pub fn parse_flag(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        None | Some("") => false,
        Some(v) => !matches!(
            v.to_ascii_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        ),
    }
}

fn parse_index(name: &str, value: Option<String>) -> Result<Option<i64>> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i64>()
        .map(Some)
        .map_err(|_| ApiError::config(format!("{} must be an integer, got '{}'", name, raw)))
}

/// Validate an outbound endpoint URL
///
/// HTTPS is required except for loopback hosts. Userinfo and fragments are rejected.
fn validate_endpoint_url(name: &str, value: &str) -> Result<()> {
    let url = url::Url::parse(value)
        .map_err(|e| ApiError::config(format!("{} is not a valid URL: {}", name, e)))?;

    let is_localhost = matches!(
        url.host_str(),
        Some("localhost") | Some("127.0.0.1") | Some("[::1]")
    );
    if url.scheme() != "https" && !(url.scheme() == "http" && is_localhost) {
        return Err(ApiError::config(format!("{} must use HTTPS", name)));
    }

    if !url.username().is_empty() || url.password().is_some() {
        return Err(ApiError::config(format!("{} must not have userinfo", name)));
    }

    if url.fragment().is_some() {
        return Err(ApiError::config(format!("{} must not have a fragment", name)));
    }

    Ok(())
}
