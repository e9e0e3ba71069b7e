//! OAuth2 client-credentials token exchange
//!
//! The provider's response body is relayed as-is. It is never parsed, so
//! callers see exactly what the token endpoint produced.

use crate::config::TokenConfig;
use crate::error::{ApiError, Result};
use crate::http::{encode_form, post_form};
use crate::platform::{is_success_status, Environment, HttpClient};

pub const GRANT_TYPE: &str = "client_credentials";

/// Client-credentials token request
pub struct TokenRequest<'a> {
    pub token_uri: &'a str,
    pub client_id: &'a str,
    pub client_secret: &'a str,
}

impl<'a> TokenRequest<'a> {
    pub fn from_config(config: &'a TokenConfig) -> Self {
        Self {
            token_uri: &config.token_uri,
            client_id: &config.client_id,
            client_secret: &config.client_secret,
        }
    }

    /// Form-encoded request body
    pub fn form_body(&self) -> String {
        encode_form(&[
            ("grant_type", GRANT_TYPE),
            ("client_id", self.client_id),
            ("client_secret", self.client_secret),
        ])
    }
}

/// Raw token endpoint response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenResponse {
    pub status: u16,
    pub body: String,
}

impl TokenResponse {
    pub fn is_success(&self) -> bool {
        is_success_status(self.status)
    }
}

/// Send the token request and return the raw response body
pub async fn exchange(request: &TokenRequest<'_>, http: &dyn HttpClient) -> Result<TokenResponse> {
    let response = post_form(http, request.token_uri, &request.form_body()).await?;

    let body = response
        .text()
        .map_err(|e| ApiError::transport(format!("token response is not UTF-8: {}", e)))?;

    Ok(TokenResponse {
        status: response.status,
        body,
    })
}

/// Handle a token adapter invocation
pub async fn handle(http: &dyn HttpClient, env: &dyn Environment) -> Result<TokenResponse> {
    let config = TokenConfig::from_env(env)?;

    let response = exchange(&TokenRequest::from_config(&config), http).await?;

    if response.is_success() {
        tracing::info!(
            uri = %config.token_uri,
            status = response.status,
            bytes = response.body.len(),
            "token exchanged"
        );
    } else {
        tracing::warn!(
            uri = %config.token_uri,
            status = response.status,
            bytes = response.body.len(),
            "token endpoint answered with non-success status"
        );
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{JWT_CLIENT_ID, JWT_CLIENT_SECRET, JWT_URI};
    use crate::http::FORM_CONTENT_TYPE;
    use crate::platform::HttpResponse;
    use crate::test_support::{MockEnv, MockHttp};

    const TOKEN_URI: &str = "https://login.microsoftonline.com/tenant/oauth2/v2.0/token";

    fn request<'a>(client_id: &'a str, client_secret: &'a str) -> TokenRequest<'a> {
        TokenRequest {
            token_uri: TOKEN_URI,
            client_id,
            client_secret,
        }
    }

    #[test]
    fn test_form_body_exact() {
        let body = request("abc", "xyz").form_body();
        assert_eq!(body, "grant_type=client_credentials&client_id=abc&client_secret=xyz");
    }

    #[tokio::test]
    async fn test_exchange_sends_form_with_byte_length() {
        let http = MockHttp::new(vec![("/token".into(), MockHttp::ok("{}"))]);

        exchange(&request("abc", "xyz"), &http).await.unwrap();

        let requests = http.requests();
        assert_eq!(requests.len(), 1);
        let sent = &requests[0];
        let expected = "grant_type=client_credentials&client_id=abc&client_secret=xyz";

        assert_eq!(sent.method, "POST");
        assert_eq!(sent.url, TOKEN_URI);
        assert_eq!(sent.body, expected.as_bytes());
        assert_eq!(sent.header("Content-Type"), Some(FORM_CONTENT_TYPE));
        assert_eq!(sent.header("Content-Length"), Some(expected.len().to_string().as_str()));
    }

    #[tokio::test]
    async fn test_exchange_content_length_counts_bytes() {
        let http = MockHttp::new(vec![("/token".into(), MockHttp::ok("{}"))]);

        exchange(&request("abc", "sécret"), &http).await.unwrap();

        let requests = http.requests();
        let sent = &requests[0];
        let declared: usize = sent.header("Content-Length").unwrap().parse().unwrap();
        assert_eq!(declared, sent.body.len());
        assert!(String::from_utf8(sent.body.clone()).unwrap().ends_with("client_secret=s%C3%A9cret"));
    }

    #[tokio::test]
    async fn test_exchange_returns_body_untouched() {
        let raw = "{ \"token_type\":\"Bearer\",  \"expires_in\":3599,\"access_token\":\"eyJ0eXAi\" }";
        let http = MockHttp::new(vec![("/token".into(), MockHttp::ok(raw))]);

        let response = exchange(&request("abc", "xyz"), &http).await.unwrap();

        assert_eq!(response.status, 200);
        assert!(response.is_success());
        assert_eq!(response.body, raw);
    }

    #[tokio::test]
    async fn test_exchange_does_not_parse_non_json() {
        let http = MockHttp::new(vec![("/token".into(), MockHttp::ok("not json at all"))]);

        let response = exchange(&request("abc", "xyz"), &http).await.unwrap();
        assert_eq!(response.body, "not json at all");
    }

    #[tokio::test]
    async fn test_exchange_relays_provider_error_status() {
        let raw = r#"{"error":"invalid_client"}"#;
        let http = MockHttp::new(vec![(
            "/token".into(),
            HttpResponse {
                status: 401,
                body: raw.as_bytes().to_vec(),
            },
        )]);

        let response = exchange(&request("abc", "wrong"), &http).await.unwrap();

        assert_eq!(response.status, 401);
        assert!(!response.is_success());
        assert_eq!(response.body, raw);
    }

    #[tokio::test]
    async fn test_handle_transport_failure_single_attempt() {
        let http = MockHttp::failing("tls handshake failed");
        let env = MockEnv::new(
            &[(JWT_URI, TOKEN_URI), (JWT_CLIENT_ID, "abc")],
            &[(JWT_CLIENT_SECRET, "xyz")],
        );

        let err = handle(&http, &env).await.unwrap_err();

        assert!(matches!(err, ApiError::Transport { .. }));
        assert_eq!(http.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_handle_end_to_end() {
        let http = MockHttp::new(vec![("/oauth2/v2.0/token".into(), MockHttp::ok(r#"{"access_token":"t"}"#))]);
        let env = MockEnv::new(
            &[(JWT_URI, TOKEN_URI), (JWT_CLIENT_ID, "abc")],
            &[(JWT_CLIENT_SECRET, "xyz")],
        );

        let response = handle(&http, &env).await.unwrap();

        assert_eq!(response.body, r#"{"access_token":"t"}"#);
        assert_eq!(
            http.requests()[0].body,
            b"grant_type=client_credentials&client_id=abc&client_secret=xyz"
        );
    }
}
