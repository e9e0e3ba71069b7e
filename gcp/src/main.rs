//! idp-adapter: JWKS and client-credentials adapters - GCP Cloud Functions adapter
//!
//! Lightweight HTTP server using hyper, deployable as a GCP Cloud Function or Cloud Run service.
//! Uses single-threaded tokio runtime (compatible with core's !Send async traits);
//! each connection runs as a local task so keep-alive connections do not stall others.

use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use std::rc::Rc;
use tokio::net::TcpListener;
use tokio::task::LocalSet;
use tracing_subscriber::EnvFilter;

use idp_adapter_core::error::{ApiError, ErrorResponse};
use idp_adapter_core::{jwks, token};

mod platform;

use platform::{GcpEnv, ReqwestHttpClient};

/// Shared application state
struct AppState {
    http: ReqwestHttpClient,
    env: GcpEnv,
}

#[derive(Debug, PartialEq, Eq)]
enum Route {
    Health,
    Jwks,
    Token,
    NotFound,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "8080".into())
        .parse()
        .expect("PORT must be a number");

    let state = Rc::new(AppState {
        http: ReqwestHttpClient::new(),
        env: GcpEnv,
    });

    let listener = TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .expect("failed to bind");

    tracing::info!(port, "idp-adapter-gcp listening");

    LocalSet::new().run_until(serve(listener, state)).await;
}

/// Accept connections forever, serving each on its own local task
async fn serve(listener: TcpListener, state: Rc<AppState>) {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!(error = %e, "accept failed");
                continue;
            }
        };
        let state = state.clone();

        tokio::task::spawn_local(async move {
            let io = hyper_util::rt::TokioIo::new(stream);
            let service = service_fn(move |req| {
                let state = state.clone();
                async move { handle_request(req, &state).await }
            });

            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                tracing::warn!(%peer, error = %e, "connection error");
            }
        });
    }
}

type HyperResponse = Response<Full<Bytes>>;

async fn handle_request(
    req: Request<Incoming>,
    state: &AppState,
) -> Result<HyperResponse, std::convert::Infallible> {
    let matched = route(req.method(), req.uri().path());
    tracing::debug!(method = %req.method(), path = req.uri().path(), route = ?matched, "request");

    let response = match matched {
        Route::Health => handle_health(),
        Route::Jwks => handle_jwks(state).await,
        Route::Token => handle_token(state).await,
        Route::NotFound => json_response(StatusCode::NOT_FOUND, &serde_json::json!({"error": "not_found"})),
    };
    Ok(response)
}

/// Map a method and path to a handler; request bodies are ignored
fn route(method: &Method, path: &str) -> Route {
    let readable = *method == Method::GET || *method == Method::POST;
    match path {
        "/" if *method == Method::GET => Route::Health,
        "/jwks" if readable => Route::Jwks,
        "/token" if readable => Route::Token,
        _ => Route::NotFound,
    }
}

fn handle_health() -> HyperResponse {
    json_response(
        StatusCode::OK,
        &serde_json::json!({
            "name": "idp-adapter",
            "platform": "gcp",
            "routes": ["/jwks", "/token"]
        }),
    )
}

async fn handle_jwks(state: &AppState) -> HyperResponse {
    match jwks::handle(&state.http, &state.env).await {
        Ok(document) => json_response(StatusCode::OK, &document),
        Err(e) => error_response(&e),
    }
}

async fn handle_token(state: &AppState) -> HyperResponse {
    match token::handle(&state.http, &state.env).await {
        Ok(response) => {
            let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY);
            raw_response(status, "application/json", response.body.into_bytes())
        }
        Err(e) => error_response(&e),
    }
}

fn error_response(err: &ApiError) -> HyperResponse {
    tracing::error!(error = %err, "request failed");
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = ErrorResponse::from(err);
    json_response(status, &body)
}

fn json_response<T: serde::Serialize>(status: StatusCode, body: &T) -> HyperResponse {
    let json = serde_json::to_vec(body).unwrap_or_default();
    raw_response(status, "application/json", json)
}

fn raw_response(status: StatusCode, content_type: &'static str, body: Vec<u8>) -> HyperResponse {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}
