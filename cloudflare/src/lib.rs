//! idp-adapter: JWKS and client-credentials adapters - Cloudflare Workers adapter

use worker::*;

use idp_adapter_core::error::{ApiError, ErrorResponse};
use idp_adapter_core::{jwks, token};

mod platform;

use platform::{WorkersEnv, WorkersFetchClient};

#[event(fetch)]
async fn main(req: Request, env: Env, _ctx: Context) -> Result<Response> {
    let router = Router::new();

    router
        .get("/", |_, _| handle_health())
        .get_async("/jwks", handle_jwks)
        .post_async("/jwks", handle_jwks)
        .get_async("/token", handle_token)
        .post_async("/token", handle_token)
        .run(req, env)
        .await
}

fn handle_health() -> Result<Response> {
    Response::from_json(&serde_json::json!({
        "name": "idp-adapter",
        "platform": "cloudflare",
        "routes": ["/jwks", "/token"]
    }))
}

async fn handle_jwks(_req: Request, ctx: RouteContext<()>) -> Result<Response> {
    let http = WorkersFetchClient;
    let wenv = WorkersEnv::new(&ctx.env);

    match jwks::handle(&http, &wenv).await {
        Ok(document) => {
            console_log!("served JWKS with {} keys", document.keys.len());
            Response::from_json(&document)
        }
        Err(e) => error_response(&e),
    }
}

async fn handle_token(_req: Request, ctx: RouteContext<()>) -> Result<Response> {
    let http = WorkersFetchClient;
    let wenv = WorkersEnv::new(&ctx.env);

    match token::handle(&http, &wenv).await {
        Ok(response) => {
            console_log!("token endpoint answered {}", response.status);
            let mut headers = Headers::new();
            headers.set("Content-Type", "application/json")?;
            Ok(Response::ok(response.body)?
                .with_headers(headers)
                .with_status(response.status))
        }
        Err(e) => error_response(&e),
    }
}

/// Convert ApiError to worker::Response
fn error_response(err: &ApiError) -> Result<Response> {
    console_error!("request failed: {}", err);
    let status = err.status_code();
    let body = ErrorResponse::from(err);
    Response::from_json(&body).map(|r| r.with_status(status))
}
