//! Streamable HTTP transport, plus the static assets the widget pulls in.
//!
//! Stateless: every `POST /mcp` carries a whole request (or batch) and gets its response in the
//! HTTP response body. No session ids are issued and no server-to-client stream is opened.

use std::{convert::Infallible, path::PathBuf, sync::Arc};

use axum::{
    extract::{FromRef, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response as HttpResponse},
    routing::{get, post},
    Json, Router,
};
use demo_app_protocol::jsonrpc::{ErrorCode, ErrorData, Request, RequestId, Response, ResponseItem};
use tokio::net::TcpListener;
use tower::{Service, ServiceExt};
use tower_http::cors::CorsLayer;

use crate::transport::TransportError;

const PREFLIGHT_MAX_AGE: &str = "86400";

#[derive(Clone)]
struct HttpState<S> {
    service: S,
    assets: AssetRoot,
}

/// Directory the `.js` and `.css` routes read from.
#[derive(Clone)]
struct AssetRoot(Arc<PathBuf>);

impl<S: Clone> FromRef<HttpState<S>> for AssetRoot {
    fn from_ref(state: &HttpState<S>) -> Self {
        state.assets.clone()
    }
}

/// Build the HTTP app around a request-level service.
///
/// Routes:
/// - `POST /mcp`: one JSON-RPC request or batch per body.
/// - `GET /`: a plain-text banner.
/// - `GET|HEAD|OPTIONS /{name}.js` and `/{name}.css`: files from `assets_dir`, with open CORS.
pub fn router<S>(service: S, assets_dir: impl Into<PathBuf>) -> Router
where
    S: Service<Request, Response = Response, Error = Infallible> + Clone + Send + Sync + 'static,
    S::Future: Send + 'static,
{
    let state = HttpState {
        service,
        assets: AssetRoot(Arc::new(assets_dir.into())),
    };

    Router::new()
        .route("/", get(|| async { "Demo MCP server" }))
        .route(
            "/mcp",
            post(handle_messages::<S>).layer(CorsLayer::permissive()),
        )
        .route("/:file", get(serve_asset).options(asset_preflight))
        .with_state(state)
}

/// Serve HTTP connections accepted on `listener` until the listener fails.
pub async fn serve_http<S>(
    listener: TcpListener,
    service: S,
    assets_dir: impl Into<PathBuf>,
) -> Result<(), TransportError>
where
    S: Service<Request, Response = Response, Error = Infallible> + Clone + Send + Sync + 'static,
    S::Future: Send + 'static,
{
    let app = router(service, assets_dir);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn handle_messages<S>(State(state): State<HttpState<S>>, body: String) -> HttpResponse
where
    S: Service<Request, Response = Response, Error = Infallible> + Clone + Send + Sync + 'static,
    S::Future: Send + 'static,
{
    let request: Request = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!(error = %e, "Failed to parse request body");
            let error_data = ErrorData::new(
                ErrorCode::ParseError,
                "JSON parsing error when deserialising the message",
            );
            let msg = ResponseItem::error(RequestId::Null, error_data);
            return (StatusCode::BAD_REQUEST, Json(Response::Single(Some(msg)))).into_response();
        }
    };

    let response = match state.service.oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    if response.is_empty() {
        // Notifications only
        StatusCode::ACCEPTED.into_response()
    } else {
        Json(response).into_response()
    }
}

/// The media type for an asset file name, or `None` if the name isn't servable.
///
/// Only plain `.js` and `.css` names are served: no separators, no leading dot.
fn asset_media_type(file: &str) -> Option<&'static str> {
    let (stem, extension) = file.rsplit_once('.')?;
    let plain = !stem.is_empty()
        && !stem.starts_with('.')
        && stem
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if !plain {
        return None;
    }
    match extension {
        "js" => Some("application/javascript"),
        "css" => Some("text/css"),
        _ => None,
    }
}

fn not_found() -> HttpResponse {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}

async fn serve_asset(
    State(AssetRoot(dir)): State<AssetRoot>,
    Path(file): Path<String>,
) -> HttpResponse {
    let Some(media_type) = asset_media_type(&file) else {
        return not_found();
    };

    let path = dir.join(&file);
    match tokio::fs::read(&path).await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, media_type),
                (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
                (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, OPTIONS"),
                (header::ACCESS_CONTROL_ALLOW_HEADERS, "*"),
            ],
            bytes,
        )
            .into_response(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => not_found(),
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to read asset");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn asset_preflight(Path(file): Path<String>) -> HttpResponse {
    if asset_media_type(&file).is_none() {
        return not_found();
    }
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS, HEAD"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "*"),
            (header::ACCESS_CONTROL_MAX_AGE, PREFLIGHT_MAX_AGE),
        ],
    )
        .into_response()
}
