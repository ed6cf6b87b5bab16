//! Standby HTTP server
//!
//! A single fallback route serves every method and path through the same
//! normalize → transform → assemble → persist pipeline. The platform's
//! readiness probe is answered before the pipeline and never touches the
//! dataset. A failing request gets an error-shaped 500 and leaves the
//! listener untouched.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::to_bytes,
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::assemble::TransformResult;
use crate::config::Config;
use crate::dataset::DatasetSink;
use crate::mode;
use crate::normalize;
use crate::transform::Engine;
use crate::{Error, Result, actor};

/// Header that marks a readiness probe; any value counts as present
pub const READINESS_PROBE_HEADER: &str = "x-actor-readiness-probe";

/// Fixed readiness reply
pub const READY_BODY: &str = "ready";

/// Upper bound on buffered request bodies
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared per-server state: the read-only registry plus the sink
pub struct AppState {
    /// Transformation engine
    pub engine: Engine,
    /// Dataset sink
    pub sink: Arc<dyn DatasetSink>,
}

/// A standby response: the result record plus the request echo
#[derive(Serialize)]
struct StandbyResponse {
    #[serde(flatten)]
    result: TransformResult,
    method: String,
    url: String,
}

/// Create the router
pub fn create_router(state: Arc<AppState>, request_timeout: std::time::Duration) -> Router {
    Router::new()
        .fallback(transform_handler)
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Catch-all handler: probe fast path, then the pipeline
async fn transform_handler(State(state): State<Arc<AppState>>, request: Request) -> Response {
    if request.headers().contains_key(READINESS_PROBE_HEADER) {
        return (StatusCode::OK, READY_BODY).into_response();
    }

    let method = request.method().to_string();
    let url = request.uri().to_string();
    let query = request.uri().query().map(ToString::to_string);
    let content_type = request
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);

    let body = match to_bytes(request.into_body(), MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "Failed to read request body");
            return error_response(StatusCode::PAYLOAD_TOO_LARGE, &format!("body read: {e}"));
        }
    };

    let normalized = normalize::from_http_parts(query.as_deref(), content_type.as_deref(), &body);

    match actor::run_pipeline(&state.engine, &state.sink, &normalized).await {
        Ok(result) => Json(StandbyResponse {
            result,
            method,
            url,
        })
        .into_response(),
        Err(e) => {
            error!(error = %e, transform = %normalized.transform, "Request pipeline failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({
            "status": "error",
            "error": message,
        })),
    )
        .into_response()
}

/// Bind and serve until the process is shut down
pub async fn run(config: &Config, engine: Engine, sink: Arc<dyn DatasetSink>) -> Result<()> {
    let port = mode::standby_port(&config.server);
    let addr = SocketAddr::new(
        config
            .server
            .host
            .parse()
            .map_err(|e| Error::Config(format!("Invalid host: {e}")))?,
        port,
    );

    let state = Arc::new(AppState { engine, sink });
    let app = create_router(state, config.server.request_timeout());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(host = %config.server.host, port = port, "Standby server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Standby server stopped");
    Ok(())
}

/// Resolve on ctrl-c or SIGTERM (the platform stops actors with SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
