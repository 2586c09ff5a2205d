use std::{process, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, Request, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::{
    buildinfo,
    config::Config,
    instrument::{Instrumentation, Metrics},
    introspect, prober,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub instr: Instrumentation,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let instr = Instrumentation::new(format!("netdiag-{}", config.instance_label()));
        Self {
            config: Arc::new(config),
            instr,
        }
    }
}

/// Build the main diagnostic router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(hello))
        .route("/api/test/{host}/{port}", get(connect_test))
        .route("/dump", any(dump))
        .route("/build", any(build))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the metrics exposition router served by the secondary listener.
pub fn metrics_router(metrics: Arc<Metrics>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_text))
        .with_state(metrics)
}

/// Bind both listeners and serve until the process exits.
///
/// A bind failure on the main listener is fatal and propagates; the metrics
/// listener runs as a background task and terminates the process if it fails,
/// since operating without metrics exposition is not a supported mode.
pub async fn serve(config: Config) -> Result<()> {
    let state = AppState::new(config);
    let metrics = state.instr.metrics();

    let metrics_addr = format!("0.0.0.0:{}", state.config.metrics_port);
    let metrics_app = metrics_router(metrics);
    tokio::spawn(async move {
        let res: std::io::Result<()> = async {
            let listener = TcpListener::bind(&metrics_addr).await?;
            info!("metrics listener on {metrics_addr}");
            axum::serve(listener, metrics_app).await
        }
        .await;
        if let Err(e) = res {
            error!("metrics listener failed: {e}");
            process::exit(1);
        }
    });

    let addr = format!("0.0.0.0:{}", state.config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening on {addr}");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn hello(State(app): State<AppState>, uri: Uri) -> impl IntoResponse {
    let mut span = app.instr.start_span("hello");
    span.set_attribute("uri", uri.to_string());
    format!(
        "Hello from instance \"{}\"! You've requested: {}\n",
        app.config.instance_label(),
        uri
    )
}

async fn connect_test(
    State(app): State<AppState>,
    Path((host, port)): Path<(String, String)>,
) -> impl IntoResponse {
    let mut span = app.instr.start_span("probe");
    span.set_attribute("target", format!("{host}:{port}"));

    let results = prober::probe(&host, std::slice::from_ref(&port)).await;

    // A closed port is content, not an instrumentation failure; the span
    // outcome stays ok and only carries the first target's status.
    if let Some(first) = results.first() {
        span.set_attribute("result", first.status.clone());
    }
    Json(results)
}

#[derive(Debug, Deserialize)]
struct DumpParams {
    wait: Option<String>,
}

async fn dump(
    State(app): State<AppState>,
    Query(params): Query<DumpParams>,
    req: Request,
) -> Response {
    let mut span = app.instr.start_span("request-dumper");

    // Artificial wait; non-blocking for other in-flight requests.
    let pause = introspect::parse_wait(params.wait.as_deref());
    if !pause.is_zero() {
        tokio::time::sleep(pause).await;
    }

    match introspect::dump_request(req).await {
        Ok(bytes) => {
            span.set_outcome(format!("dumped {} bytes", bytes.len()));
            String::from_utf8_lossy(&bytes).into_owned().into_response()
        }
        Err(e) => {
            span.set_outcome(format!("error: {e:#}"));
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": format!("{e:#}") })),
            )
                .into_response()
        }
    }
}

async fn build(State(app): State<AppState>) -> Response {
    let mut span = app.instr.start_span("info-dumper");
    match buildinfo::build_info() {
        Some(text) => (StatusCode::OK, text).into_response(),
        None => {
            span.set_outcome("error: build info not available");
            (StatusCode::INTERNAL_SERVER_ERROR, "build info not available").into_response()
        }
    }
}

async fn metrics_text(State(metrics): State<Arc<Metrics>>) -> String {
    metrics.render_text()
}
