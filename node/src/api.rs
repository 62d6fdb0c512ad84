//! # Invoke API
//!
//! The axum router in front of the ledger. All handlers share [`AppState`]
//! through axum's `State` extractor.
//!
//! ## Endpoints
//!
//! | Method | Path      | Description                                   |
//! |--------|-----------|-----------------------------------------------|
//! | GET    | `/health` | Liveness probe                                |
//! | GET    | `/status` | Version and wallet count                      |
//! | POST   | `/invoke` | Run one ledger operation, `{function, args}`  |
//!
//! `/invoke` always answers with the ledger's `Response` JSON. The HTTP
//! status mirrors who is at fault: 200 on success, 400 when the request
//! itself was refused, 409 when a concurrent commit won, 500 when the store
//! failed or holds an undecodable record.

use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use wallet_ledger::storage::SledStore;
use wallet_ledger::{invoke, ErrorKind, Ledger, Operation, Response};

use crate::metrics::SharedMetrics;

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub version: String,
    pub store: Arc<SledStore>,
    pub ledger: Arc<Ledger>,
    pub metrics: SharedMetrics,
}

impl AppState {
    fn record(&self, function: &str, response: &Response, elapsed: Duration) {
        let operation = Operation::from_name(function)
            .map(Operation::name)
            .unwrap_or("unknown");
        let outcome = response.kind.map(ErrorKind::as_str).unwrap_or("ok");

        self.metrics
            .invocations_total
            .with_label_values(&[operation, outcome])
            .inc();
        self.metrics
            .invocation_latency_seconds
            .with_label_values(&[operation])
            .observe(elapsed.as_secs_f64());

        if response.kind == Some(ErrorKind::Conflict) {
            self.metrics.commit_conflicts_total.inc();
        }
    }
}

/// `true` for operations that can add a wallet record.
fn creates_wallet(function: &str) -> bool {
    matches!(
        Operation::from_name(function),
        Some(Operation::InitWallet | Operation::CreateWallet)
    )
}

/// Body of `POST /invoke`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeRequest {
    pub function: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub version: String,
    pub wallets: usize,
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/invoke", post(invoke_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// HTTP status for a ledger response.
pub fn http_status(response: &Response) -> StatusCode {
    match response.kind {
        None => StatusCode::OK,
        Some(ErrorKind::Conflict) => StatusCode::CONFLICT,
        Some(kind) if kind.is_client_error() => StatusCode::BAD_REQUEST,
        Some(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /health`
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// `GET /status`
///
/// Reports the `wallets` gauge rather than counting the tree, which is a
/// full scan.
async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(StatusResponse {
        version: state.version.clone(),
        wallets: state.metrics.wallets.get().max(0) as usize,
    })
}

/// `POST /invoke`
///
/// The ledger call does synchronous sled I/O, so it runs on the blocking
/// pool. So does the wallet recount, and only after an operation that
/// can have added a wallet.
async fn invoke_handler(
    State(state): State<AppState>,
    Json(req): Json<InvokeRequest>,
) -> impl IntoResponse {
    let started = Instant::now();
    let function = req.function.clone();

    let task_state = state.clone();
    let joined = tokio::task::spawn_blocking(move || {
        let response = invoke(
            task_state.store.as_ref(),
            &task_state.ledger,
            &req.function,
            &req.args,
        );
        if response.is_success() && creates_wallet(&req.function) {
            let count = task_state.store.account_count();
            task_state.metrics.wallets.set(count as i64);
        }
        response
    })
    .await;

    let response = match joined {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(%function, "invocation task failed: {}", e);
            Response::failure(ErrorKind::Store, "invocation task failed")
        }
    };

    state.record(&function, &response, started.elapsed());
    (http_status(&response), Json(response))
}
