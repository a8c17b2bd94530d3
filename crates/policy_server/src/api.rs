//! REST API for policies.
//!
//! # Routes
//! - `POST /policies`: create a policy (400 with `{"error": ...}` on rule failure).
//! - `GET /policies`: every policy with its notes.
//! - `GET /policies/:id`: one policy with its notes, or 404.
//! - `POST /policies/export?startDate=&endDate=`: policies starting in range;
//!   either bound may be omitted.
//! - `GET /health`: liveness and version.
//!
//! Handlers only decode/encode; all rules live in `PolicyService`.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, Request, State};
use axum::http::HeaderValue;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use log::{debug, info};
use policy_core::model::date::deserialize_flexible;
use policy_core::{core_version, NewPolicy, PolicyId, PolicyRecord};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::time::Instant;
use uuid::Uuid;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Query parameters for the export route.
///
/// An omitted bound leaves that side of the range open.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportQuery {
    #[serde(default = "open_start", deserialize_with = "deserialize_flexible")]
    pub start_date: NaiveDate,
    #[serde(default = "open_end", deserialize_with = "deserialize_flexible")]
    pub end_date: NaiveDate,
}

fn open_start() -> NaiveDate {
    NaiveDate::MIN
}

fn open_end() -> NaiveDate {
    NaiveDate::MAX
}

/// Builds the application router over shared state.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/policies", post(create_policy).get(list_policies))
        .route("/policies/export", post(export_policies))
        .route("/policies/:id", get(get_policy))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

/// Binds `addr` and serves until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        "event=server_start module=api status=ok addr={}",
        listener.local_addr()?
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=api status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("event=server_stop module=api status=error error={err}");
    }
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok", "version": core_version() }))
}

/// POST /policies
async fn create_policy(
    State(state): State<AppState>,
    payload: Result<Json<NewPolicy>, JsonRejection>,
) -> Result<Json<PolicyRecord>, ApiError> {
    let Json(input) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let created = state
        .with_policies(move |service| service.create_policy(&input))
        .await?;
    Ok(Json(created))
}

/// GET /policies
async fn list_policies(State(state): State<AppState>) -> Result<Json<Vec<PolicyRecord>>, ApiError> {
    let policies = state.with_policies(|service| service.read_policies()).await?;
    Ok(Json(policies))
}

/// GET /policies/:id
async fn get_policy(
    State(state): State<AppState>,
    id: Result<Path<PolicyId>, PathRejection>,
) -> Result<Json<PolicyRecord>, ApiError> {
    let Path(id) = id.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    state
        .with_policies(move |service| service.read_policy(id))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Policy {id} not found")))
}

/// POST /policies/export?startDate=&endDate=
async fn export_policies(
    State(state): State<AppState>,
    query: Result<Query<ExportQuery>, QueryRejection>,
) -> Result<Json<Vec<PolicyRecord>>, ApiError> {
    let Query(range) = query.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    debug!(
        "event=policy_export module=api status=start start={} end={}",
        range.start_date, range.end_date
    );
    let policies = state
        .with_policies(move |service| {
            service.read_policies_by_start_date(range.start_date, range.end_date)
        })
        .await?;
    Ok(Json(policies))
}

async fn log_requests(request: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let request_id = Uuid::new_v4();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    info!(
        "event=http_request module=api status={} method={method} path={path} duration_ms={} request_id={request_id}",
        response.status().as_u16(),
        started_at.elapsed().as_millis()
    );
    response
}
