//! REST handlers for the jobradar API.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use jobradar_core::Source;
use jobradar_db::RunTrigger;
use tracing::warn;

use crate::AppState;

fn unknown_source(raw: &str) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({
            "error": format!("unknown source '{raw}'"),
            "known_sources": Source::ALL.iter().map(Source::as_str).collect::<Vec<_>>(),
        })),
    )
        .into_response()
}

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(()) => Json(serde_json::json!({ "status": "ok" })).into_response(),
        Err(e) => {
            warn!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "status": "unavailable" })),
            )
                .into_response()
        }
    }
}

pub async fn api_jobs(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.list_all().await {
        Ok(jobs) => Json(serde_json::json!({
            "count": jobs.len(),
            "jobs": jobs,
        }))
        .into_response(),
        Err(e) => {
            warn!(error = %e, "failed to list jobs");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn api_jobs_by_source(
    State(state): State<Arc<AppState>>,
    Path(source): Path<String>,
) -> impl IntoResponse {
    let Ok(source) = source.parse::<Source>() else {
        return unknown_source(&source);
    };

    match state.store.list_by_source(source).await {
        Ok(jobs) => Json(serde_json::json!({
            "source": source.as_str(),
            "count": jobs.len(),
            "jobs": jobs,
        }))
        .into_response(),
        Err(e) => {
            warn!(source = %source, error = %e, "failed to list jobs by source");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn api_scrape_source(
    State(state): State<Arc<AppState>>,
    Path(source): Path<String>,
) -> impl IntoResponse {
    let Ok(source) = source.parse::<Source>() else {
        return unknown_source(&source);
    };

    // A failed run degrades to the persisted set; the caller always gets
    // the current jobs back, with the run error noted alongside.
    let error = match state.orchestrator.run_source(source, RunTrigger::Manual).await {
        Ok(report) => {
            let jobs = state.store.list_all().await.unwrap_or_default();
            return Json(serde_json::json!({
                "report": report,
                "count": jobs.len(),
                "jobs": jobs,
            }))
            .into_response();
        }
        Err(e) => {
            warn!(source = %source, error = %e, "manual scrape failed");
            e.to_string()
        }
    };

    let jobs = state.store.list_all().await.unwrap_or_default();
    Json(serde_json::json!({
        "error": error,
        "count": jobs.len(),
        "jobs": jobs,
    }))
    .into_response()
}

pub async fn api_scrape_all(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    // Shares the scheduler's guard; a cycle in flight is never stacked on
    let Some(_permit) = state.guard.try_acquire() else {
        return (
            StatusCode::CONFLICT,
            Json(serde_json::json!({ "error": "a scrape cycle is already running" })),
        )
            .into_response();
    };

    let summary = state.orchestrator.run_all(RunTrigger::Manual).await;
    Json(serde_json::json!({ "summary": summary })).into_response()
}

pub async fn api_runs(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.list_recent_runs(50).await {
        Ok(runs) => Json(serde_json::json!({ "runs": runs })).into_response(),
        Err(e) => {
            warn!(error = %e, "failed to list scrape runs");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
