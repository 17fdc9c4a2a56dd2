// src/handlers/counts.rs

use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::storage::{Period, VisitorCounts};
use axum::extract::{Query, State};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

const ENDPOINT: &str = "/api/visitors/count";

#[derive(Debug, Deserialize)]
pub struct CountsQuery {
    pub period: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CountsResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub data: VisitorCounts,
    pub metadata: CountsMetadata,
}

#[derive(Debug, Serialize)]
pub struct CountsMetadata {
    pub endpoint: &'static str,
    pub period: String,
    pub processing_time: String,
}

/// `GET /api/visitors/count?period=<today|week|month|year|all>`
///
/// `all` and an omitted parameter both mean "return all four windows".
/// Any other value is rejected here with 400; the store never sees an
/// unrecognized period.
pub async fn visitor_counts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CountsQuery>,
) -> Result<Json<CountsResponse>> {
    let started = Instant::now();

    let requested = match query.period.as_deref() {
        None | Some("all") => None,
        Some(value) => Some(value.parse::<Period>().map_err(|()| {
            AppError::invalid_request(
                "Invalid period parameter. Must be one of: today, week, month, year, all",
            )
        })?),
    };

    let counts = state.store.visitor_counts(requested).await?;

    Ok(Json(CountsResponse {
        status: "success",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        data: counts,
        metadata: CountsMetadata {
            endpoint: ENDPOINT,
            period: query.period.unwrap_or_else(|| "all".to_string()),
            processing_time: format!("{}ms", started.elapsed().as_millis()),
        },
    }))
}
