// src/handlers/track.rs

use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::storage::NewVisitor;
use axum::body::Bytes;
use axum::extract::{ConnectInfo, State};
use axum::http::header::USER_AGENT;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TrackVisitorRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "page is required and must not be empty"))]
    pub page: String,
    #[serde(default)]
    pub referrer: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TrackVisitorResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub visitor_id: String,
    pub metadata: TrackMetadata,
}

#[derive(Debug, Serialize)]
pub struct TrackMetadata {
    pub processing_time: String,
}

/// `POST /api/visitors/track`
///
/// The body is read as raw bytes and parsed as JSON whatever the declared
/// content type: beacon clients send their payload as `text/plain`.
/// A missing `ip` falls back to the peer address, a missing `userAgent` to
/// the request header, and both to the literal `"unknown"`.
pub async fn track_visitor(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<TrackVisitorResponse>> {
    let started = Instant::now();

    let request: TrackVisitorRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::invalid_request(format!("Invalid request data: {e}")))?;
    request.validate()?;

    let ip = request
        .ip
        .filter(|ip| !ip.is_empty())
        .or_else(|| connect_info.map(|ConnectInfo(addr)| addr.ip().to_string()))
        .or_else(|| Some("unknown".to_string()));
    let user_agent = request
        .user_agent
        .filter(|ua| !ua.is_empty())
        .or_else(|| {
            headers
                .get(USER_AGENT)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        })
        .or_else(|| Some("unknown".to_string()));

    let visitor = state
        .store
        .track_visitor(NewVisitor {
            user_id: request.user_id,
            page: request.page,
            referrer: request.referrer,
            user_agent,
            ip,
        })
        .await?;

    Ok(Json(TrackVisitorResponse {
        status: "success",
        message: "Visitor tracked successfully",
        visitor_id: visitor.id,
        metadata: TrackMetadata {
            processing_time: format!("{}ms", started.elapsed().as_millis()),
        },
    }))
}
