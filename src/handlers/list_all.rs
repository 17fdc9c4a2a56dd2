// src/handlers/list_all.rs

use crate::error::Result;
use crate::state::AppState;
use crate::storage::Visitor;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct AllVisitorsResponse {
    pub status: &'static str,
    pub data: Vec<Visitor>,
    pub count: usize,
}

/// `GET /api/visitors/all`
///
/// The full listing in insertion order, plus its size. No pagination;
/// unbounded growth is accepted.
pub async fn all_visitors(State(state): State<Arc<AppState>>) -> Result<Json<AllVisitorsResponse>> {
    let visitors = state.store.all_visitors().await?;
    let count = visitors.len();
    Ok(Json(AllVisitorsResponse {
        status: "success",
        data: visitors,
        count,
    }))
}
