//! Knowledge base handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::{AppError, AppState};
use niti_core::wisdom::{Principle, PrincipleInsight};

/// Response for the health check
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub principles: usize,
    pub scenarios: usize,
}

/// A principle together with its hand-authored insight (if any)
#[derive(Debug, Serialize)]
pub struct PrincipleDetail {
    #[serde(flatten)]
    pub principle: Principle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insight: Option<PrincipleInsight>,
}

/// GET /api/health - Liveness plus knowledge base size
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let knowledge = state.advisor.knowledge();
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        principles: knowledge.principles().len(),
        scenarios: knowledge.scenarios().len(),
    })
}

/// GET /api/principles - All principles in knowledge base order
pub async fn list_principles(State(state): State<Arc<AppState>>) -> Json<Vec<Principle>> {
    Json(state.advisor.knowledge().principles().to_vec())
}

/// GET /api/principles/:id - One principle with its insight
pub async fn get_principle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PrincipleDetail>, AppError> {
    let knowledge = state.advisor.knowledge();
    let principle = knowledge
        .principle(&id)
        .ok_or_else(|| AppError::not_found("Principle not found"))?;

    Ok(Json(PrincipleDetail {
        principle: principle.clone(),
        insight: knowledge.insight(&id).cloned(),
    }))
}
