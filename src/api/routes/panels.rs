use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::clamp_limit;
use crate::dashboard::{build_report, require_panel, run_panel, Panel, PanelResult, Report};
use crate::models::DatasetSummary;

#[derive(Debug, Deserialize)]
pub struct PanelParams {
    /// Row limit for ranked panels. Negative values are treated as zero.
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PanelsResponse {
    pub panels: Vec<Panel>,
}

pub async fn summary(State(state): State<AppState>) -> Json<DatasetSummary> {
    Json(state.dataset.summary())
}

pub async fn report(State(state): State<AppState>) -> Result<Json<Report>, ApiError> {
    let report = build_report(&state.dataset, &state.panels)?;
    Ok(Json(report))
}

pub async fn list_panels(State(state): State<AppState>) -> Json<PanelsResponse> {
    Json(PanelsResponse {
        panels: state.panels.as_ref().clone(),
    })
}

pub async fn panel(
    State(state): State<AppState>,
    Path(name): Path<String>,
    params: Result<Query<PanelParams>, QueryRejection>,
) -> Result<Json<PanelResult>, ApiError> {
    let Query(params) = params.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let panel = require_panel(&state.panels, &name)?;
    let result = run_panel(&state.dataset, panel, params.limit.map(clamp_limit))?;
    Ok(Json(result))
}
