use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{PlanResponse, RoutineRequest, RoutineResponse},
};

use super::AppState;

#[derive(Debug, Serialize)]
pub struct ConditionIngredientsResponse {
    pub condition: String,
    pub ingredients: Vec<String>,
}

fn parse_request(body: Result<Json<RoutineRequest>, JsonRejection>) -> AppResult<RoutineRequest> {
    body.map(|Json(request)| request)
        .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Builds a full routine with one product per scored stage
pub async fn recommend_routine(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    body: Result<Json<RoutineRequest>, JsonRejection>,
) -> AppResult<Json<RoutineResponse>> {
    let profile = parse_request(body)?.into_profile()?;

    tracing::info!(
        request_id = %request_id,
        skin_type = %profile.skin_type,
        conditions = ?profile.conditions,
        "Processing routine request"
    );

    let response = state.engine.recommend(&profile).await?;

    tracing::info!(
        request_id = %request_id,
        code = %response.taxonomy_code,
        selected = response.recommendations.len(),
        "Routine request completed"
    );

    Ok(Json(response))
}

/// Taxonomy code and planned steps only
pub async fn plan_routine(
    State(state): State<AppState>,
    body: Result<Json<RoutineRequest>, JsonRejection>,
) -> AppResult<Json<PlanResponse>> {
    let profile = parse_request(body)?.into_profile()?;
    Ok(Json(state.engine.plan(&profile)?))
}

/// Ingredients linked to a condition in the knowledge graph
pub async fn condition_ingredients(
    State(state): State<AppState>,
    Path(condition): Path<String>,
) -> Json<ConditionIngredientsResponse> {
    let mut ingredients = state.engine.graph().ingredients_for(&condition);
    ingredients.sort();

    Json(ConditionIngredientsResponse {
        condition,
        ingredients,
    })
}
