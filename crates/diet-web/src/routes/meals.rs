use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::header::LOCATION;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::{Extension, Router};
use diet_core::metrics::{self, MealMetrics};
use diet_core::model::{validate_meal_input, Meal, MealInput};
use diet_core::storage::{MealStore, OwnerScope};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::session::Caller;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/meals", get(list_meals).post(create_meal))
        .route("/meals/metrics", get(get_metrics))
        .route(
            "/meals/{id}",
            get(get_meal).put(update_meal).delete(delete_meal),
        )
}

// -- Response types --

#[derive(Debug, Serialize, Deserialize)]
pub struct MealListResponse {
    pub meals: Vec<Meal>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MealResponse {
    pub meal: Meal,
}

// -- Helpers --

/// Scope for id-addressed operations. Unless ownership is enforced, any
/// caller holding a meal id can act on it.
fn id_scope<'a>(state: &AppState, caller: &'a Caller) -> OwnerScope<'a> {
    if state.config.session.enforce_ownership {
        OwnerScope::Only(&caller.session)
    } else {
        OwnerScope::Any
    }
}

// -- Handlers --

async fn list_meals(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<MealListResponse>, ApiError> {
    let meals = state.store.list_meals(&caller.session).await?;
    Ok(Json(MealListResponse { meals }))
}

async fn create_meal(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<MealInput>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(input) = payload?;
    validate_meal_input(&input)?;

    let id = state.store.create_meal(&caller.session, &input).await?;

    Ok((StatusCode::CREATED, [(LOCATION, format!("/meals/{id}"))]).into_response())
}

async fn get_meal(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<MealResponse>, ApiError> {
    let Path(id) = id?;
    let meal = state.store.get_meal(id, id_scope(&state, &caller)).await?;
    Ok(Json(MealResponse { meal }))
}

async fn update_meal(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<MealInput>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    let Json(input) = payload?;
    validate_meal_input(&input)?;

    state
        .store
        .update_meal(id, id_scope(&state, &caller), &input)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn delete_meal(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    state
        .store
        .delete_meal(id, id_scope(&state, &caller))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_metrics(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<MealMetrics>, ApiError> {
    let metrics = metrics::owner_metrics(&state.store, &caller.session).await?;
    Ok(Json(metrics))
}
