use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::{Extension, Router};
use diet_core::model::{validate_profile_input, UserProfile};
use diet_core::storage::MealStore;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::session::Caller;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", post(register_user))
        .route("/users/me", get(current_user))
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RegisterUserRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: UserProfile,
}

/// Attach a name and email to the caller's session. The session cookie
/// itself is issued by the session middleware on first contact.
async fn register_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<RegisterUserRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(input) = payload?;
    validate_profile_input(&input.name, &input.email)?;

    let profile = UserProfile::new(
        input.name.trim().to_string(),
        input.email.trim().to_string(),
    );
    state.store.save_profile(&caller.session, &profile).await?;

    tracing::info!(session = %caller.session, "user profile registered");
    Ok(StatusCode::CREATED)
}

async fn current_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.store.get_profile(&caller.session).await?;
    Ok(Json(UserResponse { user }))
}
