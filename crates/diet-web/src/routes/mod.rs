pub mod meals;
pub mod users;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use diet_core::storage::MealStore;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::session;
use crate::AppState;

/// Build the complete application router.
///
/// Every meal and user route runs behind the session middleware, so the
/// caller is always resolved (and a cookie issued on first contact).
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .merge(meals::routes())
        .merge(users::routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::session_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    let db_ok = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(unavailable = e.is_unavailable(), "health check failed: {e}");
            false
        }
    };

    let status = if db_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(serde_json::json!({
            "status": if db_ok { "ok" } else { "degraded" },
            "storage": if db_ok { "connected" } else { "unavailable" },
        })),
    )
}

async fn not_found() -> ApiError {
    ApiError::not_found("route not found")
}
