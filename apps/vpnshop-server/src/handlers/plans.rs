use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use vpnshop_db::PlanFilter;

/// Plans currently on sale, for the mini-app catalogue.
pub async fn list_plans(State(state): State<AppState>) -> Response {
    match state.store.list_plans(PlanFilter::ActiveOnly).await {
        Ok(plans) => Json(plans).into_response(),
        Err(e) => {
            tracing::error!("Failed to list plans: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to load plans" })),
            )
                .into_response()
        }
    }
}
