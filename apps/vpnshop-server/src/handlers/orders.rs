use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use vpnshop_db::models::UserRole;
use vpnshop_db::{StoreError, UserProfile};
use vpnshop_shared::api::CreateOrderRequest;

/// Registers the mini-app user and opens a pending order for the chosen plan.
pub async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<CreateOrderRequest>,
) -> Response {
    let profile = UserProfile {
        first_name: req.profile.first_name,
        last_name: req.profile.last_name,
        username: req.profile.username,
    };
    let role = if state.admins.is_admin(req.user_id) {
        UserRole::Admin
    } else {
        UserRole::Customer
    };

    if let Err(e) = state.store.upsert_user(req.user_id, &profile, role).await {
        tracing::error!("Failed to upsert user {}: {:#}", req.user_id, e);
        return internal_error();
    }

    match state.store.create_order(req.user_id, req.plan_id).await {
        Ok(order) => {
            tracing::info!(
                "Order #{} created via mini-app for user {} (plan #{})",
                order.id,
                order.user_id,
                order.plan_id
            );
            (StatusCode::CREATED, Json(order)).into_response()
        }
        Err(e) => match e.downcast_ref::<StoreError>() {
            Some(StoreError::PlanUnavailable(id)) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": format!("Plan {} is not available", id) })),
            )
                .into_response(),
            _ => {
                tracing::error!("Failed to create order for user {}: {:#}", req.user_id, e);
                internal_error()
            }
        },
    }
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Failed to create order" })),
    )
        .into_response()
}
