use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use vpnshop_db::models::OrderStatus;
use vpnshop_shared::api::{PaymentWebhook, WebhookAck};

fn status_for(gateway_status: &str) -> Option<OrderStatus> {
    match gateway_status.trim().to_ascii_lowercase().as_str() {
        "success" => Some(OrderStatus::Paid),
        "failed" | "canceled" | "cancelled" => Some(OrderStatus::Failed),
        _ => None,
    }
}

/// Payment gateway callback. Always acknowledged so the gateway stops retrying;
/// problems, including unreadable bodies, are only logged.
pub async fn payment_webhook(
    State(state): State<AppState>,
    payload: Result<Json<PaymentWebhook>, JsonRejection>,
) -> Json<WebhookAck> {
    let ack = Json(WebhookAck { received: true });

    let hook = match payload {
        Ok(Json(hook)) => hook,
        Err(rejection) => {
            tracing::warn!("Ignoring unreadable payment webhook: {}", rejection.body_text());
            return ack;
        }
    };

    let Some(status) = status_for(&hook.status) else {
        tracing::warn!(
            "Ignoring payment webhook for order #{} with status '{}'",
            hook.order_id,
            hook.status
        );
        return ack;
    };

    match state.store.set_order_status(hook.order_id, status).await {
        Ok(Some(order)) if order.status == OrderStatus::Paid => {
            tracing::info!(
                "Order #{} paid; config delivery for user {} is pending",
                order.id,
                order.user_id
            );
        }
        Ok(Some(order)) => {
            tracing::info!("Order #{} marked {}", order.id, order.status.as_str());
        }
        Ok(None) => {
            tracing::warn!("Payment webhook for unknown order #{}", hook.order_id);
        }
        Err(e) => {
            tracing::error!("Failed to update order #{}: {:#}", hook.order_id, e);
        }
    }

    ack
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_statuses() {
        assert_eq!(status_for("success"), Some(OrderStatus::Paid));
        assert_eq!(status_for("FAILED"), Some(OrderStatus::Failed));
        assert_eq!(status_for("canceled"), Some(OrderStatus::Failed));
        assert_eq!(status_for("pending"), None);
    }
}
