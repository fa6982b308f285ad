use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::{Order, OrderStatus};

#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: i64, plan_id: i64, amount: i64) -> Result<Order> {
        sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (user_id, plan_id, amount, status)
            VALUES ($1, $2, $3, 'pending')
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(plan_id)
        .bind(amount)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create order")
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Order>> {
        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch order by ID")
    }

    pub async fn set_status(&self, id: i64, status: OrderStatus) -> Result<Option<Order>> {
        sqlx::query_as::<_, Order>(
            "UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update order status")
    }
}
