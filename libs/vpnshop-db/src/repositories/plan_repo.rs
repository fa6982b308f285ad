use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::Plan;
use crate::store::{NewPlan, PlanFilter};

#[derive(Debug, Clone)]
pub struct PlanRepository {
    pool: PgPool,
}

impl PlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, plan: &NewPlan) -> Result<Plan> {
        sqlx::query_as::<_, Plan>(
            r#"
            INSERT INTO plans (title, description, price, duration_days, data_limit, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&plan.title)
        .bind(&plan.description)
        .bind(plan.price)
        .bind(plan.duration_days)
        .bind(plan.data_limit)
        .bind(plan.is_active)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create plan")
    }

    pub async fn list(&self, filter: PlanFilter) -> Result<Vec<Plan>> {
        let sql = match filter {
            PlanFilter::All => "SELECT * FROM plans ORDER BY id",
            PlanFilter::ActiveOnly => "SELECT * FROM plans WHERE is_active = TRUE ORDER BY id",
        };
        sqlx::query_as::<_, Plan>(sql)
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch plans")
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Plan>> {
        sqlx::query_as::<_, Plan>("SELECT * FROM plans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch plan by ID")
    }
}
