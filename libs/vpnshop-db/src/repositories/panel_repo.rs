use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::PanelCredential;
use crate::store::PanelLogin;

#[derive(Debug, Clone)]
pub struct PanelRepository {
    pool: PgPool,
}

impl PanelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_user(&self, user_id: i64) -> Result<Option<PanelCredential>> {
        sqlx::query_as::<_, PanelCredential>("SELECT * FROM panels WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch panel credential")
    }

    pub async fn upsert(&self, user_id: i64, login: &PanelLogin) -> Result<PanelCredential> {
        sqlx::query_as::<_, PanelCredential>(
            r#"
            INSERT INTO panels (user_id, url, username, password)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE SET
                url = excluded.url,
                username = excluded.username,
                password = excluded.password,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&login.url)
        .bind(&login.username)
        .bind(&login.password)
        .fetch_one(&self.pool)
        .await
        .context("Failed to upsert panel credential")
    }
}
