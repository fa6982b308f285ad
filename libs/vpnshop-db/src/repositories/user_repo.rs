use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::{User, UserRole};
use crate::store::UserProfile;

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch user by ID")
    }

    /// Inserts the user or refreshes the profile and role of an existing one.
    pub async fn upsert(&self, id: i64, profile: &UserProfile, role: UserRole) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, first_name, last_name, username, role)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                username = excluded.username,
                role = excluded.role,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(profile.first_name.as_deref())
        .bind(profile.last_name.as_deref())
        .bind(profile.username.as_deref())
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .context("Failed to upsert user")
    }
}
