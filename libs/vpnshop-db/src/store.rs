use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;

use crate::models::{Order, OrderStatus, PanelCredential, Plan, User, UserRole};
use crate::repositories::{OrderRepository, PanelRepository, PlanRepository, UserRepository};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPlan {
    pub title: String,
    pub description: String,
    pub price: i64,
    pub duration_days: i32,
    pub data_limit: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanFilter {
    #[default]
    All,
    ActiveOnly,
}

#[derive(Clone, PartialEq, Eq)]
pub struct PanelLogin {
    pub url: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for PanelLogin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelLogin")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Failures callers are expected to branch on. Everything else is plain `anyhow`.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("plan {0} does not exist or is not on sale")]
    PlanUnavailable(i64),
    #[error("user {0} is not registered")]
    UnknownUser(i64),
}

/// Persistence used by the bot and the HTTP server.
#[async_trait]
pub trait Storefront: Send + Sync {
    async fn upsert_user(&self, id: i64, profile: &UserProfile, role: UserRole) -> Result<User>;
    async fn create_plan(&self, plan: NewPlan) -> Result<Plan>;
    async fn list_plans(&self, filter: PlanFilter) -> Result<Vec<Plan>>;
    async fn get_plan(&self, id: i64) -> Result<Option<Plan>>;
    async fn upsert_panel_credential(&self, admin_id: i64, login: &PanelLogin)
    -> Result<PanelCredential>;
    async fn get_panel_credential(&self, admin_id: i64) -> Result<Option<PanelCredential>>;
    /// Creates a pending order priced from the plan. Fails with
    /// [`StoreError::PlanUnavailable`] for unknown or inactive plans.
    async fn create_order(&self, user_id: i64, plan_id: i64) -> Result<Order>;
    async fn get_order(&self, id: i64) -> Result<Option<Order>>;
    async fn set_order_status(&self, id: i64, status: OrderStatus) -> Result<Option<Order>>;
}

#[derive(Debug, Clone)]
pub struct PgStore {
    users: UserRepository,
    plans: PlanRepository,
    panels: PanelRepository,
    orders: OrderRepository,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            plans: PlanRepository::new(pool.clone()),
            panels: PanelRepository::new(pool.clone()),
            orders: OrderRepository::new(pool),
        }
    }
}

#[async_trait]
impl Storefront for PgStore {
    async fn upsert_user(&self, id: i64, profile: &UserProfile, role: UserRole) -> Result<User> {
        self.users.upsert(id, profile, role).await
    }

    async fn create_plan(&self, plan: NewPlan) -> Result<Plan> {
        let plan = self.plans.create(&plan).await?;
        tracing::info!("Plan #{} '{}' created", plan.id, plan.title);
        Ok(plan)
    }

    async fn list_plans(&self, filter: PlanFilter) -> Result<Vec<Plan>> {
        self.plans.list(filter).await
    }

    async fn get_plan(&self, id: i64) -> Result<Option<Plan>> {
        self.plans.get_by_id(id).await
    }

    async fn upsert_panel_credential(
        &self,
        admin_id: i64,
        login: &PanelLogin,
    ) -> Result<PanelCredential> {
        self.panels.upsert(admin_id, login).await
    }

    async fn get_panel_credential(&self, admin_id: i64) -> Result<Option<PanelCredential>> {
        self.panels.get_by_user(admin_id).await
    }

    async fn create_order(&self, user_id: i64, plan_id: i64) -> Result<Order> {
        let plan = match self.plans.get_by_id(plan_id).await? {
            Some(plan) if plan.is_active => plan,
            _ => return Err(StoreError::PlanUnavailable(plan_id).into()),
        };
        if self.users.get_by_id(user_id).await?.is_none() {
            return Err(StoreError::UnknownUser(user_id).into());
        }
        self.orders.create(user_id, plan.id, plan.price).await
    }

    async fn get_order(&self, id: i64) -> Result<Option<Order>> {
        self.orders.get_by_id(id).await
    }

    async fn set_order_status(&self, id: i64, status: OrderStatus) -> Result<Option<Order>> {
        self.orders.set_status(id, status).await
    }
}
