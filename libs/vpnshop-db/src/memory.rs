use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::models::{Order, OrderStatus, PanelCredential, Plan, User, UserRole};
use crate::store::{NewPlan, PanelLogin, PlanFilter, StoreError, Storefront, UserProfile};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    plans: BTreeMap<i64, Plan>,
    panels: BTreeMap<i64, PanelCredential>,
    orders: BTreeMap<i64, Order>,
    next_plan_id: i64,
    next_panel_id: i64,
    next_order_id: i64,
}

/// Process-local [`Storefront`] for tests and database-less local runs.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storefront for MemoryStore {
    async fn upsert_user(&self, id: i64, profile: &UserProfile, role: UserRole) -> Result<User> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let user = tables.users.entry(id).or_insert_with(|| User {
            id,
            first_name: None,
            last_name: None,
            username: None,
            role,
            created_at: now,
            updated_at: now,
        });
        user.first_name = profile.first_name.clone();
        user.last_name = profile.last_name.clone();
        user.username = profile.username.clone();
        user.role = role;
        user.updated_at = now;
        Ok(user.clone())
    }

    async fn create_plan(&self, plan: NewPlan) -> Result<Plan> {
        let mut tables = self.tables.write().await;
        tables.next_plan_id += 1;
        let plan = Plan {
            id: tables.next_plan_id,
            title: plan.title,
            description: plan.description,
            price: plan.price,
            duration_days: plan.duration_days,
            data_limit: plan.data_limit,
            is_active: plan.is_active,
            created_at: Utc::now(),
        };
        tables.plans.insert(plan.id, plan.clone());
        Ok(plan)
    }

    async fn list_plans(&self, filter: PlanFilter) -> Result<Vec<Plan>> {
        let tables = self.tables.read().await;
        Ok(tables
            .plans
            .values()
            .filter(|p| filter == PlanFilter::All || p.is_active)
            .cloned()
            .collect())
    }

    async fn get_plan(&self, id: i64) -> Result<Option<Plan>> {
        Ok(self.tables.read().await.plans.get(&id).cloned())
    }

    async fn upsert_panel_credential(
        &self,
        admin_id: i64,
        login: &PanelLogin,
    ) -> Result<PanelCredential> {
        let mut tables = self.tables.write().await;
        let id = match tables.panels.get(&admin_id) {
            Some(existing) => existing.id,
            None => {
                tables.next_panel_id += 1;
                tables.next_panel_id
            }
        };
        let cred = PanelCredential {
            id,
            user_id: admin_id,
            url: login.url.clone(),
            username: login.username.clone(),
            password: login.password.clone(),
            updated_at: Utc::now(),
        };
        tables.panels.insert(admin_id, cred.clone());
        Ok(cred)
    }

    async fn get_panel_credential(&self, admin_id: i64) -> Result<Option<PanelCredential>> {
        Ok(self.tables.read().await.panels.get(&admin_id).cloned())
    }

    async fn create_order(&self, user_id: i64, plan_id: i64) -> Result<Order> {
        let mut tables = self.tables.write().await;
        let amount = match tables.plans.get(&plan_id) {
            Some(plan) if plan.is_active => plan.price,
            _ => return Err(StoreError::PlanUnavailable(plan_id).into()),
        };
        if !tables.users.contains_key(&user_id) {
            return Err(StoreError::UnknownUser(user_id).into());
        }
        tables.next_order_id += 1;
        let now = Utc::now();
        let order = Order {
            id: tables.next_order_id,
            user_id,
            plan_id,
            amount,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        tables.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get_order(&self, id: i64) -> Result<Option<Order>> {
        Ok(self.tables.read().await.orders.get(&id).cloned())
    }

    async fn set_order_status(&self, id: i64, status: OrderStatus) -> Result<Option<Order>> {
        let mut tables = self.tables.write().await;
        Ok(tables.orders.get_mut(&id).map(|order| {
            order.status = status;
            order.updated_at = Utc::now();
            order.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(title: &str, active: bool) -> NewPlan {
        NewPlan {
            title: title.into(),
            description: "desc".into(),
            price: 100_000,
            duration_days: 30,
            data_limit: 10 * crate::models::BYTES_PER_GB,
            is_active: active,
        }
    }

    fn login(url: &str) -> PanelLogin {
        PanelLogin {
            url: url.into(),
            username: "admin".into(),
            password: "secret".into(),
        }
    }

    #[tokio::test]
    async fn list_plans_filters_inactive() {
        let store = MemoryStore::new();
        store.create_plan(plan("Gold", true)).await.unwrap();
        store.create_plan(plan("Old", false)).await.unwrap();

        assert_eq!(store.list_plans(PlanFilter::All).await.unwrap().len(), 2);
        let active = store.list_plans(PlanFilter::ActiveOnly).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].title, "Gold");
    }

    #[tokio::test]
    async fn panel_credential_upsert_overwrites() {
        let store = MemoryStore::new();
        let first = store
            .upsert_panel_credential(7, &login("https://a.example"))
            .await
            .unwrap();
        let second = store
            .upsert_panel_credential(7, &login("https://b.example"))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        let stored = store.get_panel_credential(7).await.unwrap().unwrap();
        assert_eq!(stored.url, "https://b.example");
        assert!(store.get_panel_credential(8).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn order_requires_active_plan_and_user() {
        let store = MemoryStore::new();
        let gold = store.create_plan(plan("Gold", true)).await.unwrap();
        let old = store.create_plan(plan("Old", false)).await.unwrap();

        let err = store.create_order(5, gold.id).await.unwrap_err();
        assert_eq!(err.downcast_ref::<StoreError>(), Some(&StoreError::UnknownUser(5)));

        store
            .upsert_user(5, &UserProfile::default(), UserRole::Customer)
            .await
            .unwrap();
        let err = store.create_order(5, old.id).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<StoreError>(),
            Some(&StoreError::PlanUnavailable(old.id))
        );

        let order = store.create_order(5, gold.id).await.unwrap();
        assert_eq!(order.amount, 100_000);
        assert_eq!(order.status, OrderStatus::Pending);

        let paid = store
            .set_order_status(order.id, OrderStatus::Paid)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(paid.status, OrderStatus::Paid);
        assert!(store.set_order_status(999, OrderStatus::Paid).await.unwrap().is_none());
    }
}
