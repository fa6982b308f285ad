pub mod db;
pub mod memory;
pub mod models;
pub mod repositories;
pub mod store;

pub use memory::MemoryStore;
pub use sqlx;
pub use store::{NewPlan, PanelLogin, PgStore, PlanFilter, StoreError, Storefront, UserProfile};
