pub mod order_repo;
pub mod panel_repo;
pub mod plan_repo;
pub mod user_repo;

pub use order_repo::OrderRepository;
pub use panel_repo::PanelRepository;
pub use plan_repo::PlanRepository;
pub use user_repo::UserRepository;
