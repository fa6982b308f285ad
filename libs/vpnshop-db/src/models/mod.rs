pub mod order;
pub mod panel;
pub mod plan;
pub mod user;

pub use order::{Order, OrderStatus};
pub use panel::PanelCredential;
pub use plan::{BYTES_PER_GB, Plan, gigabytes_to_bytes};
pub use user::{User, UserRole};
