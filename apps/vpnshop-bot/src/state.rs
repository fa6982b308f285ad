use std::sync::Arc;

use crate::router::CommandRouter;

#[derive(Clone)]
pub struct AppState {
    pub router: Arc<CommandRouter>,
    pub mini_app_url: Option<String>,
}
