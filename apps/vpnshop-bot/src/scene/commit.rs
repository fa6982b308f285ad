use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use vpnshop_db::Storefront;

use super::{PanelDraft, PlanDraft, SceneError, SceneFields};
use crate::messages;
use crate::panel_client::PanelVerifier;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Saved(String),
    /// Nothing was persisted; the user has to run the scene again.
    Rejected(String),
}

/// Terminal-step actions. Storage errors propagate; a failed panel check does not.
#[derive(Clone)]
pub struct SceneCommitter {
    store: Arc<dyn Storefront>,
    verifier: Arc<dyn PanelVerifier>,
}

impl SceneCommitter {
    pub fn new(store: Arc<dyn Storefront>, verifier: Arc<dyn PanelVerifier>) -> Self {
        Self { store, verifier }
    }

    pub async fn commit(&self, user_id: i64, fields: SceneFields) -> Result<CommitOutcome> {
        match fields {
            SceneFields::AddPlan(draft) => self.add_plan(draft).await,
            SceneFields::SetPanel(draft) => self.set_panel(user_id, draft).await,
            SceneFields::Empty => Err(SceneError::NoActiveScene.into()),
        }
    }

    async fn add_plan(&self, draft: PlanDraft) -> Result<CommitOutcome> {
        let plan = self.store.create_plan(draft.into_new_plan()?).await?;
        Ok(CommitOutcome::Saved(format!(
            "{}\n\n{}",
            messages::PLAN_ADDED,
            messages::plan_line(&plan)
        )))
    }

    async fn set_panel(&self, admin_id: i64, draft: PanelDraft) -> Result<CommitOutcome> {
        let login = draft.into_login()?;

        if !self
            .verifier
            .test_connection(&login.url, &login.username, &login.password)
            .await
        {
            warn!(
                "Panel verification failed for admin {} at {}",
                admin_id, login.url
            );
            return Ok(CommitOutcome::Rejected(
                messages::PANEL_CONNECT_FAILED.to_string(),
            ));
        }

        self.store.upsert_panel_credential(admin_id, &login).await?;
        info!("Panel credentials saved for admin {}", admin_id);
        Ok(CommitOutcome::Saved(messages::PANEL_SAVED.to_string()))
    }
}
