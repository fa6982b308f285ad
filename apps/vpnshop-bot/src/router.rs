//! Turns inbound Telegram events into scene moves, menu actions and replies.
//! Transport-free: the teloxide handlers build an [`InboundEvent`] and send back
//! whatever [`Outgoing`] actions come out.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};
use vpnshop_db::models::UserRole;
use vpnshop_db::{PlanFilter, StoreError, Storefront, UserProfile};
use vpnshop_shared::AdminSet;

use crate::messages;
use crate::scene::{SceneEngine, SceneKind, Transition};

pub const BUY_PLAN_PREFIX: &str = "buy_plan_";
pub const START_COMMAND: &str = "/start";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuButton {
    AddPlan,
    PanelSettings,
    ListPlans,
    BuyService,
}

impl MenuButton {
    pub const ALL: [MenuButton; 4] = [
        MenuButton::AddPlan,
        MenuButton::PanelSettings,
        MenuButton::ListPlans,
        MenuButton::BuyService,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MenuButton::AddPlan => "➕ افزودن پلن",
            MenuButton::PanelSettings => "⚙️ تنظیمات پنل",
            MenuButton::ListPlans => "📋 لیست پلن‌ها",
            MenuButton::BuyService => "🛍️ خرید سرویس",
        }
    }

    pub fn from_label(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL.into_iter().find(|b| b.label() == text)
    }

    pub fn admin_only(&self) -> bool {
        !matches!(self, MenuButton::BuyService)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    Start {
        user_id: i64,
        profile: UserProfile,
    },
    Text {
        user_id: i64,
        text: String,
    },
    ButtonPress {
        user_id: i64,
        button: MenuButton,
    },
    Callback {
        user_id: i64,
        profile: UserProfile,
        data: String,
    },
}

impl InboundEvent {
    /// Classifies a plain text message: `/start`, a main-menu label, or scene input.
    pub fn from_text(user_id: i64, profile: UserProfile, text: &str) -> Self {
        let is_start = text
            .split_whitespace()
            .next()
            .map(|cmd| cmd == START_COMMAND || cmd.starts_with("/start@"))
            .unwrap_or(false);
        if is_start {
            return InboundEvent::Start { user_id, profile };
        }
        match MenuButton::from_label(text) {
            Some(button) => InboundEvent::ButtonPress { user_id, button },
            None => InboundEvent::Text {
                user_id,
                text: text.to_string(),
            },
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            InboundEvent::Start { .. } => "start",
            InboundEvent::Text { .. } => "text",
            InboundEvent::ButtonPress { .. } => "button",
            InboundEvent::Callback { .. } => "callback",
        }
    }

    pub fn user_id(&self) -> i64 {
        match self {
            InboundEvent::Start { user_id, .. }
            | InboundEvent::Text { user_id, .. }
            | InboundEvent::ButtonPress { user_id, .. }
            | InboundEvent::Callback { user_id, .. } => *user_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanButton {
    pub label: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    MainMenu { admin: bool },
    PlanPicker(Vec<PlanButton>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    Message {
        text: String,
        keyboard: Option<Keyboard>,
    },
    /// Replaces the text of the message the callback came from.
    Edit { text: String },
    AnswerCallback { text: Option<String> },
}

impl Outgoing {
    fn text(text: impl Into<String>) -> Self {
        Outgoing::Message {
            text: text.into(),
            keyboard: None,
        }
    }

    fn with_keyboard(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Outgoing::Message {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }
}

/// One async mutex per user id. Entries nobody holds or waits on are pruned on the
/// next acquire.
#[derive(Default)]
pub struct UserLocks {
    locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, user_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(user_id).or_default().clone()
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }
}

pub struct CommandRouter {
    engine: SceneEngine,
    store: Arc<dyn Storefront>,
    admins: AdminSet,
    locks: UserLocks,
}

impl CommandRouter {
    pub fn new(engine: SceneEngine, store: Arc<dyn Storefront>, admins: AdminSet) -> Self {
        Self {
            engine,
            store,
            admins,
            locks: UserLocks::new(),
        }
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admins.is_admin(user_id)
    }

    fn role(&self, user_id: i64) -> UserRole {
        if self.is_admin(user_id) {
            UserRole::Admin
        } else {
            UserRole::Customer
        }
    }

    /// Handles one event with the user's lock held for the whole exchange.
    pub async fn route(&self, event: InboundEvent) -> Result<Vec<Outgoing>> {
        let _guard = self.locks.acquire(event.user_id()).await;
        debug!("Routing {} event for user {}", event.kind(), event.user_id());

        match event {
            InboundEvent::Start { user_id, profile } => self.start(user_id, profile).await,
            InboundEvent::Text { user_id, text } => self.text(user_id, &text).await,
            InboundEvent::ButtonPress { user_id, button } => self.button(user_id, button).await,
            InboundEvent::Callback {
                user_id,
                profile,
                data,
            } => self.callback(user_id, profile, &data).await,
        }
    }

    async fn start(&self, user_id: i64, profile: UserProfile) -> Result<Vec<Outgoing>> {
        self.engine.reset(user_id).await?;
        let user = self
            .store
            .upsert_user(user_id, &profile, self.role(user_id))
            .await?;
        info!("User {} started the bot as {}", user_id, user.role.as_str());

        let admin = self.is_admin(user_id);
        Ok(vec![Outgoing::with_keyboard(
            messages::welcome(profile.first_name.as_deref(), admin),
            Keyboard::MainMenu { admin },
        )])
    }

    async fn text(&self, user_id: i64, text: &str) -> Result<Vec<Outgoing>> {
        let admin = self.is_admin(user_id);
        Ok(match self.engine.handle_text(user_id, text).await? {
            Transition::Ignored => Vec::new(),
            Transition::Retry { message, .. } => vec![Outgoing::text(message)],
            Transition::Advanced { prompt, .. } => vec![Outgoing::text(prompt)],
            Transition::Completed { message } | Transition::Aborted { message } => {
                vec![Outgoing::with_keyboard(message, Keyboard::MainMenu { admin })]
            }
        })
    }

    async fn button(&self, user_id: i64, button: MenuButton) -> Result<Vec<Outgoing>> {
        if button.admin_only() && !self.is_admin(user_id) {
            debug!("Ignoring {:?} from non-admin {}", button, user_id);
            return Ok(Vec::new());
        }

        match button {
            MenuButton::AddPlan => self.start_scene(user_id, SceneKind::AddPlan, Vec::new()).await,
            MenuButton::PanelSettings => {
                let mut replies = Vec::new();
                if let Some(cred) = self.store.get_panel_credential(user_id).await? {
                    replies.push(Outgoing::text(messages::current_panel(&cred)));
                }
                self.start_scene(user_id, SceneKind::SetPanel, replies).await
            }
            MenuButton::ListPlans => {
                self.engine.reset(user_id).await?;
                let plans = self.store.list_plans(PlanFilter::All).await?;
                let text = if plans.is_empty() {
                    messages::NO_PLANS.to_string()
                } else {
                    messages::plan_list(&plans)
                };
                Ok(vec![Outgoing::text(text)])
            }
            MenuButton::BuyService => {
                self.engine.reset(user_id).await?;
                let plans = self.store.list_plans(PlanFilter::ActiveOnly).await?;
                if plans.is_empty() {
                    return Ok(vec![Outgoing::text(messages::NO_PLANS_FOR_SALE)]);
                }
                let buttons = plans
                    .iter()
                    .map(|plan| PlanButton {
                        label: messages::plan_button(plan),
                        data: format!("{}{}", BUY_PLAN_PREFIX, plan.id),
                    })
                    .collect();
                Ok(vec![Outgoing::with_keyboard(
                    messages::CHOOSE_PLAN,
                    Keyboard::PlanPicker(buttons),
                )])
            }
        }
    }

    async fn start_scene(
        &self,
        user_id: i64,
        kind: SceneKind,
        mut replies: Vec<Outgoing>,
    ) -> Result<Vec<Outgoing>> {
        match self.engine.start(user_id, kind).await? {
            Some(prompt) => {
                replies.push(Outgoing::text(prompt));
                Ok(replies)
            }
            None => Ok(Vec::new()),
        }
    }

    async fn callback(
        &self,
        user_id: i64,
        profile: UserProfile,
        data: &str,
    ) -> Result<Vec<Outgoing>> {
        let Some(plan_id) = data
            .strip_prefix(BUY_PLAN_PREFIX)
            .and_then(|id| id.parse::<i64>().ok())
        else {
            debug!("Unknown callback {:?} from user {}", data, user_id);
            return Ok(vec![Outgoing::AnswerCallback { text: None }]);
        };

        let unavailable = || {
            vec![Outgoing::AnswerCallback {
                text: Some(messages::PLAN_UNAVAILABLE.to_string()),
            }]
        };

        let plan = match self.store.get_plan(plan_id).await? {
            Some(plan) if plan.is_active => plan,
            _ => return Ok(unavailable()),
        };

        self.store
            .upsert_user(user_id, &profile, self.role(user_id))
            .await?;
        let order = match self.store.create_order(user_id, plan.id).await {
            Ok(order) => order,
            Err(e) => match e.downcast_ref::<StoreError>() {
                Some(StoreError::PlanUnavailable(_)) => return Ok(unavailable()),
                _ => return Err(e),
            },
        };
        info!(
            "Order #{} created for user {} (plan #{}, {} tomans)",
            order.id, user_id, plan.id, order.amount
        );

        Ok(vec![
            Outgoing::Edit {
                text: messages::order_summary(&order, &plan),
            },
            Outgoing::AnswerCallback { text: None },
        ])
    }
}
