//! Prompt-driven admin flows. A scene is an ordered list of steps; the engine moves a
//! user through it one text message at a time and commits the collected fields once.

pub mod commit;
pub mod engine;
pub mod parse;
pub mod registry;
pub mod session;

use serde::{Deserialize, Serialize};
use std::fmt;
use vpnshop_db::models::gigabytes_to_bytes;
use vpnshop_db::{NewPlan, PanelLogin};

pub use commit::SceneCommitter;
pub use engine::{SceneEngine, Transition};
pub use registry::SceneRegistry;
pub use session::{MemorySessionStore, RedisSessionStore, SessionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneKind {
    AddPlan,
    SetPanel,
}

impl SceneKind {
    pub fn name(&self) -> &'static str {
        match self {
            SceneKind::AddPlan => "add_plan",
            SceneKind::SetPanel => "set_panel",
        }
    }

    pub fn admin_only(&self) -> bool {
        match self {
            SceneKind::AddPlan | SceneKind::SetPanel => true,
        }
    }
}

impl fmt::Display for SceneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One state per (scene, step) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneTag {
    AddPlanTitle,
    AddPlanDescription,
    AddPlanPrice,
    AddPlanDuration,
    AddPlanDatalimit,
    SetPanelUrl,
    SetPanelUser,
    SetPanelPass,
}

impl SceneTag {
    pub fn kind(&self) -> SceneKind {
        match self {
            SceneTag::AddPlanTitle
            | SceneTag::AddPlanDescription
            | SceneTag::AddPlanPrice
            | SceneTag::AddPlanDuration
            | SceneTag::AddPlanDatalimit => SceneKind::AddPlan,
            SceneTag::SetPanelUrl | SceneTag::SetPanelUser | SceneTag::SetPanelPass => {
                SceneKind::SetPanel
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SceneTag::AddPlanTitle => "add_plan_title",
            SceneTag::AddPlanDescription => "add_plan_description",
            SceneTag::AddPlanPrice => "add_plan_price",
            SceneTag::AddPlanDuration => "add_plan_duration",
            SceneTag::AddPlanDatalimit => "add_plan_datalimit",
            SceneTag::SetPanelUrl => "set_panel_url",
            SceneTag::SetPanelUser => "set_panel_user",
            SceneTag::SetPanelPass => "set_panel_pass",
        }
    }
}

impl fmt::Display for SceneTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed step input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Number(u64),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("scene {scene} has no field named {field}")]
    UnknownField { scene: &'static str, field: String },
    #[error("field {field} expects a {expected} value")]
    FieldType {
        field: &'static str,
        expected: &'static str,
    },
    #[error("field {0} was never collected")]
    MissingField(&'static str),
    #[error("field {0} is out of range")]
    OutOfRange(&'static str),
    #[error("no fields collected for any scene")]
    NoActiveScene,
    #[error("scene {0} must have at least one step")]
    EmptyScene(&'static str),
    #[error("step {tag} does not belong to scene {scene}")]
    ForeignStep { scene: &'static str, tag: SceneTag },
    #[error("step {0} is defined twice")]
    DuplicateStep(SceneTag),
}

fn text_value(field: &'static str, value: FieldValue) -> Result<String, SceneError> {
    match value {
        FieldValue::Text(text) => Ok(text),
        FieldValue::Number(_) => Err(SceneError::FieldType {
            field,
            expected: "text",
        }),
    }
}

fn number_value(field: &'static str, value: FieldValue) -> Result<u64, SceneError> {
    match value {
        FieldValue::Number(n) => Ok(n),
        FieldValue::Text(_) => Err(SceneError::FieldType {
            field,
            expected: "numeric",
        }),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<u64>,
    pub duration_days: Option<u64>,
    pub data_limit_gb: Option<u64>,
}

impl PlanDraft {
    pub const TITLE: &'static str = "title";
    pub const DESCRIPTION: &'static str = "description";
    pub const PRICE: &'static str = "price";
    pub const DURATION: &'static str = "duration";
    pub const DATA_LIMIT_GB: &'static str = "dataLimitGB";

    fn record(&mut self, field: &str, value: FieldValue) -> Result<(), SceneError> {
        match field {
            Self::TITLE => self.title = Some(text_value(Self::TITLE, value)?),
            Self::DESCRIPTION => self.description = Some(text_value(Self::DESCRIPTION, value)?),
            Self::PRICE => self.price = Some(number_value(Self::PRICE, value)?),
            Self::DURATION => self.duration_days = Some(number_value(Self::DURATION, value)?),
            Self::DATA_LIMIT_GB => {
                self.data_limit_gb = Some(number_value(Self::DATA_LIMIT_GB, value)?)
            }
            other => {
                return Err(SceneError::UnknownField {
                    scene: SceneKind::AddPlan.name(),
                    field: other.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Builds the plan row. The byte limit is computed with checked integer math.
    pub fn into_new_plan(self) -> Result<NewPlan, SceneError> {
        let title = self.title.ok_or(SceneError::MissingField(Self::TITLE))?;
        let description = self
            .description
            .ok_or(SceneError::MissingField(Self::DESCRIPTION))?;
        let price = self.price.ok_or(SceneError::MissingField(Self::PRICE))?;
        let duration = self
            .duration_days
            .ok_or(SceneError::MissingField(Self::DURATION))?;
        let gb = self
            .data_limit_gb
            .ok_or(SceneError::MissingField(Self::DATA_LIMIT_GB))?;

        Ok(NewPlan {
            title,
            description,
            price: i64::try_from(price).map_err(|_| SceneError::OutOfRange(Self::PRICE))?,
            duration_days: i32::try_from(duration)
                .map_err(|_| SceneError::OutOfRange(Self::DURATION))?,
            data_limit: gigabytes_to_bytes(gb).ok_or(SceneError::OutOfRange(Self::DATA_LIMIT_GB))?,
            is_active: true,
        })
    }
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelDraft {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for PanelDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelDraft")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl PanelDraft {
    pub const URL: &'static str = "url";
    pub const USERNAME: &'static str = "username";
    pub const PASSWORD: &'static str = "password";

    fn record(&mut self, field: &str, value: FieldValue) -> Result<(), SceneError> {
        match field {
            Self::URL => self.url = Some(text_value(Self::URL, value)?),
            Self::USERNAME => self.username = Some(text_value(Self::USERNAME, value)?),
            Self::PASSWORD => self.password = Some(text_value(Self::PASSWORD, value)?),
            other => {
                return Err(SceneError::UnknownField {
                    scene: SceneKind::SetPanel.name(),
                    field: other.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn into_login(self) -> Result<PanelLogin, SceneError> {
        Ok(PanelLogin {
            url: self.url.ok_or(SceneError::MissingField(Self::URL))?,
            username: self.username.ok_or(SceneError::MissingField(Self::USERNAME))?,
            password: self.password.ok_or(SceneError::MissingField(Self::PASSWORD))?,
        })
    }
}

/// Fields collected so far, typed per scene.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scene", content = "data", rename_all = "snake_case")]
pub enum SceneFields {
    #[default]
    Empty,
    AddPlan(PlanDraft),
    SetPanel(PanelDraft),
}

impl SceneFields {
    pub fn for_scene(kind: SceneKind) -> Self {
        match kind {
            SceneKind::AddPlan => SceneFields::AddPlan(PlanDraft::default()),
            SceneKind::SetPanel => SceneFields::SetPanel(PanelDraft::default()),
        }
    }

    pub fn kind(&self) -> Option<SceneKind> {
        match self {
            SceneFields::Empty => None,
            SceneFields::AddPlan(_) => Some(SceneKind::AddPlan),
            SceneFields::SetPanel(_) => Some(SceneKind::SetPanel),
        }
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        matches!(self, SceneFields::Empty)
    }

    pub(crate) fn record(&mut self, field: &str, value: FieldValue) -> Result<(), SceneError> {
        match self {
            SceneFields::Empty => Err(SceneError::NoActiveScene),
            SceneFields::AddPlan(draft) => draft.record(field, value),
            SceneFields::SetPanel(draft) => draft.record(field, value),
        }
    }
}
