use std::collections::HashMap;
use std::fmt;

use super::parse;
use super::{FieldValue, PanelDraft, PlanDraft, SceneError, SceneKind, SceneTag};

pub type Parser = fn(&str) -> Option<FieldValue>;
pub type Validator = fn(&FieldValue) -> Result<(), &'static str>;

#[derive(Clone, Copy)]
pub struct Step {
    pub tag: SceneTag,
    /// Field written into the scene's draft when the step succeeds.
    pub field: &'static str,
    pub prompt: &'static str,
    /// Sent when `parse` rejects the input.
    pub error: &'static str,
    pub parse: Parser,
    pub validate: Option<Validator>,
}

impl Step {
    pub fn new(
        tag: SceneTag,
        field: &'static str,
        prompt: &'static str,
        error: &'static str,
        parse: Parser,
    ) -> Self {
        Self {
            tag,
            field,
            prompt,
            error,
            parse,
            validate: None,
        }
    }

    pub fn validated(mut self, validate: Validator) -> Self {
        self.validate = Some(validate);
        self
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("tag", &self.tag)
            .field("field", &self.field)
            .field("validated", &self.validate.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Successor {
    Step(SceneTag),
    /// The step is terminal; succeeding runs the scene's commit.
    Commit,
}

#[derive(Debug, Default)]
pub struct SceneRegistry {
    scenes: HashMap<SceneKind, Vec<Step>>,
    index: HashMap<SceneTag, (SceneKind, usize)>,
}

impl SceneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `steps` in order. Redefining a scene replaces it.
    pub fn define_scene(&mut self, kind: SceneKind, steps: Vec<Step>) -> Result<(), SceneError> {
        if steps.is_empty() {
            return Err(SceneError::EmptyScene(kind.name()));
        }
        for (i, step) in steps.iter().enumerate() {
            if step.tag.kind() != kind {
                return Err(SceneError::ForeignStep {
                    scene: kind.name(),
                    tag: step.tag,
                });
            }
            if steps[..i].iter().any(|s| s.tag == step.tag) {
                return Err(SceneError::DuplicateStep(step.tag));
            }
        }

        self.index.retain(|_, (owner, _)| *owner != kind);
        for (i, step) in steps.iter().enumerate() {
            self.index.insert(step.tag, (kind, i));
        }
        self.scenes.insert(kind, steps);
        Ok(())
    }

    pub fn get_step(&self, tag: SceneTag) -> Option<&Step> {
        let (kind, i) = self.index.get(&tag)?;
        self.scenes.get(kind)?.get(*i)
    }

    pub fn first_step(&self, kind: SceneKind) -> Option<&Step> {
        self.scenes.get(&kind)?.first()
    }

    pub fn successor(&self, tag: SceneTag) -> Option<Successor> {
        let (kind, i) = self.index.get(&tag)?;
        let steps = self.scenes.get(kind)?;
        Some(match steps.get(i + 1) {
            Some(next) => Successor::Step(next.tag),
            None => Successor::Commit,
        })
    }

    /// The scene a registered step belongs to.
    pub fn scene_of(&self, tag: SceneTag) -> Option<SceneKind> {
        self.index.get(&tag).map(|(kind, _)| *kind)
    }

    #[cfg(test)]
    pub fn is_terminal(&self, tag: SceneTag) -> bool {
        self.successor(tag) == Some(Successor::Commit)
    }

    /// The `add_plan` and `set_panel` flows.
    pub fn standard() -> Result<Self, SceneError> {
        let mut registry = Self::new();

        registry.define_scene(
            SceneKind::AddPlan,
            vec![
                Step::new(
                    SceneTag::AddPlanTitle,
                    PlanDraft::TITLE,
                    "📝 عنوان پلن را وارد کنید:",
                    "❌ عنوان نمی‌تواند خالی باشد. دوباره وارد کنید:",
                    parse::parse_text,
                )
                .validated(parse::validate_title),
                Step::new(
                    SceneTag::AddPlanDescription,
                    PlanDraft::DESCRIPTION,
                    "📄 توضیحات پلن را وارد کنید:",
                    "❌ توضیحات نمی‌تواند خالی باشد. دوباره وارد کنید:",
                    parse::parse_text,
                )
                .validated(parse::validate_description),
                Step::new(
                    SceneTag::AddPlanPrice,
                    PlanDraft::PRICE,
                    "💰 قیمت پلن را به تومان وارد کنید:",
                    "❌ لطفا قیمت را فقط به صورت عدد وارد کنید (مثال: 100000):",
                    parse::parse_number,
                )
                .validated(parse::validate_price),
                Step::new(
                    SceneTag::AddPlanDuration,
                    PlanDraft::DURATION,
                    "⏳ مدت زمان پلن را به روز وارد کنید:",
                    "❌ لطفا مدت زمان را فقط به صورت عدد (روز) وارد کنید:",
                    parse::parse_number,
                )
                .validated(parse::validate_duration),
                Step::new(
                    SceneTag::AddPlanDatalimit,
                    PlanDraft::DATA_LIMIT_GB,
                    "📦 حجم پلن را به گیگابایت وارد کنید:",
                    "❌ لطفا حجم را فقط به صورت عدد (گیگابایت) وارد کنید:",
                    parse::parse_number,
                )
                .validated(parse::validate_data_limit),
            ],
        )?;

        registry.define_scene(
            SceneKind::SetPanel,
            vec![
                Step::new(
                    SceneTag::SetPanelUrl,
                    PanelDraft::URL,
                    "🌐 آدرس پنل را وارد کنید (مثال: https://panel.example.com:2053/path):",
                    "❌ آدرس نامعتبر است. آدرس باید با http:// یا https:// شروع شود:",
                    parse::parse_url,
                ),
                Step::new(
                    SceneTag::SetPanelUser,
                    PanelDraft::USERNAME,
                    "👤 نام کاربری پنل را وارد کنید:",
                    "❌ نام کاربری نمی‌تواند خالی باشد:",
                    parse::parse_text,
                ),
                Step::new(
                    SceneTag::SetPanelPass,
                    PanelDraft::PASSWORD,
                    "🔑 رمز عبور پنل را وارد کنید:",
                    "❌ رمز عبور نمی‌تواند خالی باشد:",
                    parse::parse_secret,
                ),
            ],
        )?;

        Ok(registry)
    }
}
