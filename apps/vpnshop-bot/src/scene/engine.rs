use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, warn};
use vpnshop_shared::AdminSet;

use super::commit::{CommitOutcome, SceneCommitter};
use super::registry::{SceneRegistry, Successor};
use super::session::{Session, SessionStore};
use super::{SceneKind, SceneTag};

/// Texts starting with this are navigation commands and never scene input.
pub const COMMAND_PREFIX: char = '/';

/// Result of feeding one text message to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// No scene, not allowed, or a command. Session untouched, nothing to send.
    Ignored,
    /// Input rejected; the user stays on `tag`.
    Retry { tag: SceneTag, message: String },
    /// Moved to `tag`; `prompt` asks for its input.
    Advanced { tag: SceneTag, prompt: &'static str },
    /// Terminal step committed; session cleared.
    Completed { message: String },
    /// Terminal step refused by an external check; session cleared, nothing saved.
    Aborted { message: String },
}

pub struct SceneEngine {
    registry: Arc<SceneRegistry>,
    sessions: Arc<dyn SessionStore>,
    committer: SceneCommitter,
    admins: AdminSet,
}

impl SceneEngine {
    pub fn new(
        registry: Arc<SceneRegistry>,
        sessions: Arc<dyn SessionStore>,
        committer: SceneCommitter,
        admins: AdminSet,
    ) -> Self {
        Self {
            registry,
            sessions,
            committer,
            admins,
        }
    }

    fn allowed(&self, user_id: i64, kind: SceneKind) -> bool {
        !kind.admin_only() || self.admins.is_admin(user_id)
    }

    /// Puts the user on the first step of `kind`, replacing any scene in progress.
    /// Returns the first prompt, or `None` when the user may not run this scene.
    pub async fn start(&self, user_id: i64, kind: SceneKind) -> Result<Option<&'static str>> {
        if !self.allowed(user_id, kind) {
            debug!("User {} may not start scene {}", user_id, kind);
            return Ok(None);
        }
        let Some(first) = self.registry.first_step(kind) else {
            warn!("Scene {} has no steps registered", kind);
            return Ok(None);
        };
        self.sessions
            .set(user_id, Session::begin(kind, first.tag))
            .await?;
        debug!("User {} entered {}", user_id, first.tag);
        Ok(Some(first.prompt))
    }

    pub async fn reset(&self, user_id: i64) -> Result<()> {
        self.sessions.clear(user_id).await
    }

    pub async fn handle_text(&self, user_id: i64, text: &str) -> Result<Transition> {
        let mut session = self.sessions.get(user_id).await?;
        let Some(tag) = session.current_scene else {
            return Ok(Transition::Ignored);
        };
        let (Some(kind), Some(step)) = (
            self.registry.scene_of(tag),
            self.registry.get_step(tag).copied(),
        ) else {
            warn!("User {} is on unknown step {}; resetting", user_id, tag);
            self.sessions.clear(user_id).await?;
            return Ok(Transition::Ignored);
        };

        if !self.allowed(user_id, kind) {
            debug!("Ignoring {} input from non-admin {}", tag, user_id);
            return Ok(Transition::Ignored);
        }

        if text.trim_start().starts_with(COMMAND_PREFIX) {
            return Ok(Transition::Ignored);
        }

        let Some(value) = (step.parse)(text) else {
            return Ok(Transition::Retry {
                tag,
                message: step.error.to_string(),
            });
        };
        if let Some(validate) = step.validate {
            if let Err(message) = validate(&value) {
                return Ok(Transition::Retry {
                    tag,
                    message: message.to_string(),
                });
            }
        }

        if session.fields.kind() != Some(kind) {
            warn!(
                "User {} is on {} with fields of another scene; resetting",
                user_id, tag
            );
            self.sessions.clear(user_id).await?;
            return Ok(Transition::Ignored);
        }
        session.fields.record(step.field, value)?;

        match self.registry.successor(tag) {
            Some(Successor::Step(next)) => {
                let prompt = self
                    .registry
                    .get_step(next)
                    .map(|s| s.prompt)
                    .unwrap_or_default();
                session.current_scene = Some(next);
                self.sessions.set(user_id, session).await?;
                debug!("User {} advanced {} -> {}", user_id, tag, next);
                Ok(Transition::Advanced { tag: next, prompt })
            }
            Some(Successor::Commit) => {
                let fields = std::mem::take(&mut session.fields);
                let outcome = self.committer.commit(user_id, fields).await?;
                self.sessions.clear(user_id).await?;
                debug!("User {} finished scene {}", user_id, kind);
                Ok(match outcome {
                    CommitOutcome::Saved(message) => Transition::Completed { message },
                    CommitOutcome::Rejected(message) => Transition::Aborted { message },
                })
            }
            None => {
                self.sessions.clear(user_id).await?;
                Ok(Transition::Ignored)
            }
        }
    }
}
