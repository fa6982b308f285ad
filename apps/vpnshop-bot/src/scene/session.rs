use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::warn;

use super::{SceneFields, SceneKind, SceneTag};

/// Per-user scene state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub current_scene: Option<SceneTag>,
    pub fields: SceneFields,
}

impl Session {
    pub fn begin(kind: SceneKind, first: SceneTag) -> Self {
        Self {
            current_scene: Some(first),
            fields: SceneFields::for_scene(kind),
        }
    }

    #[cfg(test)]
    pub fn is_idle(&self) -> bool {
        self.current_scene.is_none()
    }
}

/// Keyed by Telegram user id. A user with no stored session reads as
/// `Session::default()`. Writes for the same user are not serialized here.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, user_id: i64) -> Result<Session>;
    async fn set(&self, user_id: i64, session: Session) -> Result<()>;
    async fn clear(&self, user_id: i64) -> Result<()>;
}

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<i64, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, user_id: i64) -> Result<Session> {
        Ok(self
            .sessions
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn set(&self, user_id: i64, session: Session) -> Result<()> {
        self.sessions.write().await.insert(user_id, session);
        Ok(())
    }

    async fn clear(&self, user_id: i64) -> Result<()> {
        self.sessions.write().await.remove(&user_id);
        Ok(())
    }
}

/// Sessions as JSON strings in Redis, so scenes survive restarts and can be shared
/// between bot replicas.
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: ConnectionManager,
    ttl_secs: Option<u64>,
}

impl RedisSessionStore {
    pub async fn connect(url: &str, ttl_secs: Option<u64>) -> Result<Self> {
        let client = redis::Client::open(url).context("Invalid REDIS_URL")?;
        let conn = ConnectionManager::new(client)
            .await
            .context("Failed to connect to Redis")?;
        Ok(Self { conn, ttl_secs })
    }

    fn key(user_id: i64) -> String {
        format!("vpnshop:session:{}", user_id)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get(&self, user_id: i64) -> Result<Session> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn
            .get(Self::key(user_id))
            .await
            .context("Failed to read session from Redis")?;

        Ok(match raw {
            Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                warn!("Discarding unreadable session for user {}: {}", user_id, e);
                Session::default()
            }),
            None => Session::default(),
        })
    }

    async fn set(&self, user_id: i64, session: Session) -> Result<()> {
        let json = serde_json::to_string(&session).context("Failed to encode session")?;
        let mut conn = self.conn.clone();
        match self.ttl_secs {
            Some(ttl) => conn.set_ex::<_, _, ()>(Self::key(user_id), json, ttl).await,
            None => conn.set::<_, _, ()>(Self::key(user_id), json).await,
        }
        .context("Failed to write session to Redis")
    }

    async fn clear(&self, user_id: i64) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(Self::key(user_id))
            .await
            .context("Failed to clear session in Redis")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::PlanDraft;

    #[tokio::test]
    async fn missing_session_defaults_to_idle() {
        let store = MemorySessionStore::new();
        let session = store.get(42).await.unwrap();
        assert!(session.is_idle());
        assert!(session.fields.is_empty());
    }

    #[tokio::test]
    async fn set_and_clear_are_per_user() {
        let store = MemorySessionStore::new();
        store
            .set(1, Session::begin(SceneKind::AddPlan, SceneTag::AddPlanTitle))
            .await
            .unwrap();
        store
            .set(2, Session::begin(SceneKind::SetPanel, SceneTag::SetPanelUrl))
            .await
            .unwrap();

        store.clear(1).await.unwrap();
        assert_eq!(store.get(1).await.unwrap(), Session::default());
        assert_eq!(
            store.get(2).await.unwrap().current_scene,
            Some(SceneTag::SetPanelUrl)
        );
    }

    #[test]
    fn session_json_shape_is_stable() {
        let session = Session {
            current_scene: Some(SceneTag::AddPlanPrice),
            fields: SceneFields::AddPlan(PlanDraft {
                title: Some("Gold".into()),
                ..Default::default()
            }),
        };
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["current_scene"], "add_plan_price");
        assert_eq!(json["fields"]["scene"], "add_plan");
        assert_eq!(json["fields"]["data"]["title"], "Gold");

        let back: Session = serde_json::from_value(json).unwrap();
        assert_eq!(back, session);
        assert_eq!(
            serde_json::from_str::<Session>(r#"{"current_scene":null,"fields":{"scene":"empty"}}"#)
                .unwrap(),
            Session::default()
        );
    }
}
