use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use std::fmt;

/// Login for an x-ui style panel, one per admin.
#[derive(Clone, Serialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PanelCredential {
    pub id: i64,
    pub user_id: i64,
    pub url: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for PanelCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelCredential")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_and_json_hide_password() {
        let cred = PanelCredential {
            id: 1,
            user_id: 42,
            url: "https://panel.example:2053/base".into(),
            username: "admin".into(),
            password: "hunter2".into(),
            updated_at: Utc::now(),
        };
        assert!(!format!("{:?}", cred).contains("hunter2"));
        let json = serde_json::to_string(&cred).unwrap();
        assert!(!json.contains("hunter2"));
        assert!(json.contains("\"userId\":42"));
    }
}
