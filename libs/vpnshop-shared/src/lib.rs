use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Telegram ids allowed to run admin flows. Loaded once from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminSet {
    ids: HashSet<i64>,
}

impl AdminSet {
    pub fn new(ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    /// Parses a comma separated list such as `"1001, 1002"`. Blank entries are skipped,
    /// anything else that is not an integer is an error.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let mut ids = HashSet::new();
        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let id = part
                .parse::<i64>()
                .map_err(|_| format!("invalid admin id: {}", part))?;
            ids.insert(id);
        }
        Ok(Self { ids })
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.ids.contains(&user_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

pub mod api {
    use super::*;

    /// Telegram profile fields the mini-app forwards with an order.
    #[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    pub struct ProfilePayload {
        pub first_name: Option<String>,
        pub last_name: Option<String>,
        pub username: Option<String>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CreateOrderRequest {
        pub user_id: i64,
        pub plan_id: i64,
        #[serde(default)]
        pub profile: ProfilePayload,
    }

    /// Gateways send the order id either as a JSON number or as a numeric string.
    fn id_from_number_or_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(i64),
            Text(String),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Number(id) => Ok(id),
            RawId::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| serde::de::Error::custom(format!("invalid order id: {:?}", text))),
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PaymentWebhook {
        #[serde(deserialize_with = "id_from_number_or_string")]
        pub order_id: i64,
        pub status: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    pub struct WebhookAck {
        pub received: bool,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_admin_list() {
        let admins = AdminSet::parse(" 10, 20 ,,30").unwrap();
        assert_eq!(admins.len(), 3);
        assert!(admins.is_admin(20));
        assert!(!admins.is_admin(40));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(AdminSet::parse("10,abc").is_err());
        assert!(AdminSet::parse("").unwrap().is_empty());
    }

    #[test]
    fn order_request_defaults_profile() {
        let req: api::CreateOrderRequest =
            serde_json::from_str(r#"{"userId": 7, "planId": 3}"#).unwrap();
        assert_eq!(req.user_id, 7);
        assert_eq!(req.plan_id, 3);
        assert_eq!(req.profile, api::ProfilePayload::default());
    }

    #[test]
    fn webhook_order_id_accepts_numeric_strings() {
        let hook: api::PaymentWebhook =
            serde_json::from_str(r#"{"orderId": "7", "status": "success"}"#).unwrap();
        assert_eq!(hook.order_id, 7);
        let hook: api::PaymentWebhook =
            serde_json::from_str(r#"{"orderId": 8, "status": "failed"}"#).unwrap();
        assert_eq!(hook.order_id, 8);
        assert!(serde_json::from_str::<api::PaymentWebhook>(
            r#"{"orderId": "seven", "status": "success"}"#
        )
        .is_err());
    }
}
