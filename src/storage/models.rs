use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::utils::content_hash;

/// Resolved short link
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShortLink {
    pub id: i64,
    pub code: String,
    pub target: String,
    pub created_at: DateTime<Utc>,
}

/// 重定向时打开的访问记录（尚无客户端数据）
#[derive(Debug, Clone)]
pub struct NewVisit {
    pub link_id: i64,
    pub requestor_ip: Option<String>,
    pub user_agent: Option<String>,
    pub server_observed: Value,
}

/// Persisted correlation record for one redirect
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VisitRecord {
    pub id: i64,
    pub link_id: i64,
    pub requestor_ip: Option<String>,
    pub user_agent: Option<String>,
    pub server_observed_data: Value,
    pub client_payload: Option<Value>,
    pub behavior_payload: Option<Value>,
    pub combined_payload: Option<Value>,
    pub content_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl VisitRecord {
    pub fn is_correlated(&self) -> bool {
        self.combined_payload.is_some()
    }
}

/// The four columns written by one correlation call
///
/// Only constructible through [`CorrelationUpdate::new`], so the hash
/// always belongs to the combined payload stored next to it.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationUpdate {
    client_payload: Value,
    behavior_payload: Value,
    combined_payload: Value,
    content_hash: String,
}

impl CorrelationUpdate {
    pub fn new(client_data: Value, behavior: Value) -> Self {
        let combined = json!({
            "clientData": client_data,
            "behavior": behavior,
        });
        let content_hash = content_hash(&combined);

        Self {
            client_payload: client_data,
            behavior_payload: behavior,
            combined_payload: combined,
            content_hash,
        }
    }

    pub fn client_payload(&self) -> &Value {
        &self.client_payload
    }

    pub fn behavior_payload(&self) -> &Value {
        &self.behavior_payload
    }

    pub fn combined_payload(&self) -> &Value {
        &self.combined_payload
    }

    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }
}

/// Result of attaching a payload to a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachOutcome {
    /// The record already carried a payload which was overwritten
    pub overwrote_previous: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_update_combines_literal_tuple() {
        let client = json!({"basic": {"platform": "Linux"}, "hardware": null, "graphics": null});
        let behavior = json!({});
        let update = CorrelationUpdate::new(client.clone(), behavior.clone());

        assert_eq!(update.client_payload(), &client);
        assert_eq!(update.behavior_payload(), &behavior);
        assert_eq!(
            update.combined_payload(),
            &json!({"clientData": client, "behavior": behavior})
        );
        assert_eq!(update.content_hash(), content_hash(update.combined_payload()));
    }

    #[test]
    fn test_correlation_update_keeps_null_behavior() {
        let update = CorrelationUpdate::new(json!({"basic": {}}), Value::Null);
        assert_eq!(update.behavior_payload(), &Value::Null);
        assert_eq!(update.combined_payload()["behavior"], Value::Null);
    }
}
