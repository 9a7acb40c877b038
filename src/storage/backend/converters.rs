use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{NotSet, Set};
use serde_json::Value;
use tracing::warn;

use crate::storage::{CorrelationUpdate, NewVisit, ShortLink, VisitRecord};
use migration::entities::{short_link, visit_record};

/// 将 Sea-ORM Model 转换为 ShortLink
pub fn model_to_shortlink(model: short_link::Model) -> ShortLink {
    ShortLink {
        id: model.id,
        code: model.short_code,
        target: model.target_url,
        created_at: model.created_at,
    }
}

/// JSON 文本列解析；损坏的数据原样保留为字符串而不是丢弃
fn parse_json_column(id: i64, column: &str, raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!("visit {}: column {} holds invalid JSON: {}", id, column, e);
        Value::String(raw.to_string())
    })
}

pub fn model_to_visit_record(model: visit_record::Model) -> VisitRecord {
    let id = model.id;
    let parse_opt = |column: &str, raw: Option<String>| {
        raw.map(|raw| parse_json_column(id, column, &raw))
    };

    VisitRecord {
        id,
        link_id: model.link_id,
        requestor_ip: model.requestor_ip,
        user_agent: model.user_agent,
        server_observed_data: parse_json_column(
            id,
            "server_observed_data",
            &model.server_observed_data,
        ),
        client_payload: parse_opt("client_payload", model.client_payload),
        behavior_payload: parse_opt("behavior_payload", model.behavior_payload),
        combined_payload: parse_opt("combined_payload", model.combined_payload),
        content_hash: model.content_hash,
        created_at: model.created_at,
    }
}

pub fn new_link_active_model(code: &str, target: &str, now: DateTime<Utc>) -> short_link::ActiveModel {
    short_link::ActiveModel {
        id: NotSet,
        short_code: Set(code.to_string()),
        target_url: Set(target.to_string()),
        created_at: Set(now),
    }
}

/// 新建访问记录：关联列全部为 NULL
pub fn new_visit_active_model(visit: &NewVisit, now: DateTime<Utc>) -> visit_record::ActiveModel {
    visit_record::ActiveModel {
        id: NotSet,
        link_id: Set(visit.link_id),
        requestor_ip: Set(visit.requestor_ip.clone()),
        user_agent: Set(visit.user_agent.clone()),
        server_observed_data: Set(visit.server_observed.to_string()),
        client_payload: Set(None),
        behavior_payload: Set(None),
        combined_payload: Set(None),
        content_hash: Set(None),
        created_at: Set(now),
    }
}

/// 关联更新：只设置四个关联列，其余保持 NotSet
pub fn correlation_active_model(update: &CorrelationUpdate) -> visit_record::ActiveModel {
    visit_record::ActiveModel {
        id: NotSet,
        link_id: NotSet,
        requestor_ip: NotSet,
        user_agent: NotSet,
        server_observed_data: NotSet,
        client_payload: Set(Some(update.client_payload().to_string())),
        behavior_payload: Set(Some(update.behavior_payload().to_string())),
        combined_payload: Set(Some(update.combined_payload().to_string())),
        content_hash: Set(Some(update.content_hash().to_string())),
        created_at: NotSet,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveValue;
    use serde_json::json;

    fn visit_model() -> visit_record::Model {
        visit_record::Model {
            id: 42,
            link_id: 7,
            requestor_ip: Some("1.2.3.4".to_string()),
            user_agent: Some("curl/8".to_string()),
            server_observed_data: r#"{"host":"s.example"}"#.to_string(),
            client_payload: None,
            behavior_payload: None,
            combined_payload: None,
            content_hash: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_model_to_visit_record_uncorrelated() {
        let record = model_to_visit_record(visit_model());
        assert_eq!(record.id, 42);
        assert_eq!(record.server_observed_data, json!({"host": "s.example"}));
        assert!(record.client_payload.is_none());
        assert!(!record.is_correlated());
    }

    #[test]
    fn test_model_to_visit_record_keeps_broken_json_as_string() {
        let mut model = visit_model();
        model.client_payload = Some("{not json".to_string());
        let record = model_to_visit_record(model);
        assert_eq!(record.client_payload, Some(Value::String("{not json".to_string())));
    }

    #[test]
    fn test_new_visit_active_model_leaves_payload_columns_null() {
        let visit = NewVisit {
            link_id: 3,
            requestor_ip: None,
            user_agent: None,
            server_observed: json!({"path": "/abc"}),
        };
        let am = new_visit_active_model(&visit, Utc::now());
        assert!(matches!(am.id, ActiveValue::NotSet));
        assert_eq!(am.combined_payload, ActiveValue::Set(None));
        assert_eq!(am.content_hash, ActiveValue::Set(None));
        assert_eq!(
            am.server_observed_data,
            ActiveValue::Set(r#"{"path":"/abc"}"#.to_string())
        );
    }

    #[test]
    fn test_correlation_active_model_sets_only_correlation_columns() {
        let update = CorrelationUpdate::new(json!({"basic": {}}), json!({}));
        let am = correlation_active_model(&update);
        assert!(matches!(am.link_id, ActiveValue::NotSet));
        assert!(matches!(am.server_observed_data, ActiveValue::NotSet));
        assert!(matches!(am.created_at, ActiveValue::NotSet));
        assert_eq!(am.behavior_payload, ActiveValue::Set(Some("{}".to_string())));
        assert_eq!(
            am.content_hash,
            ActiveValue::Set(Some(update.content_hash().to_string()))
        );
    }
}
