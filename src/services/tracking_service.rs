//! Visit tracking: opening records on redirect and correlating payloads

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info};

use super::observation::ServerObservation;
use crate::errors::Result;
use crate::storage::{CorrelationStore, CorrelationUpdate, NewVisit, ShortLink};

/// Acknowledgement of one correlation call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Correlation {
    pub id: i64,
    pub content_hash: String,
    #[serde(skip)]
    pub overwrote_previous: bool,
}

pub struct TrackingService {
    visits: Arc<dyn CorrelationStore>,
}

impl TrackingService {
    pub fn new(visits: Arc<dyn CorrelationStore>) -> Self {
        Self { visits }
    }

    /// Open the provisional record for a redirect
    ///
    /// `None` when the record could not be stored; the caller still
    /// redirects.
    pub async fn open_visit(&self, link: &ShortLink, observation: &ServerObservation) -> Option<i64> {
        let server_observed = match serde_json::to_value(observation) {
            Ok(value) => value,
            Err(e) => {
                error!("Failed to serialize observation for '{}': {}", link.code, e);
                return None;
            }
        };

        let visit = NewVisit {
            link_id: link.id,
            requestor_ip: observation.ip.clone(),
            user_agent: observation.user_agent.clone(),
            server_observed,
        };

        match self.visits.open(visit).await {
            Ok(id) => {
                debug!("Visit {} opened for '{}'", id, link.code);
                Some(id)
            }
            Err(e) => {
                error!("Failed to open visit record for '{}': {}", link.code, e);
                None
            }
        }
    }

    /// Merge a delivered payload into record `id`
    pub async fn correlate(&self, id: i64, client_data: Value, behavior: Value) -> Result<Correlation> {
        let update = CorrelationUpdate::new(client_data, behavior);
        let content_hash = update.content_hash().to_string();

        let outcome = self.visits.attach(id, update).await?;
        info!("Visit {} correlated, hash {}", id, content_hash);

        Ok(Correlation {
            id,
            content_hash,
            overwrote_previous: outcome.overwrote_previous,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LinktraceError;
    use crate::storage::{AttachOutcome, VisitRecord};
    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::RwLock;

    #[derive(Default)]
    struct MemoryVisits {
        records: RwLock<Vec<VisitRecord>>,
    }

    #[async_trait]
    impl CorrelationStore for MemoryVisits {
        async fn open(&self, visit: NewVisit) -> Result<i64> {
            let mut records = self.records.write().await;
            let id = records.len() as i64 + 1;
            records.push(VisitRecord {
                id,
                link_id: visit.link_id,
                requestor_ip: visit.requestor_ip,
                user_agent: visit.user_agent,
                server_observed_data: visit.server_observed,
                client_payload: None,
                behavior_payload: None,
                combined_payload: None,
                content_hash: None,
                created_at: chrono::Utc::now(),
            });
            Ok(id)
        }

        async fn find(&self, id: i64) -> Result<Option<VisitRecord>> {
            Ok(self.records.read().await.iter().find(|r| r.id == id).cloned())
        }

        async fn attach(&self, id: i64, update: CorrelationUpdate) -> Result<AttachOutcome> {
            let mut records = self.records.write().await;
            let record = records
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| LinktraceError::not_found(id.to_string()))?;
            let overwrote_previous = record.content_hash.is_some();
            record.client_payload = Some(update.client_payload().clone());
            record.behavior_payload = Some(update.behavior_payload().clone());
            record.combined_payload = Some(update.combined_payload().clone());
            record.content_hash = Some(update.content_hash().to_string());
            Ok(AttachOutcome { overwrote_previous })
        }

        async fn count(&self) -> Result<u64> {
            Ok(self.records.read().await.len() as u64)
        }
    }

    fn link() -> ShortLink {
        ShortLink {
            id: 1,
            code: "abc123".into(),
            target: "https://example.com".into(),
            created_at: chrono::Utc::now(),
        }
    }

    fn observation() -> ServerObservation {
        let req = actix_web::test::TestRequest::get()
            .uri("/abc123")
            .insert_header(("user-agent", "curl/8.5.0"))
            .to_http_request();
        ServerObservation::capture(&req, chrono::Utc::now(), std::time::Duration::ZERO, &[], true)
    }

    #[tokio::test]
    async fn test_open_then_correlate() {
        let store = Arc::new(MemoryVisits::default());
        let service = TrackingService::new(store.clone());

        let id = service.open_visit(&link(), &observation()).await.unwrap();
        let record = store.find(id).await.unwrap().unwrap();
        assert_eq!(record.user_agent.as_deref(), Some("curl/8.5.0"));
        assert_eq!(record.server_observed_data["path"], "/abc123");
        assert!(!record.is_correlated());

        let ack = service
            .correlate(id, json!({"basic": {"platform": "x"}}), json!({}))
            .await
            .unwrap();
        assert!(!ack.overwrote_previous);
        let record = store.find(id).await.unwrap().unwrap();
        assert_eq!(record.behavior_payload, Some(json!({})));
        assert_eq!(record.content_hash.as_deref(), Some(ack.content_hash.as_str()));
    }

    #[tokio::test]
    async fn test_second_delivery_overwrites() {
        let store = Arc::new(MemoryVisits::default());
        let service = TrackingService::new(store.clone());
        let id = service.open_visit(&link(), &observation()).await.unwrap();

        service.correlate(id, json!({"a": 1}), json!({})).await.unwrap();
        let second = service.correlate(id, json!({"a": 2}), json!({})).await.unwrap();
        assert!(second.overwrote_previous);

        let record = store.find(id).await.unwrap().unwrap();
        assert_eq!(record.client_payload, Some(json!({"a": 2})));
        assert_eq!(record.content_hash, Some(second.content_hash));
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found_and_creates_nothing() {
        let store = Arc::new(MemoryVisits::default());
        let service = TrackingService::new(store.clone());

        let err = service.correlate(99, json!({}), json!({})).await.unwrap_err();
        assert!(matches!(err, LinktraceError::NotFound(_)));
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
