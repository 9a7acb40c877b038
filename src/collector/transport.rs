//! Delivery of the collected payload to `POST /api/track`

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::trace;
use ureq::Agent;

use super::payload::{BasicInfo, BehaviorInfo, FingerprintPayload, GraphicsInfo, HardwareInfo};

/// Request body of `POST /api/track`
///
/// `combined` repeats the whole payload; the server ignores it and
/// recomputes the tuple itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackEnvelope {
    pub id: i64,
    pub client_data: ClientData,
    pub behavior: Option<BehaviorInfo>,
    pub combined: FingerprintPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientData {
    pub basic: Option<BasicInfo>,
    pub hardware: Option<HardwareInfo>,
    pub graphics: Option<GraphicsInfo>,
}

impl TrackEnvelope {
    pub fn new(id: i64, payload: FingerprintPayload) -> Self {
        Self {
            id,
            client_data: ClientData {
                basic: payload.basic.clone(),
                hardware: payload.hardware.clone(),
                graphics: payload.graphics.clone(),
            },
            behavior: payload.behavior.clone(),
            combined: payload,
        }
    }
}

/// Delivery did not complete; logged by the caller and otherwise ignored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryFailure {
    Transport(String),
    Status(u16),
    Timeout,
    Serialization(String),
}

impl fmt::Display for DeliveryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryFailure::Transport(msg) => write!(f, "transport error: {}", msg),
            DeliveryFailure::Status(code) => write!(f, "sink answered HTTP {}", code),
            DeliveryFailure::Timeout => write!(f, "delivery timed out"),
            DeliveryFailure::Serialization(msg) => write!(f, "payload serialization failed: {}", msg),
        }
    }
}

impl std::error::Error for DeliveryFailure {}

#[async_trait]
pub trait PayloadTransport: Send + Sync {
    async fn deliver(&self, envelope: TrackEnvelope) -> Result<(), DeliveryFailure>;
}

/// Blocking ureq client driven from `spawn_blocking`
pub struct HttpTransport {
    endpoint: String,
    agent: Agent,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();

        Self {
            endpoint: endpoint.into(),
            agent,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn post_sync(agent: Agent, endpoint: String, body: String) -> Result<(), DeliveryFailure> {
        match agent
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .send(body)
        {
            Ok(resp) => {
                trace!("Track delivery to {} answered {}", endpoint, resp.status());
                Ok(())
            }
            Err(ureq::Error::StatusCode(code)) => Err(DeliveryFailure::Status(code)),
            Err(ureq::Error::Timeout(_)) => Err(DeliveryFailure::Timeout),
            Err(e) => Err(DeliveryFailure::Transport(e.to_string())),
        }
    }
}

#[async_trait]
impl PayloadTransport for HttpTransport {
    async fn deliver(&self, envelope: TrackEnvelope) -> Result<(), DeliveryFailure> {
        let body = serde_json::to_string(&envelope)
            .map_err(|e| DeliveryFailure::Serialization(e.to_string()))?;
        let agent = self.agent.clone();
        let endpoint = self.endpoint.clone();

        tokio::task::spawn_blocking(move || Self::post_sync(agent, endpoint, body))
            .await
            .map_err(|e| DeliveryFailure::Transport(format!("delivery task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::payload::CollectionMeta;
    use serde_json::json;

    #[test]
    fn test_envelope_splits_client_data_and_behavior() {
        let payload = FingerprintPayload {
            basic: None,
            hardware: None,
            graphics: None,
            behavior: None,
            meta: CollectionMeta {
                collection_duration_ms: 12,
            },
        };
        let envelope = TrackEnvelope::new(42, payload);

        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "id": 42,
                "clientData": {"basic": null, "hardware": null, "graphics": null},
                "behavior": null,
                "combined": {
                    "basic": null,
                    "hardware": null,
                    "graphics": null,
                    "behavior": null,
                    "meta": {"collectionDurationMs": 12}
                }
            })
        );
    }

    #[tokio::test]
    async fn test_unreachable_sink_is_a_delivery_failure() {
        // 端口 9 (discard) 在测试环境中不会有 HTTP 服务
        let transport = HttpTransport::new("http://127.0.0.1:9/api/track", Duration::from_millis(500));
        let payload = FingerprintPayload {
            basic: None,
            hardware: None,
            graphics: None,
            behavior: None,
            meta: CollectionMeta {
                collection_duration_ms: 0,
            },
        };
        let result = transport.deliver(TrackEnvelope::new(1, payload)).await;
        assert!(result.is_err());
    }
}
