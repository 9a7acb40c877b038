//! Collector integration tests
//!
//! Scripted environments drive the full boot sequence: collection,
//! background delivery and guaranteed navigation.

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

use linktrace::api::services::TrackRequest;
use linktrace::collector::environment::{
    BatteryStatus, MediaDeviceKind, NavigatorInfo, SensorKind, SensorReading, StorageEstimate,
    TimezoneInfo,
};
use linktrace::collector::{
    Capability, Collector, DeliveryFailure, Environment, InputEvent, InputKind, Navigator,
    PayloadTransport, Ticket, TrackEnvelope, boot,
};
use linktrace::config::CollectorConfig;
use linktrace::services::TrackingService;
use linktrace::storage::{CorrelationStore, LinkStore, NewVisit};

#[derive(Default)]
struct RecordingNavigator(Mutex<Vec<String>>);

impl Navigator for RecordingNavigator {
    fn navigate(&self, target: &str) {
        self.0.lock().unwrap().push(target.to_string());
    }
}

#[derive(Default)]
struct CapturingTransport(Mutex<Vec<TrackEnvelope>>);

#[async_trait]
impl PayloadTransport for CapturingTransport {
    async fn deliver(&self, envelope: TrackEnvelope) -> Result<(), DeliveryFailure> {
        self.0.lock().unwrap().push(envelope);
        Ok(())
    }
}

struct FailingTransport;

#[async_trait]
impl PayloadTransport for FailingTransport {
    async fn deliver(&self, _envelope: TrackEnvelope) -> Result<(), DeliveryFailure> {
        Err(DeliveryFailure::Status(503))
    }
}

/// Claims to support everything, then panics on every read
struct PanickingEnvironment;

#[async_trait]
impl Environment for PanickingEnvironment {
    fn supports(&self, _capability: Capability) -> bool {
        true
    }

    fn navigator(&self) -> Option<NavigatorInfo> {
        panic!("navigator exploded")
    }

    fn timezone(&self) -> Option<TimezoneInfo> {
        panic!("timezone exploded")
    }

    fn measure_text(&self, _font: &str, _sample: &str) -> Option<f64> {
        panic!("canvas exploded")
    }

    async fn first_sensor_reading(
        &self,
        _sensor: SensorKind,
    ) -> Result<SensorReading, linktrace::collector::ProbeUnavailable> {
        panic!("sensor exploded")
    }

    fn subscribe(&self, _kind: InputKind) -> Option<broadcast::Receiver<InputEvent>> {
        panic!("listener exploded")
    }
}

/// Navigator/timezone available, a sensor that never answers, and a
/// pointer source the test floods
struct ScriptedEnvironment {
    pointer: broadcast::Sender<InputEvent>,
}

impl ScriptedEnvironment {
    fn new() -> Self {
        let (pointer, _) = broadcast::channel(1024);
        Self { pointer }
    }
}

#[async_trait]
impl Environment for ScriptedEnvironment {
    fn supports(&self, capability: Capability) -> bool {
        matches!(
            capability,
            Capability::Navigator
                | Capability::Timezone
                | Capability::Sensor(_)
                | Capability::Input(InputKind::Pointer)
                | Capability::Input(InputKind::Key)
        )
    }

    fn navigator(&self) -> Option<NavigatorInfo> {
        Some(NavigatorInfo {
            user_agent: Some("scripted".to_string()),
            platform: Some("Linux x86_64".to_string()),
            language: Some("en-US".to_string()),
            languages: vec!["en-US".to_string()],
            hardware_concurrency: Some(8),
            ..NavigatorInfo::default()
        })
    }

    fn timezone(&self) -> Option<TimezoneInfo> {
        Some(TimezoneInfo {
            name: Some("Europe/Berlin".to_string()),
            offset_minutes: 60,
        })
    }

    async fn first_sensor_reading(
        &self,
        _sensor: SensorKind,
    ) -> Result<SensorReading, linktrace::collector::ProbeUnavailable> {
        std::future::pending().await
    }

    fn subscribe(&self, kind: InputKind) -> Option<broadcast::Receiver<InputEvent>> {
        match kind {
            InputKind::Pointer => Some(self.pointer.subscribe()),
            // 键盘源存在但没有事件
            InputKind::Key => Some(self.pointer.subscribe()),
            _ => None,
        }
    }
}

/// Battery and media-device promises that never settle
struct HungHardwareEnvironment;

#[async_trait]
impl Environment for HungHardwareEnvironment {
    fn supports(&self, capability: Capability) -> bool {
        matches!(
            capability,
            Capability::Battery | Capability::StorageEstimate | Capability::MediaDevices
        )
    }

    async fn battery(&self) -> Result<BatteryStatus, linktrace::collector::ProbeUnavailable> {
        std::future::pending().await
    }

    async fn storage_estimate(
        &self,
    ) -> Result<StorageEstimate, linktrace::collector::ProbeUnavailable> {
        Ok(StorageEstimate {
            quota_bytes: Some(1 << 30),
            usage_bytes: Some(4096),
        })
    }

    async fn media_devices(
        &self,
    ) -> Result<Vec<MediaDeviceKind>, linktrace::collector::ProbeUnavailable> {
        std::future::pending().await
    }
}

fn ticket(id: i64) -> Ticket {
    Ticket {
        id,
        target: "https://example.com".to_string(),
    }
}

#[tokio::test(start_paused = true)]
async fn test_navigates_even_when_every_probe_panics() {
    let collector = Collector::new(CollectorConfig::default());
    let navigator = RecordingNavigator::default();
    let transport = Arc::new(CapturingTransport::default());

    let outcome = boot::run(
        &collector,
        &PanickingEnvironment,
        transport.clone(),
        &navigator,
        ticket(42),
    )
    .await;

    assert_eq!(outcome.navigated_to, "https://example.com");
    assert_eq!(*navigator.0.lock().unwrap(), vec!["https://example.com"]);
    outcome.delivery.await.unwrap().unwrap();

    let delivered = transport.0.lock().unwrap();
    assert_eq!(delivered.len(), 1);
    let json = serde_json::to_value(&delivered[0]).unwrap();
    assert_eq!(json["id"], 42);
    assert_eq!(json["clientData"]["basic"]["navigator"], Value::Null);
    assert_eq!(json["clientData"]["basic"]["timezone"], Value::Null);
    assert_eq!(json["clientData"]["graphics"]["fonts"], Value::Null);
    assert_eq!(json["behavior"]["pointer"], Value::Null);
    assert!(json["combined"]["meta"]["collectionDurationMs"].as_u64().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_delivery_failure_does_not_block_navigation() {
    let collector = Collector::new(CollectorConfig::default());
    let navigator = RecordingNavigator::default();

    let outcome = boot::run(
        &collector,
        &ScriptedEnvironment::new(),
        Arc::new(FailingTransport),
        &navigator,
        ticket(7),
    )
    .await;

    assert_eq!(navigator.0.lock().unwrap().len(), 1);
    assert_eq!(outcome.delivery.await.unwrap(), Err(DeliveryFailure::Status(503)));
}

#[tokio::test(start_paused = true)]
async fn test_hung_battery_api_does_not_block_navigation() {
    let config = CollectorConfig {
        probe_timeout_ms: 1500,
        ..CollectorConfig::default()
    };
    let collector = Collector::new(config);
    let navigator = RecordingNavigator::default();
    let transport = Arc::new(CapturingTransport::default());
    let started = tokio::time::Instant::now();

    let outcome = boot::run(
        &collector,
        &HungHardwareEnvironment,
        transport.clone(),
        &navigator,
        ticket(9),
    )
    .await;

    assert!(started.elapsed() < collector.deadline());
    assert_eq!(*navigator.0.lock().unwrap(), vec!["https://example.com"]);
    outcome.delivery.await.unwrap().unwrap();

    let delivered = transport.0.lock().unwrap();
    let json = serde_json::to_value(&delivered[0]).unwrap();
    let hardware = &json["clientData"]["hardware"];
    assert_eq!(hardware["battery"], Value::Null);
    assert_eq!(hardware["mediaDevices"], Value::Null);
    assert_eq!(hardware["storage"]["usageBytes"], 4096);
}

#[tokio::test(start_paused = true)]
async fn test_flooded_listener_is_time_boxed_and_hung_sensor_times_out() {
    let config = CollectorConfig {
        behavior_window_ms: 1000,
        pointer_max_samples: 10_000,
        ..CollectorConfig::default()
    };
    let collector = Collector::new(config);
    let env = ScriptedEnvironment::new();

    // 每 2ms 一个指针事件，持续 5 秒
    let tx = env.pointer.clone();
    let flood = tokio::spawn(async move {
        for i in 0..2500u32 {
            let _ = tx.send(InputEvent::Pointer {
                x: f64::from(i),
                y: 0.0,
            });
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    });

    let payload = collector.collect(&env).await;
    flood.abort();

    let json = serde_json::to_value(&payload).unwrap();
    let pointer = &json["behavior"]["pointer"];
    assert_eq!(pointer["retiredBy"], "window");
    assert!(pointer["elapsedMs"].as_u64().unwrap() <= 1010);
    let samples = pointer["samples"].as_array().unwrap();
    assert!(!samples.is_empty());
    assert!(samples.len() <= 501, "got {} samples", samples.len());
    assert!(samples.iter().all(|s| s["t"].as_u64().unwrap() <= 1000));

    // 键盘订阅共享同一个源，只保留键盘事件
    assert_eq!(json["behavior"]["keys"]["samples"], serde_json::json!([]));
    assert_eq!(json["behavior"]["touch"], Value::Null);

    // 传感器永不返回：按超时记为缺失
    assert_eq!(json["hardware"]["accelerometer"], Value::Null);
    assert_eq!(json["hardware"]["gyroscope"], Value::Null);

    assert_eq!(json["basic"]["navigator"]["platform"], "Linux x86_64");
    assert_eq!(json["basic"]["timezone"]["offsetMinutes"], 60);
    assert!(json["meta"]["collectionDurationMs"].as_u64().unwrap() >= 1000);
}

#[tokio::test(start_paused = true)]
async fn test_sample_ceiling_retires_listener_early() {
    let config = CollectorConfig {
        behavior_window_ms: 1000,
        pointer_max_samples: 5,
        ..CollectorConfig::default()
    };
    let collector = Collector::new(config);
    let env = ScriptedEnvironment::new();

    let tx = env.pointer.clone();
    let flood = tokio::spawn(async move {
        loop {
            let _ = tx.send(InputEvent::Pointer { x: 1.0, y: 2.0 });
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    });

    let payload = collector.collect(&env).await;
    flood.abort();

    let json = serde_json::to_value(&payload).unwrap();
    let pointer = &json["behavior"]["pointer"];
    assert_eq!(pointer["retiredBy"], "sampleCeiling");
    assert_eq!(pointer["samples"].as_array().unwrap().len(), 5);
    assert!(pointer["elapsedMs"].as_u64().unwrap() < 1000);
}

/// Delivers straight into the correlation service, the way `/api/track` would
struct SinkTransport(Arc<TrackingService>);

#[async_trait]
impl PayloadTransport for SinkTransport {
    async fn deliver(&self, envelope: TrackEnvelope) -> Result<(), DeliveryFailure> {
        let body = serde_json::to_string(&envelope)
            .map_err(|e| DeliveryFailure::Serialization(e.to_string()))?;
        let request: TrackRequest = serde_json::from_str(&body)
            .map_err(|e| DeliveryFailure::Serialization(e.to_string()))?;
        self.0
            .correlate(request.id, request.client_data, request.behavior)
            .await
            .map(|_| ())
            .map_err(|e| DeliveryFailure::Transport(e.to_string()))
    }
}

#[tokio::test]
async fn test_boot_payload_lands_in_visit_record() {
    let (storage, _dir) = common::create_temp_storage().await;
    let link_id = storage.create("abc123", "https://example.com").await.unwrap();
    let id = storage
        .open(NewVisit {
            link_id,
            requestor_ip: None,
            user_agent: None,
            server_observed: serde_json::json!({"path": "/abc123"}),
        })
        .await
        .unwrap();

    let config = CollectorConfig {
        behavior_window_ms: 20,
        sensor_timeout_ms: 20,
        ..CollectorConfig::default()
    };
    let collector = Collector::new(config);
    let navigator = RecordingNavigator::default();
    let tracking = Arc::new(TrackingService::new(storage.clone()));

    let outcome = boot::run(
        &collector,
        &ScriptedEnvironment::new(),
        Arc::new(SinkTransport(tracking)),
        &navigator,
        ticket(id),
    )
    .await;
    outcome.delivery.await.unwrap().unwrap();

    let record = storage.find(id).await.unwrap().unwrap();
    let client = record.client_payload.expect("client payload stored");
    assert_eq!(client["basic"]["navigator"]["language"], "en-US");
    assert!(client.get("meta").is_none());
    let behavior = record.behavior_payload.expect("behavior stored");
    assert_eq!(behavior["pointer"]["retiredBy"], "window");
    assert_eq!(
        record.combined_payload,
        Some(serde_json::json!({"clientData": client, "behavior": behavior}))
    );
    assert!(record.content_hash.is_some());
}
