//! The composite fingerprint document

use std::collections::BTreeMap;

use serde::Serialize;

use super::environment::{
    BatteryStatus, GpuInfo, NavigatorInfo, ScreenInfo, SensorReading, StorageEstimate,
    TimezoneInfo,
};
use super::listener::ListenerReport;
use super::probes::MediaDeviceCounts;
use super::signal::Signal;

/// 一次采集的完整结果；失败的分组序列化为 `null`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FingerprintPayload {
    pub basic: Option<BasicInfo>,
    pub hardware: Option<HardwareInfo>,
    pub graphics: Option<GraphicsInfo>,
    pub behavior: Option<BehaviorInfo>,
    pub meta: CollectionMeta,
}

impl FingerprintPayload {
    /// Every group `null`; used when a collection overruns its deadline
    pub fn abandoned(collection_duration_ms: u64) -> Self {
        Self {
            basic: None,
            hardware: None,
            graphics: None,
            behavior: None,
            meta: CollectionMeta {
                collection_duration_ms,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfo {
    pub navigator: Signal<NavigatorInfo>,
    pub screen: Signal<ScreenInfo>,
    pub timezone: Signal<TimezoneInfo>,
    pub css_features: Signal<BTreeMap<String, bool>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareInfo {
    pub battery: Signal<BatteryStatus>,
    pub storage: Signal<StorageEstimate>,
    pub media_devices: Signal<MediaDeviceCounts>,
    pub accelerometer: Signal<SensorReading>,
    pub gyroscope: Signal<SensorReading>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphicsInfo {
    pub gpu: Signal<GpuInfo>,
    pub fonts: Signal<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorInfo {
    pub pointer: Signal<ListenerReport>,
    pub keys: Signal<ListenerReport>,
    pub touch: Signal<ListenerReport>,
    pub scroll: Signal<ListenerReport>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionMeta {
    pub collection_duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failed_groups_serialize_as_null() {
        let payload = FingerprintPayload {
            basic: Some(BasicInfo {
                navigator: Signal::Absent,
                screen: Signal::Absent,
                timezone: Signal::Present(TimezoneInfo {
                    name: None,
                    offset_minutes: 480,
                }),
                css_features: Signal::Absent,
            }),
            hardware: None,
            graphics: None,
            behavior: None,
            meta: CollectionMeta {
                collection_duration_ms: 3,
            },
        };

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "basic": {
                    "navigator": null,
                    "screen": null,
                    "timezone": {"name": null, "offsetMinutes": 480},
                    "cssFeatures": null
                },
                "hardware": null,
                "graphics": null,
                "behavior": null,
                "meta": {"collectionDurationMs": 3}
            })
        );
    }
}
