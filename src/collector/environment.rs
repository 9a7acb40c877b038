//! The visitor environment the collector reads from
//!
//! Every accessor is optional. Synchronous accessors return `None` when
//! the value is not exposed; asynchronous reads return
//! [`ProbeUnavailable`]. The default implementations describe an
//! environment that supports nothing, so implementors only override what
//! they actually provide.

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::broadcast;

use super::signal::ProbeUnavailable;

/// Capabilities a probe checks before reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Navigator,
    Screen,
    Timezone,
    CssSupports,
    Gpu,
    FontMeasurement,
    Battery,
    StorageEstimate,
    MediaDevices,
    Sensor(SensorKind),
    Input(InputKind),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigatorInfo {
    pub user_agent: Option<String>,
    pub platform: Option<String>,
    pub language: Option<String>,
    pub languages: Vec<String>,
    pub hardware_concurrency: Option<u32>,
    pub device_memory_gb: Option<f64>,
    pub max_touch_points: Option<u32>,
    pub cookie_enabled: Option<bool>,
    pub do_not_track: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenInfo {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub avail_width: Option<u32>,
    pub avail_height: Option<u32>,
    pub color_depth: Option<u32>,
    pub pixel_ratio: Option<f64>,
    pub viewport_width: Option<u32>,
    pub viewport_height: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimezoneInfo {
    /// IANA 名称（如 `Asia/Shanghai`）
    pub name: Option<String>,
    /// UTC 偏移（分钟，东区为正）
    pub offset_minutes: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GpuInfo {
    pub vendor: Option<String>,
    pub renderer: Option<String>,
    pub version: Option<String>,
    pub shading_language_version: Option<String>,
    pub max_texture_size: Option<u32>,
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryStatus {
    pub charging: bool,
    /// 0.0 – 1.0
    pub level: f64,
    pub charging_time_secs: Option<f64>,
    pub discharging_time_secs: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageEstimate {
    pub quota_bytes: Option<u64>,
    pub usage_bytes: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaDeviceKind {
    AudioInput,
    AudioOutput,
    VideoInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SensorKind {
    Accelerometer,
    Gyroscope,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SensorReading {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InputKind {
    Pointer,
    Key,
    Touch,
    Scroll,
}

/// One observed input event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InputEvent {
    Pointer { x: f64, y: f64 },
    Key { key: String },
    Touch { x: f64, y: f64, points: u32 },
    Scroll { x: f64, y: f64 },
}

impl InputEvent {
    pub fn kind(&self) -> InputKind {
        match self {
            InputEvent::Pointer { .. } => InputKind::Pointer,
            InputEvent::Key { .. } => InputKind::Key,
            InputEvent::Touch { .. } => InputKind::Touch,
            InputEvent::Scroll { .. } => InputKind::Scroll,
        }
    }
}

#[async_trait]
pub trait Environment: Send + Sync {
    fn supports(&self, capability: Capability) -> bool;

    fn navigator(&self) -> Option<NavigatorInfo> {
        None
    }

    fn screen(&self) -> Option<ScreenInfo> {
        None
    }

    fn timezone(&self) -> Option<TimezoneInfo> {
        None
    }

    /// `CSS.supports(property, value)`
    fn css_supports(&self, _property: &str, _value: &str) -> Option<bool> {
        None
    }

    fn gpu(&self) -> Option<GpuInfo> {
        None
    }

    /// Rendered width of `sample` in the CSS font-family list `font`
    fn measure_text(&self, _font: &str, _sample: &str) -> Option<f64> {
        None
    }

    async fn battery(&self) -> Result<BatteryStatus, ProbeUnavailable> {
        Err(ProbeUnavailable::Unsupported("battery"))
    }

    async fn storage_estimate(&self) -> Result<StorageEstimate, ProbeUnavailable> {
        Err(ProbeUnavailable::Unsupported("storage estimate"))
    }

    async fn media_devices(&self) -> Result<Vec<MediaDeviceKind>, ProbeUnavailable> {
        Err(ProbeUnavailable::Unsupported("media devices"))
    }

    /// Resolves with the first reading; may never resolve on some devices
    async fn first_sensor_reading(
        &self,
        _sensor: SensorKind,
    ) -> Result<SensorReading, ProbeUnavailable> {
        Err(ProbeUnavailable::Unsupported("motion sensor"))
    }

    /// Register an observer for one input kind; dropping the receiver
    /// deregisters it
    fn subscribe(&self, _kind: InputKind) -> Option<broadcast::Receiver<InputEvent>> {
        None
    }
}
