//! Fingerprint collector
//!
//! 四个分组并发执行，每个分组单独隔离 panic；分组失败只会让该分组为 `null`。

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::environment::{Environment, InputKind, SensorKind};
use super::payload::{
    BasicInfo, BehaviorInfo, CollectionMeta, FingerprintPayload, GraphicsInfo, HardwareInfo,
};
use super::probes::{
    BatteryProbe, CssFeaturesProbe, FontProbe, GpuProbe, InputProbe, MediaDevicesProbe,
    NavigatorProbe, ScreenProbe, SensorProbe, SignalProbe, StorageProbe, TimezoneProbe,
};
use crate::config::CollectorConfig;

/// Await a group, turning a panic into `None`
pub(crate) async fn isolate<T, F>(group: &'static str, fut: F) -> Option<T>
where
    F: Future<Output = T>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("collector group {} panicked, reporting null", group);
            None
        }
    }
}

pub struct Collector {
    config: CollectorConfig,
    fonts: FontProbe,
}

impl Collector {
    pub fn new(config: CollectorConfig) -> Self {
        Self {
            config,
            fonts: FontProbe::default(),
        }
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Upper bound for a whole collection: behavior window, slowest probe, 1s slack
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(
            self.config.behavior_window_ms
                + self
                    .config
                    .probe_timeout_ms
                    .max(self.config.sensor_timeout_ms)
                + 1000,
        )
    }

    /// Gather every group; always resolves
    pub async fn collect(&self, env: &dyn Environment) -> FingerprintPayload {
        let started = Instant::now();

        let (basic, hardware, graphics, behavior) = tokio::join!(
            isolate("basic", self.basic(env)),
            isolate("hardware", self.hardware(env)),
            isolate("graphics", self.graphics(env)),
            isolate("behavior", self.behavior(env)),
        );

        let collection_duration_ms = started.elapsed().as_millis() as u64;
        debug!("Fingerprint collected in {} ms", collection_duration_ms);

        FingerprintPayload {
            basic,
            hardware,
            graphics,
            behavior,
            meta: CollectionMeta {
                collection_duration_ms,
            },
        }
    }

    async fn basic(&self, env: &dyn Environment) -> BasicInfo {
        BasicInfo {
            navigator: NavigatorProbe.attempt(env).await,
            screen: ScreenProbe.attempt(env).await,
            timezone: TimezoneProbe.attempt(env).await,
            css_features: CssFeaturesProbe.attempt(env).await,
        }
    }

    async fn hardware(&self, env: &dyn Environment) -> HardwareInfo {
        let probe_timeout = Duration::from_millis(self.config.probe_timeout_ms);
        let sensor_timeout = Duration::from_millis(self.config.sensor_timeout_ms);
        let accelerometer = SensorProbe::new(SensorKind::Accelerometer, sensor_timeout);
        let gyroscope = SensorProbe::new(SensorKind::Gyroscope, sensor_timeout);
        let battery = BatteryProbe::new(probe_timeout);
        let storage = StorageProbe::new(probe_timeout);
        let media_devices = MediaDevicesProbe::new(probe_timeout);

        let (battery, storage, media_devices, accelerometer, gyroscope) = tokio::join!(
            battery.attempt(env),
            storage.attempt(env),
            media_devices.attempt(env),
            accelerometer.attempt(env),
            gyroscope.attempt(env),
        );

        HardwareInfo {
            battery,
            storage,
            media_devices,
            accelerometer,
            gyroscope,
        }
    }

    async fn graphics(&self, env: &dyn Environment) -> GraphicsInfo {
        GraphicsInfo {
            gpu: GpuProbe.attempt(env).await,
            fonts: self.fonts.attempt(env).await,
        }
    }

    async fn behavior(&self, env: &dyn Environment) -> BehaviorInfo {
        let window = Duration::from_millis(self.config.behavior_window_ms);
        let pointer = InputProbe::new(InputKind::Pointer, window, self.config.pointer_max_samples);
        let keys = InputProbe::new(InputKind::Key, window, self.config.key_max_samples);
        let touch = InputProbe::new(InputKind::Touch, window, self.config.touch_max_samples);
        let scroll = InputProbe::new(InputKind::Scroll, window, self.config.scroll_max_samples);

        let (pointer, keys, touch, scroll) = tokio::join!(
            pointer.attempt(env),
            keys.attempt(env),
            touch.attempt(env),
            scroll.attempt(env),
        );

        BehaviorInfo {
            pointer,
            keys,
            touch,
            scroll,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_isolate_contains_panics() {
        let panicked = isolate("test", async {
            if true {
                panic!("group failure");
            }
            1u32
        })
        .await;
        assert_eq!(panicked, None);
        assert_eq!(isolate("test", async { 5 }).await, Some(5));
    }

    #[test]
    fn test_deadline_covers_window_and_slowest_probe() {
        let collector = Collector::new(CollectorConfig::default());
        assert_eq!(collector.deadline(), Duration::from_millis(1000 + 1500 + 1000));
    }
}
