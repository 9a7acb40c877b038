//! Asynchronous hardware probes: power, storage, media devices, motion sensors

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use super::{SignalProbe, bounded, require};
use crate::collector::environment::{
    BatteryStatus, Capability, Environment, MediaDeviceKind, SensorKind, SensorReading,
    StorageEstimate,
};
use crate::collector::signal::ProbeUnavailable;

/// 异步读取都有上限，挂起的 API 按超时记为缺失
pub struct BatteryProbe {
    timeout: Duration,
}

impl BatteryProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl SignalProbe for BatteryProbe {
    type Output = BatteryStatus;

    fn name(&self) -> &'static str {
        "battery"
    }

    async fn read(&self, env: &dyn Environment) -> Result<BatteryStatus, ProbeUnavailable> {
        require(env, Capability::Battery, "battery")?;
        bounded(self.timeout, env.battery()).await
    }
}

pub struct StorageProbe {
    timeout: Duration,
}

impl StorageProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl SignalProbe for StorageProbe {
    type Output = StorageEstimate;

    fn name(&self) -> &'static str {
        "storage"
    }

    async fn read(&self, env: &dyn Environment) -> Result<StorageEstimate, ProbeUnavailable> {
        require(env, Capability::StorageEstimate, "storage estimate")?;
        bounded(self.timeout, env.storage_estimate()).await
    }
}

/// 只记录各类设备数量，不记录设备标识
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDeviceCounts {
    pub audio_input: u32,
    pub audio_output: u32,
    pub video_input: u32,
}

impl MediaDeviceCounts {
    fn tally(devices: &[MediaDeviceKind]) -> Self {
        devices.iter().fold(Self::default(), |mut counts, kind| {
            match kind {
                MediaDeviceKind::AudioInput => counts.audio_input += 1,
                MediaDeviceKind::AudioOutput => counts.audio_output += 1,
                MediaDeviceKind::VideoInput => counts.video_input += 1,
            }
            counts
        })
    }
}

pub struct MediaDevicesProbe {
    timeout: Duration,
}

impl MediaDevicesProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl SignalProbe for MediaDevicesProbe {
    type Output = MediaDeviceCounts;

    fn name(&self) -> &'static str {
        "mediaDevices"
    }

    async fn read(&self, env: &dyn Environment) -> Result<MediaDeviceCounts, ProbeUnavailable> {
        require(env, Capability::MediaDevices, "media devices")?;
        let devices = bounded(self.timeout, env.media_devices()).await?;
        Ok(MediaDeviceCounts::tally(&devices))
    }
}

/// First reading of a motion sensor, bounded by `timeout`
pub struct SensorProbe {
    sensor: SensorKind,
    timeout: Duration,
}

impl SensorProbe {
    pub fn new(sensor: SensorKind, timeout: Duration) -> Self {
        Self { sensor, timeout }
    }
}

#[async_trait]
impl SignalProbe for SensorProbe {
    type Output = SensorReading;

    fn name(&self) -> &'static str {
        match self.sensor {
            SensorKind::Accelerometer => "accelerometer",
            SensorKind::Gyroscope => "gyroscope",
        }
    }

    async fn read(&self, env: &dyn Environment) -> Result<SensorReading, ProbeUnavailable> {
        require(env, Capability::Sensor(self.sensor), "motion sensor")?;

        bounded(self.timeout, env.first_sensor_reading(self.sensor)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::signal::Signal;

    /// Sensors are "supported" but never fire
    struct SilentSensors;

    #[async_trait]
    impl Environment for SilentSensors {
        fn supports(&self, capability: Capability) -> bool {
            matches!(
                capability,
                Capability::Sensor(_) | Capability::MediaDevices | Capability::Battery
            )
        }

        async fn first_sensor_reading(
            &self,
            _sensor: SensorKind,
        ) -> Result<SensorReading, ProbeUnavailable> {
            std::future::pending().await
        }

        async fn battery(&self) -> Result<BatteryStatus, ProbeUnavailable> {
            std::future::pending().await
        }

        async fn media_devices(&self) -> Result<Vec<MediaDeviceKind>, ProbeUnavailable> {
            Ok(vec![
                MediaDeviceKind::AudioInput,
                MediaDeviceKind::AudioOutput,
                MediaDeviceKind::AudioOutput,
                MediaDeviceKind::VideoInput,
            ])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_sensor_times_out() {
        let probe = SensorProbe::new(SensorKind::Gyroscope, Duration::from_millis(500));
        let started = tokio::time::Instant::now();
        let result = probe.read(&SilentSensors).await;
        assert_eq!(result, Err(ProbeUnavailable::TimedOut { after_ms: 500 }));
        assert_eq!(started.elapsed(), Duration::from_millis(500));
        assert_eq!(probe.attempt(&SilentSensors).await, Signal::Absent);
    }

    #[tokio::test]
    async fn test_media_devices_are_counted() {
        let counts = MediaDevicesProbe::new(Duration::from_millis(100))
            .read(&SilentSensors)
            .await
            .unwrap();
        assert_eq!(
            counts,
            MediaDeviceCounts {
                audio_input: 1,
                audio_output: 2,
                video_input: 1,
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_battery_read_times_out() {
        let probe = BatteryProbe::new(Duration::from_millis(1500));
        let started = tokio::time::Instant::now();
        let result = probe.read(&SilentSensors).await;
        assert_eq!(result, Err(ProbeUnavailable::TimedOut { after_ms: 1500 }));
        assert_eq!(started.elapsed(), Duration::from_millis(1500));
        assert_eq!(probe.attempt(&SilentSensors).await, Signal::Absent);
    }
}
