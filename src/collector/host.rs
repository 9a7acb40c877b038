//! Native headless environment
//!
//! 命令行访客使用：只暴露宿主机能回答的能力（系统描述、时区、Linux 电池），
//! 其余能力（屏幕、GPU、输入事件等）一律不支持。

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{Local, Offset};
use tracing::trace;

use super::environment::{BatteryStatus, Capability, Environment, NavigatorInfo, TimezoneInfo};
use super::signal::ProbeUnavailable;

const DEFAULT_POWER_SUPPLY_ROOT: &str = "/sys/class/power_supply";

pub struct HostEnvironment {
    power_supply_root: PathBuf,
}

impl Default for HostEnvironment {
    fn default() -> Self {
        Self::with_power_supply_root(DEFAULT_POWER_SUPPLY_ROOT)
    }
}

impl HostEnvironment {
    pub fn with_power_supply_root(root: impl Into<PathBuf>) -> Self {
        Self {
            power_supply_root: root.into(),
        }
    }

    /// `en_US.UTF-8` → `en-US`
    fn language_tag(locale: &str) -> Option<String> {
        let tag = locale.split(['.', '@']).next()?.replace('_', "-");
        match tag.as_str() {
            "" | "C" | "POSIX" => None,
            _ => Some(tag),
        }
    }

    async fn read_trimmed(path: PathBuf) -> Option<String> {
        tokio::fs::read_to_string(path)
            .await
            .ok()
            .map(|s| s.trim().to_string())
    }
}

#[async_trait]
impl Environment for HostEnvironment {
    fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Navigator | Capability::Timezone => true,
            Capability::Battery => self.power_supply_root.is_dir(),
            _ => false,
        }
    }

    fn navigator(&self) -> Option<NavigatorInfo> {
        let language = std::env::var("LC_ALL")
            .ok()
            .or_else(|| std::env::var("LANG").ok())
            .and_then(|locale| Self::language_tag(&locale));
        let languages = std::env::var("LANGUAGE")
            .ok()
            .map(|list| list.split(':').filter_map(Self::language_tag).collect())
            .unwrap_or_else(|| language.iter().cloned().collect());

        Some(NavigatorInfo {
            user_agent: Some(format!(
                "linktrace/{} ({}; {})",
                env!("CARGO_PKG_VERSION"),
                std::env::consts::OS,
                std::env::consts::ARCH
            )),
            platform: Some(format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH)),
            language,
            languages,
            hardware_concurrency: u32::try_from(num_cpus::get()).ok(),
            device_memory_gb: None,
            max_touch_points: Some(0),
            cookie_enabled: Some(false),
            do_not_track: None,
        })
    }

    fn timezone(&self) -> Option<TimezoneInfo> {
        let offset_seconds = Local::now().offset().fix().local_minus_utc();
        Some(TimezoneInfo {
            name: std::env::var("TZ").ok().filter(|tz| !tz.is_empty()),
            offset_minutes: offset_seconds / 60,
        })
    }

    async fn battery(&self) -> Result<BatteryStatus, ProbeUnavailable> {
        let mut entries = tokio::fs::read_dir(&self.power_supply_root)
            .await
            .map_err(|e| ProbeUnavailable::failed(format!("power supply listing: {}", e)))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ProbeUnavailable::failed(e.to_string()))?
        {
            let dir = entry.path();
            if Self::read_trimmed(dir.join("type")).await.as_deref() != Some("Battery") {
                continue;
            }

            let Some(capacity) = Self::read_trimmed(dir.join("capacity"))
                .await
                .and_then(|c| c.parse::<f64>().ok())
            else {
                continue;
            };
            let status = Self::read_trimmed(dir.join("status")).await.unwrap_or_default();
            trace!("Battery {:?}: capacity={} status={}", dir, capacity, status);

            return Ok(BatteryStatus {
                charging: matches!(status.as_str(), "Charging" | "Full"),
                level: (capacity / 100.0).clamp(0.0, 1.0),
                charging_time_secs: None,
                discharging_time_secs: None,
            });
        }

        Err(ProbeUnavailable::Unsupported("battery"))
    }
}
