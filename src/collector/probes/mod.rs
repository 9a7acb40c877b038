//! Signal probes
//!
//! 每个探针只读取一类信号，失败（包括 panic）都在 [`SignalProbe::attempt`]
//! 内部收敛为 [`Signal::Absent`]。

mod basic;
mod behavior;
mod graphics;
mod hardware;

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::FutureExt;
use tracing::{debug, warn};

use super::environment::Environment;
use super::signal::{ProbeUnavailable, Signal};

pub use basic::{CssFeaturesProbe, NavigatorProbe, ScreenProbe, TimezoneProbe};
pub use behavior::InputProbe;
pub use graphics::{FONT_BASELINES, FontProbe, GpuProbe};
pub use hardware::{BatteryProbe, MediaDeviceCounts, MediaDevicesProbe, SensorProbe, StorageProbe};

#[async_trait]
pub trait SignalProbe: Send + Sync {
    type Output: Send + 'static;

    fn name(&self) -> &'static str;

    /// Capability check followed by the actual read
    async fn read(&self, env: &dyn Environment) -> Result<Self::Output, ProbeUnavailable>;

    /// Run the probe; never fails and never panics
    async fn attempt(&self, env: &dyn Environment) -> Signal<Self::Output> {
        match AssertUnwindSafe(self.read(env)).catch_unwind().await {
            Ok(Ok(value)) => Signal::Present(value),
            Ok(Err(reason)) => {
                debug!("probe {} absent: {}", self.name(), reason);
                Signal::Absent
            }
            Err(_) => {
                warn!("probe {} panicked, reporting absent", self.name());
                Signal::Absent
            }
        }
    }
}

/// Await an environment read for at most `limit`
pub(crate) async fn bounded<T, F>(limit: Duration, read: F) -> Result<T, ProbeUnavailable>
where
    F: Future<Output = Result<T, ProbeUnavailable>>,
{
    tokio::time::timeout(limit, read)
        .await
        .map_err(|_| ProbeUnavailable::TimedOut {
            after_ms: limit.as_millis() as u64,
        })?
}

/// Gate a read on a capability
pub(crate) fn require(
    env: &dyn Environment,
    capability: super::environment::Capability,
    what: &'static str,
) -> Result<(), ProbeUnavailable> {
    if env.supports(capability) {
        Ok(())
    } else {
        Err(ProbeUnavailable::Unsupported(what))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::environment::Capability;

    struct Nothing;

    #[async_trait]
    impl Environment for Nothing {
        fn supports(&self, _capability: Capability) -> bool {
            false
        }
    }

    struct Exploding;

    #[async_trait]
    impl SignalProbe for Exploding {
        type Output = u32;

        fn name(&self) -> &'static str {
            "exploding"
        }

        async fn read(&self, _env: &dyn Environment) -> Result<u32, ProbeUnavailable> {
            panic!("boom")
        }
    }

    struct Refusing;

    #[async_trait]
    impl SignalProbe for Refusing {
        type Output = u32;

        fn name(&self) -> &'static str {
            "refusing"
        }

        async fn read(&self, _env: &dyn Environment) -> Result<u32, ProbeUnavailable> {
            Err(ProbeUnavailable::denied("user said no"))
        }
    }

    #[tokio::test]
    async fn test_panicking_probe_is_absent() {
        assert_eq!(Exploding.attempt(&Nothing).await, Signal::Absent);
    }

    #[tokio::test]
    async fn test_failing_probe_is_absent() {
        assert_eq!(Refusing.attempt(&Nothing).await, Signal::Absent);
    }

    #[tokio::test]
    async fn test_unsupported_capability_is_absent() {
        assert_eq!(NavigatorProbe.attempt(&Nothing).await, Signal::Absent);
        assert_eq!(
            BatteryProbe::new(Duration::from_millis(100)).attempt(&Nothing).await,
            Signal::Absent
        );
    }
}
