//! Probe results: a value or an explicit absence marker

use std::fmt;

use serde::{Serialize, Serializer};

/// Result of one probe attempt
///
/// Serializes like `Option<T>`: `Absent` becomes JSON `null`.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal<T> {
    Present(T),
    Absent,
}

impl<T> Signal<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, Signal::Present(_))
    }

    pub fn as_ref(&self) -> Signal<&T> {
        match self {
            Signal::Present(value) => Signal::Present(value),
            Signal::Absent => Signal::Absent,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Signal<U> {
        match self {
            Signal::Present(value) => Signal::Present(f(value)),
            Signal::Absent => Signal::Absent,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Signal::Present(value) => Some(value),
            Signal::Absent => None,
        }
    }
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Signal::Absent
    }
}

impl<T> From<Option<T>> for Signal<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Signal::Present(value),
            None => Signal::Absent,
        }
    }
}

impl<T: Serialize> Serialize for Signal<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Signal::Present(value) => serializer.serialize_some(value),
            Signal::Absent => serializer.serialize_none(),
        }
    }
}

/// Why a probe could not produce a value
///
/// Expected outcome in the field, never propagated past the probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeUnavailable {
    /// 环境不提供该能力
    Unsupported(&'static str),
    /// 权限被拒绝
    Denied(String),
    /// 在超时时间内没有结果
    TimedOut { after_ms: u64 },
    /// 读取过程中出错
    Failed(String),
}

impl ProbeUnavailable {
    pub fn failed<T: Into<String>>(msg: T) -> Self {
        ProbeUnavailable::Failed(msg.into())
    }

    pub fn denied<T: Into<String>>(msg: T) -> Self {
        ProbeUnavailable::Denied(msg.into())
    }
}

impl fmt::Display for ProbeUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeUnavailable::Unsupported(what) => write!(f, "{} is not supported", what),
            ProbeUnavailable::Denied(msg) => write!(f, "permission denied: {}", msg),
            ProbeUnavailable::TimedOut { after_ms } => write!(f, "timed out after {} ms", after_ms),
            ProbeUnavailable::Failed(msg) => write!(f, "read failed: {}", msg),
        }
    }
}

impl std::error::Error for ProbeUnavailable {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_signal_serializes_like_option() {
        let present: Signal<u32> = Signal::Present(7);
        let absent: Signal<u32> = Signal::Absent;
        assert_eq!(serde_json::to_value(&present).unwrap(), json!(7));
        assert_eq!(serde_json::to_value(&absent).unwrap(), json!(null));
    }

    #[test]
    fn test_signal_from_option() {
        assert_eq!(Signal::from(Some("x")), Signal::Present("x"));
        assert_eq!(Signal::<&str>::from(None), Signal::Absent);
        assert_eq!(Signal::Present(2).map(|v| v * 2).into_option(), Some(4));
    }

    #[test]
    fn test_probe_unavailable_display() {
        assert_eq!(
            ProbeUnavailable::TimedOut { after_ms: 500 }.to_string(),
            "timed out after 500 ms"
        );
        assert_eq!(
            ProbeUnavailable::Unsupported("battery").to_string(),
            "battery is not supported"
        );
    }
}
