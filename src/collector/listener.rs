//! Time-boxed input listener
//!
//! `Armed → Collecting → Retired`. A listener collects samples from one
//! input subscription until its window elapses, its sample ceiling is
//! reached or the source closes, then drops the subscription.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, trace};

use super::environment::{InputEvent, InputKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Armed,
    Collecting,
    Retired(RetireReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RetireReason {
    Window,
    SampleCeiling,
    SourceClosed,
}

/// One recorded event and its offset from arming (ms)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub data: InputEvent,
    pub t: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenerReport {
    pub samples: Vec<Sample>,
    pub retired_by: RetireReason,
    pub window_ms: u64,
    pub elapsed_ms: u64,
}

#[derive(Debug)]
pub struct TimeBoxedListener {
    kind: InputKind,
    window: Duration,
    max_samples: usize,
    state: ListenerState,
}

impl TimeBoxedListener {
    pub fn new(kind: InputKind, window: Duration, max_samples: usize) -> Self {
        Self {
            kind,
            window,
            max_samples,
            state: ListenerState::Armed,
        }
    }

    pub fn state(&self) -> ListenerState {
        self.state
    }

    /// Collect until retirement and return what was recorded
    pub async fn run(&mut self, mut rx: broadcast::Receiver<InputEvent>) -> ListenerReport {
        let armed_at = Instant::now();
        let deadline = armed_at + self.window;
        let mut samples = Vec::with_capacity(self.max_samples.min(64));
        self.state = ListenerState::Collecting;

        let reason = loop {
            if samples.len() >= self.max_samples {
                break RetireReason::SampleCeiling;
            }

            tokio::select! {
                biased;

                _ = sleep_until(deadline) => break RetireReason::Window,
                received = rx.recv() => match received {
                    Ok(event) if event.kind() == self.kind => {
                        samples.push(Sample {
                            data: event,
                            t: armed_at.elapsed().as_millis() as u64,
                        });
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        trace!("{:?} listener lagged, {} events skipped", self.kind, skipped);
                    }
                    Err(RecvError::Closed) => break RetireReason::SourceClosed,
                },
            }
        };

        // 注销监听
        drop(rx);
        self.state = ListenerState::Retired(reason);

        let elapsed_ms = armed_at.elapsed().as_millis() as u64;
        debug!(
            "{:?} listener retired by {:?} with {} samples after {} ms",
            self.kind,
            reason,
            samples.len(),
            elapsed_ms
        );

        ListenerReport {
            samples,
            retired_by: reason,
            window_ms: self.window.as_millis() as u64,
            elapsed_ms,
        }
    }
}
