//! Behavioral probes: time-boxed input listeners

use std::time::Duration;

use async_trait::async_trait;

use super::{SignalProbe, require};
use crate::collector::environment::{Capability, Environment, InputKind};
use crate::collector::listener::{ListenerReport, TimeBoxedListener};
use crate::collector::signal::ProbeUnavailable;

pub struct InputProbe {
    kind: InputKind,
    window: Duration,
    max_samples: usize,
}

impl InputProbe {
    pub fn new(kind: InputKind, window: Duration, max_samples: usize) -> Self {
        Self {
            kind,
            window,
            max_samples,
        }
    }
}

#[async_trait]
impl SignalProbe for InputProbe {
    type Output = ListenerReport;

    fn name(&self) -> &'static str {
        match self.kind {
            InputKind::Pointer => "pointer",
            InputKind::Key => "keys",
            InputKind::Touch => "touch",
            InputKind::Scroll => "scroll",
        }
    }

    async fn read(&self, env: &dyn Environment) -> Result<ListenerReport, ProbeUnavailable> {
        require(env, Capability::Input(self.kind), "input events")?;
        let rx = env
            .subscribe(self.kind)
            .ok_or_else(|| ProbeUnavailable::failed("observer could not be registered"))?;

        let mut listener = TimeBoxedListener::new(self.kind, self.window, self.max_samples);
        Ok(listener.run(rx).await)
    }
}
