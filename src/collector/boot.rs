//! Boot sequence: collect, deliver in the background, always navigate

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::environment::Environment;
use super::fingerprint::Collector;
use super::payload::FingerprintPayload;
use super::transport::{DeliveryFailure, PayloadTransport, TrackEnvelope};

/// `id` attribute of the JSON script block on the bootstrap page
pub const TICKET_ELEMENT_ID: &str = "linktrace-ticket";

/// What the bootstrap page hands to the collector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    pub target: String,
}

impl Ticket {
    /// Extract the ticket from a served bootstrap page
    pub fn from_bootstrap_html(html: &str) -> Option<Self> {
        let marker = format!("id=\"{}\"", TICKET_ELEMENT_ID);
        let tag_start = html.find(&marker)?;
        let body_start = tag_start + html[tag_start..].find('>')? + 1;
        let body_end = body_start + html[body_start..].find("</script>")?;
        serde_json::from_str(html[body_start..body_end].trim()).ok()
    }
}

/// Performs the actual navigation (location change, printing, ...)
pub trait Navigator: Send + Sync {
    fn navigate(&self, target: &str);
}

/// Navigates in `Drop` unless [`NavigationGuard::navigate`] already did
pub struct NavigationGuard<'a> {
    navigator: &'a dyn Navigator,
    target: String,
    navigated: bool,
}

impl<'a> NavigationGuard<'a> {
    pub fn arm(navigator: &'a dyn Navigator, target: impl Into<String>) -> Self {
        Self {
            navigator,
            target: target.into(),
            navigated: false,
        }
    }

    /// Navigate now and return the target
    pub fn navigate(mut self) -> String {
        self.fire();
        std::mem::take(&mut self.target)
    }

    fn fire(&mut self) {
        if !self.navigated {
            self.navigated = true;
            self.navigator.navigate(&self.target);
        }
    }
}

impl Drop for NavigationGuard<'_> {
    fn drop(&mut self) {
        if !self.navigated {
            warn!("Boot sequence aborted, navigating to {} from guard", self.target);
            self.fire();
        }
    }
}

#[derive(Debug)]
pub struct BootOutcome {
    pub navigated_to: String,
    /// Still-running delivery; may be awaited or abandoned
    pub delivery: JoinHandle<Result<(), DeliveryFailure>>,
}

/// Collect, hand the payload to the transport and navigate without
/// waiting for delivery
pub async fn run(
    collector: &Collector,
    env: &dyn Environment,
    transport: Arc<dyn PayloadTransport>,
    navigator: &dyn Navigator,
    ticket: Ticket,
) -> BootOutcome {
    let guard = NavigationGuard::arm(navigator, ticket.target.as_str());

    let deadline = collector.deadline();
    let payload = match tokio::time::timeout(deadline, collector.collect(env)).await {
        Ok(payload) => payload,
        Err(_) => {
            warn!(
                "Collection for visit {} exceeded {} ms, sending empty payload",
                ticket.id,
                deadline.as_millis()
            );
            FingerprintPayload::abandoned(deadline.as_millis() as u64)
        }
    };
    let envelope = TrackEnvelope::new(ticket.id, payload);

    let id = ticket.id;
    let delivery = tokio::spawn(async move {
        let result = transport.deliver(envelope).await;
        match &result {
            Ok(()) => debug!("Payload for visit {} delivered", id),
            Err(e) => warn!("Payload for visit {} not delivered: {}", id, e),
        }
        result
    });

    let navigated_to = guard.navigate();
    info!("Navigated to {}", navigated_to);

    BootOutcome {
        navigated_to,
        delivery,
    }
}
