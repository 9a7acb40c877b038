//! Client-side fingerprint collector
//!
//! Probes read one signal each from an [`Environment`]; the [`Collector`]
//! runs them in four isolated groups; [`boot::run`] delivers the result
//! and navigates to the target no matter what happened before.

pub mod boot;
pub mod environment;
mod fingerprint;
pub mod host;
pub mod listener;
pub mod payload;
pub mod probes;
pub mod signal;
pub mod transport;

pub use boot::{BootOutcome, NavigationGuard, Navigator, Ticket};
pub use environment::{Capability, Environment, InputEvent, InputKind};
pub use fingerprint::Collector;
pub use host::HostEnvironment;
pub use payload::FingerprintPayload;
pub use signal::{ProbeUnavailable, Signal};
pub use transport::{DeliveryFailure, HttpTransport, PayloadTransport, TrackEnvelope};
