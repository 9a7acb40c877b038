//! Service layer for business logic
//!
//! Shared between the HTTP handlers and the CLI.

mod link_service;
mod observation;
mod tracking_service;

pub use link_service::*;
pub use observation::{GeoHint, ParsedUserAgent, ServerObservation};
pub use tracking_service::{Correlation, TrackingService};
