//! HTTP surface
//!
//! [`configure`] registers every route and the shared state; the server
//! and the integration tests build their `App` through it.

pub mod middleware;
pub mod services;

use std::sync::Arc;

use actix_web::web;

use crate::services::{LinkService, TrackingService};
use crate::storage::{CorrelationStore, LinkStore};
use services::{api_routes, asset_routes, health_routes, redirect_routes};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub links: Arc<dyn LinkStore>,
    pub link_service: Arc<LinkService>,
    pub tracking: Arc<TrackingService>,
    pub max_payload_bytes: usize,
}

impl AppState {
    pub fn new(
        links: Arc<dyn LinkStore>,
        visits: Arc<dyn CorrelationStore>,
        max_payload_bytes: usize,
    ) -> Self {
        Self {
            link_service: Arc::new(LinkService::new(links.clone())),
            tracking: Arc::new(TrackingService::new(visits)),
            links,
            max_payload_bytes,
        }
    }
}

/// 路由注册顺序：固定前缀在前，`/{code}` 兜底
pub fn configure(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.app_data(web::Data::new(state.links.clone()))
        .app_data(web::Data::from(state.link_service.clone()))
        .app_data(web::Data::from(state.tracking.clone()))
        .service(health_routes())
        .service(asset_routes())
        .service(api_routes(state.max_payload_bytes))
        .service(redirect_routes());
}
