use actix_web::{HttpResponse, Responder, web};
use tracing::trace;

/// Liveness only: the process is up and serving requests
pub struct HealthService;

impl HealthService {
    pub async fn liveness_check() -> impl Responder {
        trace!("Liveness check");
        HttpResponse::NoContent().finish()
    }
}

pub fn health_routes() -> actix_web::Scope {
    web::scope("/health")
        .route("/live", web::get().to(HealthService::liveness_check))
        .route("/live", web::head().to(HealthService::liveness_check))
}
