//! `POST /api/track`: merge a delivered payload into its visit record

use actix_web::http::StatusCode;
use actix_web::{Responder, web};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error};

use super::response::{error_from_linktrace, success_response};
use crate::services::TrackingService;

/// Body of `POST /api/track`
///
/// `clientData` and `behavior` are taken as-is; a missing one counts as
/// `null`. The redundant `combined` field sent by collectors is ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRequest {
    pub id: i64,
    #[serde(default)]
    pub client_data: Value,
    #[serde(default)]
    pub behavior: Value,
}

pub struct TrackService;

impl TrackService {
    pub async fn track(
        body: web::Json<TrackRequest>,
        tracking: web::Data<TrackingService>,
    ) -> impl Responder {
        let TrackRequest {
            id,
            client_data,
            behavior,
        } = body.into_inner();

        match tracking.correlate(id, client_data, behavior).await {
            Ok(ack) => success_response(StatusCode::OK, ack),
            Err(e) => {
                if e.is_storage_failure() {
                    error!("Correlation of visit {} failed: {}", id, e);
                } else {
                    debug!("Correlation of visit {} rejected: {}", id, e);
                }
                error_from_linktrace(&e)
            }
        }
    }
}
