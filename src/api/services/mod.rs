pub mod assets;
pub mod health;
pub mod links;
pub mod redirect;
pub mod response;
pub mod track;

pub use assets::{AssetService, asset_routes};
pub use health::{HealthService, health_routes};
pub use links::LinkApiService;
pub use redirect::{RedirectService, redirect_routes, render_bootstrap_page};
pub use response::{ApiResponse, ErrorCode, json_config};
pub use track::{TrackRequest, TrackService};

use actix_web::web;

/// `/api` scope: correlation sink and link creation
pub fn api_routes(max_payload_bytes: usize) -> actix_web::Scope {
    web::scope("/api")
        .app_data(json_config(max_payload_bytes))
        .route("/track", web::post().to(TrackService::track))
        .route("/links", web::post().to(LinkApiService::create_link))
}
