//! Embedded collector script and other static files

use actix_web::{HttpResponse, web};
use rust_embed::Embed;
use tracing::trace;

#[derive(Embed)]
#[folder = "assets/"]
struct CollectorAssets;

pub struct AssetService;

impl AssetService {
    pub async fn serve(path: web::Path<String>) -> HttpResponse {
        let path = path.into_inner();
        trace!("Serving static asset: {}", path);

        match CollectorAssets::get(&path) {
            Some(file) => HttpResponse::Ok()
                .content_type(Self::get_content_type(&path))
                .insert_header(("Cache-Control", "public, max-age=3600"))
                .body(file.data.into_owned()),
            None => HttpResponse::NotFound().body("Not Found"),
        }
    }

    /// 根据文件扩展名确定 Content-Type
    fn get_content_type(path: &str) -> &'static str {
        match path.rsplit('.').next() {
            Some("js") => "application/javascript; charset=utf-8",
            Some("css") => "text/css; charset=utf-8",
            Some("json") => "application/json",
            Some("html") => "text/html; charset=utf-8",
            _ => "application/octet-stream",
        }
    }
}

pub fn asset_routes() -> actix_web::Scope {
    web::scope("/static")
        .route("/{file:.*}", web::get().to(AssetService::serve))
        .route("/{file:.*}", web::head().to(AssetService::serve))
}
