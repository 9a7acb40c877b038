//! `GET /{code}`: resolve, open a visit record, serve the bootstrap page
//!
//! `HEAD /{code}` only resolves; no ticket is issued, so no record is opened.

use std::sync::Arc;
use std::time::Instant;

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use chrono::Utc;
use tracing::{debug, error, trace};

use crate::collector::Ticket;
use crate::collector::boot::TICKET_ELEMENT_ID;
use crate::config::get_config;
use crate::services::{ServerObservation, TrackingService};
use crate::storage::{LinkStore, ShortLink};
use crate::utils::html::{escape_html, script_json};
use crate::utils::is_valid_short_code;

pub struct RedirectService;

impl RedirectService {
    pub async fn handle_redirect(
        req: HttpRequest,
        path: web::Path<String>,
        links: web::Data<Arc<dyn LinkStore>>,
        tracking: web::Data<TrackingService>,
    ) -> impl Responder {
        let received_at = Utc::now();
        let code = path.into_inner();

        let lookup_started = Instant::now();
        let link = match Self::lookup(&code, links.get_ref()).await {
            Ok(link) => link,
            Err(resp) => return resp,
        };
        let lookup_latency = lookup_started.elapsed();

        let config = get_config();
        let observation = ServerObservation::capture(
            &req,
            received_at,
            lookup_latency,
            &config.server.trusted_proxies,
            config.tracking.capture_headers,
        );

        match tracking.open_visit(&link, &observation).await {
            Some(id) => {
                let ticket = Ticket {
                    id,
                    target: link.target,
                };
                match render_bootstrap_page(&ticket, &config.tracking.collector_script_path) {
                    Ok(page) => HttpResponse::Ok()
                        .content_type("text/html; charset=utf-8")
                        .insert_header(("Cache-Control", "no-store"))
                        .insert_header(("Referrer-Policy", "no-referrer"))
                        .body(page),
                    Err(e) => {
                        error!("Failed to render bootstrap page for visit {}: {}", id, e);
                        Self::fallback_redirect(&ticket.target)
                    }
                }
            }
            None => {
                error!(
                    "Visit record for '{}' not stored, falling back to plain redirect",
                    link.code
                );
                Self::fallback_redirect(&link.target)
            }
        }
    }

    /// 链接探活：不签发 ticket，也不创建访问记录
    pub async fn handle_head(
        path: web::Path<String>,
        links: web::Data<Arc<dyn LinkStore>>,
    ) -> impl Responder {
        let code = path.into_inner();
        match Self::lookup(&code, links.get_ref()).await {
            Ok(link) => {
                trace!("HEAD for '{}' answered without opening a visit", link.code);
                HttpResponse::Ok()
                    .content_type("text/html; charset=utf-8")
                    .insert_header(("Cache-Control", "no-store"))
                    .insert_header(("Referrer-Policy", "no-referrer"))
                    .finish()
            }
            Err(resp) => resp,
        }
    }

    async fn lookup(code: &str, links: &Arc<dyn LinkStore>) -> Result<ShortLink, HttpResponse> {
        if !is_valid_short_code(code) {
            // 非法短码，不访问存储
            trace!("Invalid short code rejected: {}", code);
            return Err(Self::not_found_response());
        }

        match links.resolve(code).await {
            Ok(Some(link)) => Ok(link),
            Ok(None) => {
                debug!("Redirect link not found: {}", code);
                Err(Self::not_found_response())
            }
            Err(e) => {
                error!("Database error during redirect lookup: {}", e);
                Err(Self::error_response())
            }
        }
    }

    /// 记录创建失败时仍然跳转
    #[inline]
    fn fallback_redirect(target: &str) -> HttpResponse {
        HttpResponse::TemporaryRedirect()
            .insert_header(("Location", target))
            .insert_header(("Cache-Control", "no-store"))
            .finish()
    }

    #[inline]
    fn not_found_response() -> HttpResponse {
        HttpResponse::build(StatusCode::NOT_FOUND)
            .insert_header(("Content-Type", "text/html; charset=utf-8"))
            .insert_header(("Cache-Control", "public, max-age=60"))
            .body("Not Found")
    }

    #[inline]
    fn error_response() -> HttpResponse {
        HttpResponse::build(StatusCode::INTERNAL_SERVER_ERROR)
            .insert_header(("Content-Type", "text/html; charset=utf-8"))
            .body("Internal Server Error")
    }
}

/// Bootstrap page: ticket as JSON, collector script, noscript fallback
pub fn render_bootstrap_page(ticket: &Ticket, script_path: &str) -> serde_json::Result<String> {
    let ticket_json = script_json(ticket)?;
    let target = escape_html(&ticket.target);
    let script_path = escape_html(script_path);

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="robots" content="noindex, nofollow">
<meta name="referrer" content="no-referrer">
<title>Redirecting</title>
<script id="{TICKET_ELEMENT_ID}" type="application/json">{ticket_json}</script>
<noscript><meta http-equiv="refresh" content="0;url={target}"></noscript>
</head>
<body>
<p>Redirecting to <a href="{target}">{target}</a></p>
<script src="{script_path}"></script>
</body>
</html>
"#
    ))
}

pub fn redirect_routes() -> actix_web::Scope {
    web::scope("")
        .route("/{code}", web::get().to(RedirectService::handle_redirect))
        .route("/{code}", web::head().to(RedirectService::handle_head))
}
