//! `POST /api/links`: programmatic link creation

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, Responder, web};
use serde::Deserialize;
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use super::response::{ErrorCode, error_from_linktrace, error_response, success_response};
use crate::config::get_config;
use crate::services::{CreateLinkRequest, LinkService};

#[derive(Debug, Deserialize)]
pub struct PostNewLink {
    pub code: Option<String>,
    pub target: String,
}

pub struct LinkApiService;

impl LinkApiService {
    pub async fn create_link(
        req: HttpRequest,
        body: web::Json<PostNewLink>,
        links: web::Data<LinkService>,
    ) -> impl Responder {
        let config = get_config();
        let Some(expected) = config
            .server
            .links_api_token
            .as_deref()
            .filter(|t| !t.is_empty())
        else {
            return error_response(
                StatusCode::FORBIDDEN,
                ErrorCode::Forbidden,
                "Link API is disabled; set server.links_api_token to enable it",
            );
        };

        if !Self::bearer_matches(&req, expected) {
            warn!("Rejected link creation with missing or invalid token");
            return error_response(
                StatusCode::UNAUTHORIZED,
                ErrorCode::Unauthorized,
                "Invalid or missing bearer token",
            );
        }

        let PostNewLink { code, target } = body.into_inner();
        match links.create_link(CreateLinkRequest { code, target }).await {
            Ok(created) => {
                info!("API: created link '{}'", created.code);
                success_response(StatusCode::CREATED, created)
            }
            Err(e) => error_from_linktrace(&e),
        }
    }

    fn bearer_matches(req: &HttpRequest, expected: &str) -> bool {
        req.headers()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| bool::from(token.as_bytes().ct_eq(expected.as_bytes())))
    }
}
