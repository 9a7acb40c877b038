//! Server-side observation captured when a short code is resolved

use std::collections::BTreeMap;
use std::time::Duration;

use actix_web::HttpRequest;
use actix_web::http::Version;
use chrono::{DateTime, Utc};
use serde::Serialize;
use woothee::parser::Parser;

use crate::utils::ip::extract_client_ip;

/// Headers never copied into the observation
const REDACTED_HEADERS: &[&str] = &["cookie", "authorization", "proxy-authorization"];

/// Country headers set by common CDNs / edge proxies, in lookup order
const GEO_HEADERS: &[&str] = &[
    "cf-ipcountry",
    "x-vercel-ip-country",
    "cloudfront-viewer-country",
    "x-country-code",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeoHint {
    pub country: String,
    pub source: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedUserAgent {
    pub browser_name: Option<String>,
    pub browser_version: Option<String>,
    pub os_name: Option<String>,
    pub os_version: Option<String>,
    pub category: Option<String>,
    pub vendor: Option<String>,
    pub is_bot: bool,
}

impl ParsedUserAgent {
    pub fn parse(ua: &str) -> Self {
        let result = Parser::new().parse(ua).unwrap_or_default();
        let known = |value: &str| (!value.is_empty() && value != "UNKNOWN").then(|| value.to_string());

        Self {
            browser_name: known(result.name),
            browser_version: known(result.version),
            os_name: known(result.os),
            os_version: known(&*result.os_version),
            category: known(result.category),
            vendor: known(result.vendor),
            is_bot: result.category == "crawler",
        }
    }
}

/// Snapshot stored as `server_observed_data`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerObservation {
    pub ip: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub host: Option<String>,
    pub http_version: String,
    pub method: String,
    pub path: String,
    pub received_at: DateTime<Utc>,
    pub lookup_latency_ms: f64,
    pub geo: Option<GeoHint>,
    pub user_agent: Option<String>,
    pub parsed_user_agent: Option<ParsedUserAgent>,
}

impl ServerObservation {
    pub fn capture(
        req: &HttpRequest,
        received_at: DateTime<Utc>,
        lookup_latency: Duration,
        trusted_proxies: &[String],
        capture_headers: bool,
    ) -> Self {
        let headers = if capture_headers {
            let mut headers = BTreeMap::new();
            for (name, value) in req.headers() {
                if REDACTED_HEADERS.contains(&name.as_str()) {
                    continue;
                }
                // 同名头部合并为逗号分隔
                let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
                headers
                    .entry(name.as_str().to_string())
                    .and_modify(|existing: &mut String| {
                        existing.push_str(", ");
                        existing.push_str(&value);
                    })
                    .or_insert(value);
            }
            headers
        } else {
            BTreeMap::new()
        };

        let user_agent = req
            .headers()
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let host = req.connection_info().host().to_string();

        Self {
            ip: extract_client_ip(req, trusted_proxies),
            headers,
            host: (!host.is_empty()).then_some(host),
            http_version: http_version_label(req.version()).to_string(),
            method: req.method().to_string(),
            path: req
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| req.path().to_string()),
            received_at,
            lookup_latency_ms: lookup_latency.as_secs_f64() * 1000.0,
            geo: geo_hint(req),
            parsed_user_agent: user_agent.as_deref().map(ParsedUserAgent::parse),
            user_agent,
        }
    }
}

fn http_version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_11 => "HTTP/1.1",
        Version::HTTP_2 => "HTTP/2",
        Version::HTTP_3 => "HTTP/3",
        _ => "unknown",
    }
}

/// Country hint from an upstream proxy; `XX` (unknown) and `T1` (Tor) are ignored
fn geo_hint(req: &HttpRequest) -> Option<GeoHint> {
    GEO_HEADERS.iter().find_map(|header| {
        let value = req.headers().get(*header)?.to_str().ok()?.trim();
        let country = value.to_ascii_uppercase();
        if country.len() != 2 || country == "XX" || country == "T1" {
            return None;
        }
        Some(GeoHint {
            country,
            source: header.to_string(),
        })
    })
}
