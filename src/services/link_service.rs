//! Link management service
//!
//! Validation and code generation on top of [`LinkStore`], shared by the
//! HTTP API and the CLI.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::errors::{LinktraceError, Result};
use crate::storage::LinkStore;
use crate::utils::{
    RANDOM_CODE_LEN, generate_random_code, is_valid_short_code, normalize_short_code,
    validate_url,
};

/// 与内置路由冲突的短码
const RESERVED_CODES: &[&str] = &["api", "static", "health"];

/// 随机短码碰撞时的最大重试次数
const MAX_GENERATE_ATTEMPTS: usize = 5;

#[derive(Debug, Clone)]
pub struct CreateLinkRequest {
    /// Short code (generated when absent or empty)
    pub code: Option<String>,
    pub target: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkCreateResult {
    pub id: i64,
    pub code: String,
    pub target: String,
    pub generated_code: bool,
}

pub fn is_reserved_short_code(code: &str) -> bool {
    RESERVED_CODES.contains(&normalize_short_code(code).as_str())
}

pub struct LinkService {
    links: Arc<dyn LinkStore>,
}

impl LinkService {
    pub fn new(links: Arc<dyn LinkStore>) -> Self {
        Self { links }
    }

    pub async fn create_link(&self, req: CreateLinkRequest) -> Result<LinkCreateResult> {
        let target = validate_url(&req.target)
            .map_err(|e| LinktraceError::validation(format!("Invalid target URL: {}", e)))?;

        let (code, generated) = match req.code.filter(|c| !c.is_empty()) {
            Some(code) => {
                if !is_valid_short_code(&code) {
                    return Err(LinktraceError::validation(format!(
                        "Invalid short code '{}'. Use 3-20 letters, digits, '-' or '_'.",
                        code
                    )));
                }
                if is_reserved_short_code(&code) {
                    return Err(LinktraceError::validation(format!(
                        "Short code '{}' conflicts with reserved routes",
                        code
                    )));
                }
                (normalize_short_code(&code), false)
            }
            None => (self.generate_unused_code().await?, true),
        };

        // 并发创建同一短码时由唯一索引兜底，返回 Conflict
        let id = self.links.create(&code, &target).await?;
        info!("LinkService: created link '{}' -> '{}'", code, target);

        Ok(LinkCreateResult {
            id,
            code,
            target,
            generated_code: generated,
        })
    }

    async fn generate_unused_code(&self) -> Result<String> {
        for _ in 0..MAX_GENERATE_ATTEMPTS {
            let code = generate_random_code(RANDOM_CODE_LEN);
            if !is_reserved_short_code(&code) && !self.links.exists(&code).await? {
                return Ok(code);
            }
        }
        Err(LinktraceError::conflict(
            "Could not generate an unused short code, try again",
        ))
    }
}
