//! JSON 响应封装与错误码

use actix_web::HttpResponse;
use actix_web::error::JsonPayloadError;
use actix_web::http::StatusCode;
use actix_web::web;
use serde::Serialize;
use serde_repr::Serialize_repr;
use tracing::debug;

use crate::errors::LinktraceError;

/// API 错误码
///
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 3000-3099: 链接错误
/// - 7000-7099: 存储错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    InternalServerError = 1005,
    PayloadTooLarge = 1011,

    LinkAlreadyExists = 3001,
    LinkInvalid = 3002,

    StorageFailure = 7001,
}

impl From<&LinktraceError> for ErrorCode {
    fn from(err: &LinktraceError) -> Self {
        match err {
            LinktraceError::Validation(_) => ErrorCode::LinkInvalid,
            LinktraceError::Serialization(_) => ErrorCode::BadRequest,
            LinktraceError::NotFound(_) => ErrorCode::NotFound,
            LinktraceError::Conflict(_) => ErrorCode::LinkAlreadyExists,
            LinktraceError::FileOperation(_) => ErrorCode::InternalServerError,
            LinktraceError::DatabaseConfig(_)
            | LinktraceError::DatabaseConnection(_)
            | LinktraceError::DatabaseOperation(_) => ErrorCode::StorageFailure,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct ApiResponse<T> {
    pub code: ErrorCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    message: Option<String>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status)
        .insert_header(("Cache-Control", "no-store"))
        .json(ApiResponse {
            code,
            message,
            data,
        })
}

pub fn success_response<T: Serialize>(status: StatusCode, data: T) -> HttpResponse {
    json_response(status, ErrorCode::Success, None, Some(data))
}

pub fn error_response(status: StatusCode, code: ErrorCode, message: &str) -> HttpResponse {
    json_response::<()>(status, code, Some(message.to_string()), None)
}

/// 从 LinktraceError 构建错误响应（自动映射 HTTP 状态码和 ErrorCode）
pub fn error_from_linktrace(err: &LinktraceError) -> HttpResponse {
    error_response(err.http_status(), ErrorCode::from(err), err.message())
}

/// JSON 请求体配置：大小限制 + 统一的 400/413 响应
///
/// 不要求 Content-Type，兼容 `navigator.sendBeacon` 发送的 text/plain。
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .content_type_required(false)
        .error_handler(|err, req| {
            debug!("Rejected JSON body on {}: {}", req.path(), err);
            let response = match &err {
                JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
                    error_response(
                        StatusCode::PAYLOAD_TOO_LARGE,
                        ErrorCode::PayloadTooLarge,
                        &err.to_string(),
                    )
                }
                _ => error_response(StatusCode::BAD_REQUEST, ErrorCode::BadRequest, &err.to_string()),
            };
            actix_web::error::InternalError::from_response(err, response).into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use serde_json::{Value, json};

    #[actix_rt::test]
    async fn test_success_response_shape() {
        let resp = success_response(StatusCode::OK, json!({"id": 1}));
        assert_eq!(resp.status(), StatusCode::OK);
        let body = to_bytes(resp.into_body()).await.unwrap();
        let v: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(v, json!({"code": 0, "data": {"id": 1}}));
    }

    #[actix_rt::test]
    async fn test_error_from_linktrace() {
        let resp = error_from_linktrace(&LinktraceError::not_found("visit 9"));
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(resp.into_body()).await.unwrap();
        let v: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(v, json!({"code": 1004, "message": "visit 9"}));
    }
}
